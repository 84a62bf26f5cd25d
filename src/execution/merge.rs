use crate::error::LocalStateError;
use crate::json_ext::Object;
use crate::json_ext::Path;
use crate::json_ext::Value;
use crate::spec::Selection;

/// Merge the partial local result and the remote result into one tree
/// matching the original operation shape.
///
/// The walk follows the classified selection tree, so the merged object
/// contains exactly the requested response keys, in selection order. A
/// non-local field absent from the remote result is a fatal shape error,
/// never defaulted to null.
pub(crate) fn merge(
    selections: &[Selection],
    local: &Value,
    remote: &Value,
) -> Result<Value, LocalStateError> {
    merge_selection_set(selections, local, remote, &Path::empty()).map(Value::Object)
}

fn merge_selection_set(
    selections: &[Selection],
    local: &Value,
    remote: &Value,
    path: &Path,
) -> Result<Object, LocalStateError> {
    let mut merged = Object::new();
    for selection in selections {
        let key = selection.response_key();
        let field_path = path.key(key);
        let local_value = local.as_object().and_then(|object| object.get(key));

        // Local fields, and remote fields whose children were all local,
        // come from the partial result.
        if selection.is_local() || !selection.is_dispatched() {
            merged.insert(key, local_value.cloned().unwrap_or(Value::Null));
            continue;
        }

        let Some(remote_value) = remote.as_object().and_then(|object| object.get(key)) else {
            failfast_debug!("remote result is missing field '{}'", field_path.to_string());
            return Err(LocalStateError::MissingRemoteField {
                field: field_path.to_string(),
            });
        };

        if selection.has_local() {
            merged.insert(
                key,
                merge_field(
                    selection,
                    local_value.unwrap_or(&Value::Null),
                    remote_value,
                    &field_path,
                )?,
            );
        } else {
            merged.insert(key, remote_value.clone());
        }
    }
    Ok(merged)
}

/// Merge one field position where remote and local subtrees overlap.
fn merge_field(
    selection: &Selection,
    local: &Value,
    remote: &Value,
    path: &Path,
) -> Result<Value, LocalStateError> {
    match remote {
        Value::Null => Ok(Value::Null),
        Value::Object(_) => Ok(Value::Object(merge_selection_set(
            selection.selection_set(),
            local,
            remote,
            path,
        )?)),
        Value::Array(remote_items) => {
            let local_items = match local {
                Value::Array(items) => Some(items),
                _ => None,
            };
            if let Some(local_items) = local_items {
                if local_items.len() != remote_items.len() {
                    return Err(LocalStateError::MalformedRemoteResult {
                        field: path.to_string(),
                        reason: format!(
                            "local and remote lists have different lengths ({} vs {})",
                            local_items.len(),
                            remote_items.len(),
                        ),
                    });
                }
            }
            let mut merged = Vec::with_capacity(remote_items.len());
            for (i, remote_item) in remote_items.iter().enumerate() {
                let local_item = local_items
                    .and_then(|items| items.get(i))
                    .unwrap_or(&Value::Null);
                merged.push(merge_field(selection, local_item, remote_item, &path.index(i))?);
            }
            Ok(Value::Array(merged))
        }
        _ => Err(LocalStateError::MalformedRemoteResult {
            field: path.to_string(),
            reason: "the remote value for a field with local children is not an object"
                .to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Operation;
    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;
    use test_log::test;

    fn merged(source: &str, local: Value, remote: Value) -> Result<Value, LocalStateError> {
        let operation = Operation::parse(source, None).expect("valid operation");
        merge(operation.selection_set(), &local, &remote)
    }

    #[test]
    fn keeps_the_original_field_order() {
        let result = merged(
            "{ a @client b c @client }",
            json!({ "a": 1, "c": 3 }),
            json!({ "b": 2 }),
        )
        .unwrap();
        assert_eq!(result, json!({ "a": 1, "b": 2, "c": 3 }));
        let keys: Vec<&str> = result
            .as_object()
            .unwrap()
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn grafts_local_leaves_into_remote_objects() {
        let result = merged(
            "{ post { id isLiked @client } }",
            json!({ "post": { "isLiked": true } }),
            json!({ "post": { "id": 7 } }),
        )
        .unwrap();
        assert_eq!(result, json!({ "post": { "id": 7, "isLiked": true } }));
    }

    #[test]
    fn merges_lists_element_wise() {
        let result = merged(
            "{ posts { id isLiked @client } }",
            json!({ "posts": [{ "isLiked": true }, { "isLiked": false }] }),
            json!({ "posts": [{ "id": 1 }, { "id": 2 }] }),
        )
        .unwrap();
        assert_eq!(
            result,
            json!({ "posts": [
                { "id": 1, "isLiked": true },
                { "id": 2, "isLiked": false },
            ] })
        );
    }

    #[test]
    fn list_length_mismatch_is_a_shape_error() {
        let result = merged(
            "{ posts { id isLiked @client } }",
            json!({ "posts": [{ "isLiked": true }] }),
            json!({ "posts": [{ "id": 1 }, { "id": 2 }] }),
        );
        assert!(matches!(
            result,
            Err(LocalStateError::MalformedRemoteResult { .. })
        ));
    }

    #[test]
    fn missing_remote_fields_are_fatal() {
        let result = merged("{ a @client b }", json!({ "a": 1 }), json!({}));
        assert_eq!(
            result.err(),
            Some(LocalStateError::MissingRemoteField {
                field: "/b".to_string()
            })
        );
    }

    #[test]
    fn remote_null_stays_null() {
        let result = merged(
            "{ post { id isLiked @client } }",
            json!({ "post": { "isLiked": true } }),
            json!({ "post": null }),
        )
        .unwrap();
        assert_eq!(result, json!({ "post": null }));
    }

    #[test]
    fn unrequested_remote_keys_are_dropped() {
        let result = merged(
            "{ a @client b }",
            json!({ "a": 1 }),
            json!({ "b": 2, "extra": 3 }),
        )
        .unwrap();
        assert_eq!(result, json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn fully_subsumed_remote_parents_come_from_the_partial() {
        let result = merged(
            "{ settings { theme @client } other }",
            json!({ "settings": { "theme": "dark" } }),
            json!({ "other": 1 }),
        )
        .unwrap();
        assert_eq!(result, json!({ "settings": { "theme": "dark" }, "other": 1 }));
    }
}
