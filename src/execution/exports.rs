use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::spec::Selection;

/// Fold `@export(as:)` values from the partial local result into the
/// variables map used for the remote dispatch.
///
/// The walk follows the same depth-first document order as local execution,
/// so when several fields export to the same variable the last one in
/// document order wins, including across list elements. Caller variables
/// not targeted by an export are left untouched.
pub(crate) fn bind(selections: &[Selection], partial: &Value, variables: &mut Object) {
    for selection in selections {
        let Some(value) = partial
            .as_object()
            .and_then(|object| object.get(selection.response_key()))
        else {
            continue;
        };
        if let Some(name) = selection.export() {
            tracing::trace!(variable = name, "binding exported value");
            variables.insert(name, value.clone());
        }
        match value {
            Value::Array(items) => {
                for item in items {
                    bind(selection.selection_set(), item, variables);
                }
            }
            value => bind(selection.selection_set(), value, variables),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Operation;
    use serde_json_bytes::json;
    use test_log::test;

    fn bound(source: &str, partial: Value, variables: Value) -> Object {
        let operation = Operation::parse(source, None).expect("valid operation");
        let mut variables = variables.as_object().cloned().unwrap_or_default();
        bind(operation.selection_set(), &partial, &mut variables);
        variables
    }

    #[test]
    fn binds_exports_from_the_partial_result() {
        let variables = bound(
            "{ currentId @client @export(as: \"id\") }",
            json!({ "currentId": 7 }),
            json!({ "other": 1 }),
        );
        assert_eq!(Value::Object(variables), json!({ "other": 1, "id": 7 }));
    }

    #[test]
    fn binds_nested_exports_by_path() {
        let variables = bound(
            "{ author @client { id @export(as: \"authorId\") } }",
            json!({ "author": { "id": 100 } }),
            json!({}),
        );
        assert_eq!(Value::Object(variables), json!({ "authorId": 100 }));
    }

    #[test]
    fn last_binding_in_document_order_wins() {
        let variables = bound(
            "{ a @client @export(as: \"id\") b @client @export(as: \"id\") }",
            json!({ "a": 1, "b": 2 }),
            json!({}),
        );
        assert_eq!(Value::Object(variables), json!({ "id": 2 }));
    }

    #[test]
    fn list_elements_bind_in_order() {
        let variables = bound(
            "{ items @client { id @export(as: \"last\") } }",
            json!({ "items": [{ "id": 1 }, { "id": 2 }, { "id": 3 }] }),
            json!({}),
        );
        assert_eq!(Value::Object(variables), json!({ "last": 3 }));
    }

    #[test]
    fn caller_variables_overwritten_only_by_exports() {
        let variables = bound(
            "{ a @client @export(as: \"id\") }",
            json!({ "a": 9 }),
            json!({ "id": 1, "untouched": true }),
        );
        assert_eq!(Value::Object(variables), json!({ "id": 9, "untouched": true }));
    }
}
