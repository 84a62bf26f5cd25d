//! JSON value extensions used across the pipeline.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

pub use serde_json_bytes::ByteString;
pub use serde_json_bytes::Map;
pub use serde_json_bytes::Value;

/// A JSON object, keyed by response key (field alias).
pub type Object = Map<ByteString, Value>;

/// One element of a [`Path`].
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// An index in a list value.
    Index(usize),

    /// A response key in an object value.
    Key(String),
}

/// A path into a result tree, used in error diagnostics.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Path(pub Vec<PathElement>);

impl Path {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn key(&self, key: &str) -> Self {
        let mut elements = self.0.clone();
        elements.push(PathElement::Key(key.to_string()));
        Self(elements)
    }

    pub(crate) fn index(&self, index: usize) -> Self {
        let mut elements = self.0.clone();
        elements.push(PathElement::Index(index));
        Self(elements)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.0 {
            match element {
                PathElement::Index(index) => write!(f, "/{index}")?,
                PathElement::Key(key) => write!(f, "/{key}")?,
            }
        }
        Ok(())
    }
}

pub(crate) trait ValueExt {
    /// Deep merge `other` into `self`: objects merge field by field, lists
    /// element by element, anything else is replaced. An incoming null never
    /// overwrites an existing value.
    fn deep_merge(&mut self, other: Value);
}

impl ValueExt for Value {
    fn deep_merge(&mut self, other: Value) {
        match (self, other) {
            (Value::Object(existing), Value::Object(incoming)) => {
                for (key, value) in incoming {
                    match existing.get_mut(key.as_str()) {
                        Some(target) => target.deep_merge(value),
                        None => {
                            existing.insert(key, value);
                        }
                    }
                }
            }
            (Value::Array(existing), Value::Array(incoming)) => {
                for (target, value) in existing.iter_mut().zip(incoming) {
                    target.deep_merge(value);
                }
            }
            (_, Value::Null) => {}
            (target, other) => {
                *target = other;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json_bytes::json;
    use test_log::test;

    #[test]
    fn deep_merge_objects_field_by_field() {
        let mut target = json!({ "a": { "x": 1 }, "b": 2 });
        target.deep_merge(json!({ "a": { "y": 3 }, "c": 4 }));
        assert_eq!(target, json!({ "a": { "x": 1, "y": 3 }, "b": 2, "c": 4 }));
    }

    #[test]
    fn deep_merge_lists_element_wise() {
        let mut target = json!([{ "a": 1 }, { "a": 2 }]);
        target.deep_merge(json!([{ "b": 3 }, { "b": 4 }]));
        assert_eq!(target, json!([{ "a": 1, "b": 3 }, { "a": 2, "b": 4 }]));
    }

    #[test]
    fn deep_merge_null_does_not_overwrite() {
        let mut target = json!({ "a": 1 });
        target.deep_merge(json!({ "a": null }));
        assert_eq!(target, json!({ "a": 1 }));
    }

    #[test]
    fn path_display() {
        let path = Path::empty().key("user").key("posts").index(2).key("title");
        assert_eq!(path.to_string(), "/user/posts/2/title");
        assert!(Path::empty().is_empty());
    }
}
