//! Mock collaborators for tests and for embedding the engine without a real
//! backend.

use async_trait::async_trait;
use parking_lot::Mutex;
use parking_lot::RwLock;

use crate::cache::CacheStore;
use crate::error::BoxError;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::json_ext::ValueExt;
use crate::transport::RemoteRequest;
use crate::transport::RemoteTransport;

/// A transport that returns a canned result and records every request it
/// receives.
#[derive(Default)]
pub struct MockTransport {
    result: Object,
    requests: Mutex<Vec<RemoteRequest>>,
}

impl MockTransport {
    pub fn new(result: Object) -> Self {
        Self {
            result,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl RemoteTransport for MockTransport {
    async fn execute(&self, request: RemoteRequest) -> Result<Object, BoxError> {
        self.requests.lock().push(request);
        Ok(self.result.clone())
    }
}

/// A transport that always fails, for error path tests.
#[derive(Default)]
pub struct FailingTransport;

#[async_trait]
impl RemoteTransport for FailingTransport {
    async fn execute(&self, _request: RemoteRequest) -> Result<Object, BoxError> {
        Err("remote transport unavailable".into())
    }
}

/// An in-memory cache holding one denormalized data tree.
///
/// Root fields are read off the tree; nested fields are served off the
/// parent value by the executor itself, so nested reads return `None` here.
#[derive(Default)]
pub struct InMemoryCache {
    data: RwLock<Object>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for InMemoryCache {
    fn read(&self, parent: &Value, field_name: &str, _arguments: &Object) -> Option<Value> {
        if parent.is_null() {
            self.data.read().get(field_name).cloned()
        } else {
            None
        }
    }

    fn write_data(&self, data: Object) {
        let mut tree = self.data.write();
        for (key, value) in data {
            match tree.get_mut(key.as_str()) {
                Some(existing) => existing.deep_merge(value),
                None => {
                    tree.insert(key, value);
                }
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
    fn cache_merges_written_trees() {
        let cache = InMemoryCache::new();
        cache.write_data(json!({ "user": { "id": 1 } }).as_object().unwrap().clone());
        cache.write_data(json!({ "user": { "name": "ada" } }).as_object().unwrap().clone());
        assert_eq!(
            cache.read(&Value::Null, "user", &Object::new()),
            Some(json!({ "id": 1, "name": "ada" }))
        );
        assert_eq!(cache.read(&Value::Null, "missing", &Object::new()), None);
    }

    #[tokio::test]
    async fn transport_records_requests() {
        let transport = MockTransport::new(json!({ "a": 1 }).as_object().unwrap().clone());
        let request = RemoteRequest {
            query: "{ a }".to_string(),
            operation_name: None,
            operation_kind: crate::spec::OperationKind::Query,
            variables: Object::new(),
        };
        let result = transport.execute(request.clone()).await.unwrap();
        assert_eq!(Value::Object(result), json!({ "a": 1 }));
        assert_eq!(transport.requests(), vec![request]);
        assert_eq!(transport.call_count(), 1);
    }
}
