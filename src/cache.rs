use crate::json_ext::Object;
use crate::json_ext::Value;

/// Read access to the client-side cache, supplied by the surrounding client.
///
/// Normalization and storage layout are entirely the implementor's concern;
/// the engine only asks for one field value at a time. The pipeline itself
/// never writes: `write_data` exists so callers can seed local state through
/// the same handle they hand to the engine.
pub trait CacheStore: Send + Sync {
    /// Read the value of `field_name` under the given parent value.
    ///
    /// `parent` is `Value::Null` when reading a root field. `arguments` are
    /// already coerced against the current variables.
    fn read(&self, parent: &Value, field_name: &str, arguments: &Object) -> Option<Value>;

    /// Merge a data tree into the cache.
    fn write_data(&self, data: Object);
}
