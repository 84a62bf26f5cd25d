use displaydoc::Display;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::json_ext::Object;
use crate::json_ext::Path;
use crate::json_ext::Value;

/// Boxed error type accepted from collaborators (resolvers, transports).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for local state execution.
///
/// Every variant is fatal for the operation it occurs in: an exported
/// variable feeds directly into the correctness of the remote operation, so
/// nothing here is swallowed or defaulted.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[ignore_extra_doc_attributes]
pub enum LocalStateError {
    /// invalid operation document: {reason}
    InvalidDocument {
        /// The reason the document was rejected.
        reason: String,
    },

    /// unknown fragment '{name}'
    UnknownFragment {
        /// The spread fragment name.
        name: String,
    },

    /// field '{field}' has an @export directive without a string 'as' argument
    ExportMissingArgument {
        /// The field carrying the malformed directive.
        field: String,
    },

    /// cannot register resolver for '{type_name}.{field_name}': {reason}
    InvalidResolverRegistration {
        /// The type name the resolver was registered under.
        type_name: String,
        /// The field name the resolver was registered under.
        field_name: String,
        /// The reason registration was rejected.
        reason: String,
    },

    /// local resolution of field '{field}' failed: {reason}
    LocalResolution {
        /// Path of the failing field in the result tree.
        field: String,
        /// The resolver's error message.
        reason: String,
    },

    /// no local resolver or cache entry for field '{field}'
    MissingCacheEntry {
        /// Path of the field that could not be resolved.
        field: String,
    },

    /// remote execution failed: {reason}
    RemoteExecution {
        /// The transport's error message.
        reason: String,
    },

    /// remote result is missing field '{field}'
    MissingRemoteField {
        /// Path of the field absent from the transport result.
        field: String,
    },

    /// malformed remote result at '{field}': {reason}
    MalformedRemoteResult {
        /// Path of the malformed value.
        field: String,
        /// What did not line up with the operation shape.
        reason: String,
    },
}

impl LocalStateError {
    /// Machine readable code, exposed as `extensions.code` on the converted
    /// GraphQL error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDocument { .. } => "INVALID_DOCUMENT",
            Self::UnknownFragment { .. } => "UNKNOWN_FRAGMENT",
            Self::ExportMissingArgument { .. } => "EXPORT_MISSING_ARGUMENT",
            Self::InvalidResolverRegistration { .. } => "INVALID_RESOLVER_REGISTRATION",
            Self::LocalResolution { .. } => "LOCAL_RESOLUTION_FAILED",
            Self::MissingCacheEntry { .. } => "MISSING_CACHE_ENTRY",
            Self::RemoteExecution { .. } => "REMOTE_EXECUTION_FAILED",
            Self::MissingRemoteField { .. } => "MISSING_REMOTE_FIELD",
            Self::MalformedRemoteResult { .. } => "MALFORMED_REMOTE_RESULT",
        }
    }

    /// Convert to a GraphQL error as found in the `errors` field of a
    /// response.
    pub fn to_graphql_error(&self, path: Option<Path>) -> GraphQLError {
        let mut extensions = Object::new();
        extensions.insert("code", Value::String(self.code().into()));
        GraphQLError {
            message: self.to_string(),
            path,
            extensions,
        }
    }
}

/// Any error, as found in the `errors` field of a GraphQL response.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct GraphQLError {
    /// The error message.
    pub message: String,

    /// The path of the field in error, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<Path>,

    /// The optional GraphQL extensions.
    #[serde(skip_serializing_if = "Object::is_empty", default)]
    pub extensions: Object,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json_bytes::json;
    use test_log::test;

    #[test]
    fn error_conversion_carries_code_and_path() {
        let error = LocalStateError::MissingCacheEntry {
            field: "/user/name".to_string(),
        };
        let converted = error.to_graphql_error(Some(Path::empty().key("user").key("name")));
        assert_eq!(
            converted.message,
            "no local resolver or cache entry for field '/user/name'"
        );
        assert_eq!(
            converted.extensions.get("code"),
            Some(&json!("MISSING_CACHE_ENTRY"))
        );
        assert_eq!(converted.path.map(|p| p.to_string()), Some("/user/name".to_string()));
    }

    #[test]
    fn errors_serialize_tagged() {
        let error = LocalStateError::RemoteExecution {
            reason: "boom".to_string(),
        };
        let serialized = serde_json::to_value(&error).expect("serializes");
        assert_eq!(
            serialized,
            serde_json::json!({ "type": "RemoteExecution", "reason": "boom" })
        );
    }
}
