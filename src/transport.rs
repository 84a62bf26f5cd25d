use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::error::BoxError;
use crate::json_ext::Object;
use crate::spec::OperationKind;

/// The residual operation handed to the remote transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRequest {
    /// The operation text with local selections removed. When the original
    /// operation had no local selections this is the original source,
    /// verbatim.
    pub query: String,

    /// The operation name, if the original operation had one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub operation_name: Option<String>,

    /// The operation kind.
    pub operation_kind: OperationKind,

    /// Frozen snapshot of the variables: the caller's map plus exported
    /// values. Never mutated after dispatch.
    #[serde(skip_serializing_if = "Object::is_empty", default)]
    pub variables: Object,
}

/// The remote execution collaborator.
///
/// Invoked at most once per operation, with no retry. Timeouts and
/// cancellation are the transport's own concern; the engine cancels by
/// dropping the returned future.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Execute the residual operation and return its result tree, keyed by
    /// response key.
    async fn execute(&self, request: RemoteRequest) -> Result<Object, BoxError>;
}
