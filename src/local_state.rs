use std::sync::Arc;

use tracing::Instrument;

use crate::cache::CacheStore;
use crate::error::LocalStateError;
use crate::execution::exports;
use crate::execution::local::LocalExecution;
use crate::execution::merge;
use crate::execution::remote;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::registry::ResolverRegistry;
use crate::request::Request;
use crate::response::Response;
use crate::spec::Operation;
use crate::transport::RemoteTransport;

/// The local/remote query splitting engine.
///
/// Holds the three collaborators and runs the pipeline once per operation:
/// classification, local execution, export binding, remote dispatch, result
/// merging. The engine carries no per-operation state, so one instance can
/// serve any number of concurrent operations.
pub struct LocalState {
    resolvers: Arc<ResolverRegistry>,
    cache: Arc<dyn CacheStore>,
    transport: Arc<dyn RemoteTransport>,
}

impl LocalState {
    pub fn new(
        resolvers: Arc<ResolverRegistry>,
        cache: Arc<dyn CacheStore>,
        transport: Arc<dyn RemoteTransport>,
    ) -> Self {
        Self {
            resolvers,
            cache,
            transport,
        }
    }

    /// Run one operation through the pipeline and return the merged result
    /// tree.
    pub async fn run(&self, request: Request) -> Result<Value, LocalStateError> {
        let operation = Operation::parse(&request.query, request.operation_name.as_deref())?;
        tracing::debug!(
            operation_name = operation.name().unwrap_or(""),
            has_local_fields = operation.has_local_fields(),
            "operation classified"
        );

        let partial = if operation.has_local_fields() {
            LocalExecution::new(
                self.resolvers.as_ref(),
                self.cache.as_ref(),
                operation.kind(),
                request.variables.clone(),
            )
            .execute(operation.selection_set())
            .instrument(tracing::info_span!("local_execution"))
            .await?
        } else {
            Value::Object(Object::new())
        };

        let mut variables = request.variables;
        exports::bind(operation.selection_set(), &partial, &mut variables);

        let remote_result = remote::dispatch(self.transport.as_ref(), &operation, variables)
            .instrument(tracing::info_span!("remote_dispatch"))
            .await?;

        merge::merge(operation.selection_set(), &partial, &Value::Object(remote_result))
    }

    /// Run one operation and fold any failure into a GraphQL response, for
    /// callers embedding the engine behind a response surface.
    pub async fn execute(&self, request: Request) -> Response {
        match self.run(request).await {
            Ok(data) => Response::builder().data(data).build(),
            Err(error) => Response::builder()
                .errors(vec![error.to_graphql_error(None)])
                .build(),
        }
    }
}
