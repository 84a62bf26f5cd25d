use crate::error::LocalStateError;
use crate::json_ext::Object;
use crate::spec::Operation;
use crate::transport::RemoteRequest;
use crate::transport::RemoteTransport;

/// Dispatch the residual operation, if any.
///
/// Returns an empty result without touching the transport when every
/// selection resolved locally. The transport is called exactly once and
/// never retried.
pub(crate) async fn dispatch(
    transport: &dyn RemoteTransport,
    operation: &Operation,
    variables: Object,
) -> Result<Object, LocalStateError> {
    let Some(query) = operation.residual_query() else {
        tracing::debug!("the operation is fully local, skipping remote dispatch");
        return Ok(Object::new());
    };

    let request = RemoteRequest {
        query,
        operation_name: operation.name().map(str::to_owned),
        operation_kind: operation.kind(),
        variables,
    };
    transport.execute(request).await.map_err(|err| {
        failfast_error!("remote execution failed: {}", err);
        LocalStateError::RemoteExecution {
            reason: err.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_ext::Value;
    use crate::mock::FailingTransport;
    use crate::mock::MockTransport;
    use crate::spec::Operation;
    use crate::spec::OperationKind;
    use serde_json_bytes::json;

    #[tokio::test]
    async fn skips_the_transport_when_fully_local() {
        let transport = MockTransport::new(Object::new());
        let operation = Operation::parse("{ a @client }", None).expect("valid");
        let result = dispatch(&transport, &operation, Object::new()).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn sends_the_residual_operation_once() {
        let transport = MockTransport::new(json!({ "b": 2 }).as_object().unwrap().clone());
        let operation = Operation::parse("query Q { a @client b }", None).expect("valid");
        let variables = json!({ "x": 1 }).as_object().unwrap().clone();
        let result = dispatch(&transport, &operation, variables.clone()).await.unwrap();
        assert_eq!(Value::Object(result), json!({ "b": 2 }));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query, "query Q { b }");
        assert_eq!(requests[0].operation_name.as_deref(), Some("Q"));
        assert_eq!(requests[0].operation_kind, OperationKind::Query);
        assert_eq!(requests[0].variables, variables);
    }

    #[tokio::test]
    async fn transport_failures_map_to_remote_execution_errors() {
        let transport = FailingTransport;
        let operation = Operation::parse("{ a }", None).expect("valid");
        let result = dispatch(&transport, &operation, Object::new()).await;
        assert!(matches!(
            result,
            Err(LocalStateError::RemoteExecution { .. })
        ));
    }
}
