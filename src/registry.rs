use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::BoxError;
use crate::error::LocalStateError;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::spec::OperationKind;

/// Execution context handed to every local resolver invocation.
#[derive(Debug, Clone)]
pub struct ResolverContext {
    /// Kind of the operation being executed.
    pub operation_kind: OperationKind,

    /// Current variables, including values exported by fields resolved
    /// earlier in document order.
    pub variables: Object,
}

/// A local resolver for one `(type, field)` pair.
pub trait LocalResolver: Send + Sync {
    /// Resolve the field against its parent value and coerced arguments.
    ///
    /// The returned future may suspend; the executor awaits it in place
    /// before moving to the next field in document order. `parent` is
    /// `Value::Null` for root fields.
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        arguments: &'a Object,
        context: &'a ResolverContext,
    ) -> BoxFuture<'a, Result<Value, BoxError>>;
}

impl<F> LocalResolver for F
where
    F: Fn(&Value, &Object, &ResolverContext) -> Result<Value, BoxError> + Send + Sync,
{
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        arguments: &'a Object,
        context: &'a ResolverContext,
    ) -> BoxFuture<'a, Result<Value, BoxError>> {
        Box::pin(futures::future::ready(self(parent, arguments, context)))
    }
}

/// Registry of local resolvers keyed by type and field name.
///
/// Registration is validated up front so execution can rely on the registry
/// being well formed: names must be valid GraphQL names and a pair can only
/// be registered once.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<(String, String), Arc<dyn LocalResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        resolver: impl LocalResolver + 'static,
    ) -> Result<(), LocalStateError> {
        let type_name = type_name.into();
        let field_name = field_name.into();
        if !is_graphql_name(&type_name) {
            return Err(LocalStateError::InvalidResolverRegistration {
                type_name,
                field_name,
                reason: "the type name is not a valid GraphQL name".to_string(),
            });
        }
        if !is_graphql_name(&field_name) {
            return Err(LocalStateError::InvalidResolverRegistration {
                type_name,
                field_name,
                reason: "the field name is not a valid GraphQL name".to_string(),
            });
        }
        if self
            .resolvers
            .contains_key(&(type_name.clone(), field_name.clone()))
        {
            return Err(LocalStateError::InvalidResolverRegistration {
                type_name,
                field_name,
                reason: "a resolver is already registered for this field".to_string(),
            });
        }
        self.resolvers
            .insert((type_name, field_name), Arc::new(resolver));
        Ok(())
    }

    pub(crate) fn get(
        &self,
        type_name: &str,
        field_name: &str,
    ) -> Option<&Arc<dyn LocalResolver>> {
        self.resolvers
            .get(&(type_name.to_owned(), field_name.to_owned()))
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(
                self.resolvers
                    .keys()
                    .map(|(type_name, field_name)| format!("{type_name}.{field_name}")),
            )
            .finish()
    }
}

fn is_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn noop(_: &Value, _: &Object, _: &ResolverContext) -> Result<Value, BoxError> {
        Ok(Value::Null)
    }

    #[test]
    fn registers_and_looks_up() {
        let mut registry = ResolverRegistry::new();
        registry.register("Query", "launches", noop).expect("valid");
        assert!(registry.get("Query", "launches").is_some());
        assert!(registry.get("Query", "other").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rejects_invalid_names() {
        let mut registry = ResolverRegistry::new();
        assert!(matches!(
            registry.register("1Query", "field", noop),
            Err(LocalStateError::InvalidResolverRegistration { .. })
        ));
        assert!(matches!(
            registry.register("Query", "bad name", noop),
            Err(LocalStateError::InvalidResolverRegistration { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_duplicates() {
        let mut registry = ResolverRegistry::new();
        registry.register("Query", "field", noop).expect("valid");
        assert!(matches!(
            registry.register("Query", "field", noop),
            Err(LocalStateError::InvalidResolverRegistration { .. })
        ));
    }
}
