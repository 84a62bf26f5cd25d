use futures::future::BoxFuture;

use crate::cache::CacheStore;
use crate::error::LocalStateError;
use crate::json_ext::Object;
use crate::json_ext::Path;
use crate::json_ext::Value;
use crate::registry::ResolverContext;
use crate::registry::ResolverRegistry;
use crate::spec::OperationKind;
use crate::spec::Selection;
use crate::spec::TYPENAME;

/// Executes the locally resolvable part of one operation.
///
/// Fields run strictly in document order, depth first; a value exported by
/// an earlier field is visible to the arguments of every later one. The
/// produced partial result contains only local fields, plus the enclosing
/// positions of remote fields that carry local descendants so the merger
/// can graft local leaves into the remote object.
pub(crate) struct LocalExecution<'a> {
    registry: &'a ResolverRegistry,
    cache: &'a dyn CacheStore,
    kind: OperationKind,
    variables: Object,
}

impl<'a> LocalExecution<'a> {
    pub(crate) fn new(
        registry: &'a ResolverRegistry,
        cache: &'a dyn CacheStore,
        kind: OperationKind,
        variables: Object,
    ) -> Self {
        Self {
            registry,
            cache,
            kind,
            variables,
        }
    }

    pub(crate) async fn execute(
        mut self,
        selections: &[Selection],
    ) -> Result<Value, LocalStateError> {
        let root_type = self.kind.default_type_name().to_owned();
        let root = self
            .execute_selection_set(selections, &Value::Null, root_type, Path::empty())
            .await?;
        Ok(Value::Object(root))
    }

    fn execute_selection_set<'s>(
        &'s mut self,
        selections: &'s [Selection],
        parent: &'s Value,
        parent_type: String,
        path: Path,
    ) -> BoxFuture<'s, Result<Object, LocalStateError>> {
        Box::pin(async move {
            let mut result = Object::new();
            for selection in selections {
                let field_path = path.key(selection.response_key());
                if selection.is_local() {
                    let value = self
                        .resolve_field(selection, parent, &parent_type, field_path)
                        .await?;
                    result.insert(selection.response_key(), value);
                } else if selection.has_local() {
                    // Remote field with local descendants: materialize the
                    // enclosing position so local leaves have a parent
                    // context to resolve against.
                    let arguments = self.resolve_arguments(selection);
                    let context_value = parent
                        .as_object()
                        .and_then(|object| object.get(selection.name()))
                        .cloned()
                        .or_else(|| self.cache.read(parent, selection.name(), &arguments))
                        .unwrap_or(Value::Null);
                    let value = self
                        .execute_subtree(selection, &context_value, &parent_type, field_path)
                        .await?;
                    result.insert(selection.response_key(), value);
                }
            }
            Ok(result)
        })
    }

    /// Resolve one local field: registered resolver first, then the field
    /// off the parent's resolved value, then the cache reader. A field none
    /// of the three can produce is a fatal error.
    fn resolve_field<'s>(
        &'s mut self,
        selection: &'s Selection,
        parent: &'s Value,
        parent_type: &'s str,
        path: Path,
    ) -> BoxFuture<'s, Result<Value, LocalStateError>> {
        Box::pin(async move {
            let arguments = self.resolve_arguments(selection);
            let type_name = type_name_of(parent, parent_type);

            let resolver = self.registry.get(&type_name, selection.name()).cloned();
            let value = if let Some(resolver) = resolver {
                tracing::trace!(
                    field = selection.name(),
                    type_name = type_name.as_str(),
                    "invoking local resolver"
                );
                let context = ResolverContext {
                    operation_kind: self.kind,
                    variables: self.variables.clone(),
                };
                resolver
                    .resolve(parent, &arguments, &context)
                    .await
                    .map_err(|err| LocalStateError::LocalResolution {
                        field: path.to_string(),
                        reason: err.to_string(),
                    })?
            } else if let Some(value) = parent
                .as_object()
                .and_then(|object| object.get(selection.name()))
            {
                value.clone()
            } else if let Some(value) = self.cache.read(parent, selection.name(), &arguments) {
                value
            } else {
                failfast_debug!(
                    "no local resolver or cache entry for field '{}'",
                    path.to_string(),
                );
                return Err(LocalStateError::MissingCacheEntry {
                    field: path.to_string(),
                });
            };

            let value = if selection.selection_set().is_empty() {
                value
            } else {
                match &value {
                    Value::Null => Value::Null,
                    Value::Array(_) | Value::Object(_) => {
                        self.execute_subtree(selection, &value, &type_name, path.clone())
                            .await?
                    }
                    _ => {
                        return Err(LocalStateError::LocalResolution {
                            field: path.to_string(),
                            reason: "the value is not an object but the field has a selection set"
                                .to_string(),
                        })
                    }
                }
            };

            // The export settles once the subtree does: later fields and the
            // export binder both see the sub-selection-shaped value, never
            // the resolver's raw one.
            if let Some(name) = selection.export() {
                self.variables.insert(name, value.clone());
            }

            Ok(value)
        })
    }

    /// Recurse into a field's selection set, mapping over list values.
    fn execute_subtree<'s>(
        &'s mut self,
        selection: &'s Selection,
        value: &'s Value,
        parent_type: &'s str,
        path: Path,
    ) -> BoxFuture<'s, Result<Value, LocalStateError>> {
        Box::pin(async move {
            match value {
                Value::Array(items) => {
                    let mut resolved = Vec::with_capacity(items.len());
                    for (i, item) in items.iter().enumerate() {
                        resolved.push(
                            self.execute_subtree(selection, item, parent_type, path.index(i))
                                .await?,
                        );
                    }
                    Ok(Value::Array(resolved))
                }
                value => {
                    let type_name = type_name_of(value, parent_type);
                    let object = self
                        .execute_selection_set(selection.selection_set(), value, type_name, path)
                        .await?;
                    Ok(Value::Object(object))
                }
            }
        })
    }

    fn resolve_arguments(&self, selection: &Selection) -> Object {
        let mut arguments = Object::with_capacity(selection.arguments.len());
        for (name, value) in &selection.arguments {
            arguments.insert(name.as_str(), value.resolve(&self.variables));
        }
        arguments
    }
}

fn type_name_of(value: &Value, fallback: &str) -> String {
    value
        .as_object()
        .and_then(|object| object.get(TYPENAME))
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_owned()
}
