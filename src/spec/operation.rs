use std::collections::HashMap;
use std::fmt;

use apollo_compiler::ast;
use serde::Deserialize;
use serde::Serialize;

use crate::error::LocalStateError;
use crate::spec::selection;
use crate::spec::selection::FragmentMap;
use crate::spec::InputValue;
use crate::spec::Selection;

/// GraphQL operation type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    #[default]
    Query,
    Mutation,
}

impl OperationKind {
    /// The default type name of the operation's root, used for resolver
    /// lookup when no `__typename` is available.
    pub(crate) const fn default_type_name(&self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
        }
    }

    const fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable declared by the operation, kept in printable form so the
/// residual operation preserves all original declarations.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VariableDefinition {
    pub(crate) name: String,
    pub(crate) ty: String,
    pub(crate) default_value: Option<InputValue>,
}

/// One parsed and classified operation.
///
/// Immutable after construction: the classifier runs exactly once per
/// operation, and every later pipeline stage reads the same tree.
#[derive(Debug, Clone)]
pub struct Operation {
    kind: OperationKind,
    name: Option<String>,
    variable_definitions: Vec<VariableDefinition>,
    selection_set: Vec<Selection>,
    source: String,
}

impl Operation {
    /// Parse and classify one operation from an executable document.
    ///
    /// `operation_name` selects the operation when the document contains
    /// several; it is otherwise optional. Fragment spreads are resolved
    /// against the same document and inlined.
    pub fn parse(source: &str, operation_name: Option<&str>) -> Result<Self, LocalStateError> {
        let document = ast::Document::parse(source, "operation.graphql").map_err(|with_errors| {
            LocalStateError::InvalidDocument {
                reason: with_errors.errors.to_string(),
            }
        })?;

        let mut operations = Vec::new();
        let mut fragments: FragmentMap = HashMap::new();
        for definition in &document.definitions {
            match definition {
                ast::Definition::OperationDefinition(operation) => operations.push(operation),
                ast::Definition::FragmentDefinition(fragment) => {
                    fragments.insert(fragment.name.as_str(), fragment);
                }
                _ => {}
            }
        }

        let definition = match operation_name {
            Some(name) => operations
                .iter()
                .find(|operation| {
                    operation.name.as_ref().map(|n| n.as_str()) == Some(name)
                })
                .ok_or_else(|| LocalStateError::InvalidDocument {
                    reason: format!("the document contains no operation named '{name}'"),
                })?,
            None => match operations.as_slice() {
                [operation] => operation,
                [] => {
                    return Err(LocalStateError::InvalidDocument {
                        reason: "the document contains no operation".to_string(),
                    })
                }
                _ => {
                    return Err(LocalStateError::InvalidDocument {
                        reason: "the document contains multiple operations \
                                 and no operation name was provided"
                            .to_string(),
                    })
                }
            },
        };

        let kind = match definition.operation_type {
            ast::OperationType::Query => OperationKind::Query,
            ast::OperationType::Mutation => OperationKind::Mutation,
            ast::OperationType::Subscription => {
                return Err(LocalStateError::InvalidDocument {
                    reason: "subscriptions are not supported".to_string(),
                })
            }
        };

        let variable_definitions = definition
            .variables
            .iter()
            .map(|variable| {
                Ok(VariableDefinition {
                    name: variable.name.as_str().to_owned(),
                    ty: print_type(&variable.ty),
                    default_value: variable
                        .default_value
                        .as_ref()
                        .map(|value| InputValue::from_ast(value))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>, LocalStateError>>()?;

        let selection_set = selection::flatten_selection_set(
            &definition.selection_set,
            &fragments,
            selection::InheritedLocality::None,
            0,
        )?;

        Ok(Operation {
            kind,
            name: definition.name.as_ref().map(|name| name.as_str().to_owned()),
            variable_definitions,
            selection_set,
            source: source.to_owned(),
        })
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The classified root selections.
    pub fn selection_set(&self) -> &[Selection] {
        &self.selection_set
    }

    /// Whether any selection in the operation resolves locally.
    pub fn has_local_fields(&self) -> bool {
        self.selection_set.iter().any(Selection::has_local)
    }

    /// The operation text still to be sent to the transport.
    ///
    /// When the operation carries nothing to strip (no local selections and
    /// no `@export`, even inert) the original source is forwarded verbatim;
    /// otherwise the tree is re-printed with `@client`/`@export` removed.
    /// Returns `None` when every selection resolves locally.
    pub(crate) fn residual_query(&self) -> Option<String> {
        if !self
            .selection_set
            .iter()
            .any(Selection::has_stripped_directives)
        {
            return Some(self.source.clone());
        }

        let dispatched: Vec<&Selection> = self
            .selection_set
            .iter()
            .filter(|selection| selection.is_dispatched())
            .collect();
        if dispatched.is_empty() {
            return None;
        }

        let mut buf = String::new();
        // anonymous queries without variables keep the shorthand form
        if self.kind != OperationKind::Query
            || self.name.is_some()
            || !self.variable_definitions.is_empty()
        {
            buf.push_str(self.kind.as_str());
        }
        if let Some(name) = &self.name {
            buf.push(' ');
            buf.push_str(name);
        }
        if !self.variable_definitions.is_empty() {
            buf.push('(');
            for (i, variable) in self.variable_definitions.iter().enumerate() {
                if i > 0 {
                    buf.push_str(", ");
                }
                buf.push('$');
                buf.push_str(&variable.name);
                buf.push_str(": ");
                buf.push_str(&variable.ty);
                if let Some(default_value) = &variable.default_value {
                    buf.push_str(" = ");
                    default_value.write(&mut buf);
                }
            }
            buf.push(')');
        }
        if !buf.is_empty() {
            buf.push(' ');
        }
        buf.push_str("{ ");
        for selection in dispatched {
            selection.write_residual(&mut buf);
            buf.push(' ');
        }
        buf.push('}');
        Some(buf)
    }
}

fn print_type(ty: &ast::Type) -> String {
    match ty {
        ast::Type::Named(name) => name.as_str().to_owned(),
        ast::Type::NonNullNamed(name) => format!("{name}!"),
        ast::Type::List(inner) => format!("[{}]", print_type(inner)),
        ast::Type::NonNullList(inner) => format!("[{}]!", print_type(inner)),
    }
}
