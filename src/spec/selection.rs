use std::collections::HashMap;

use apollo_compiler::ast;
use apollo_compiler::Node;

use crate::error::LocalStateError;
use crate::spec::InputValue;
use crate::spec::CLIENT_DIRECTIVE_NAME;
use crate::spec::EXPORT_AS_ARGUMENT_NAME;
use crate::spec::EXPORT_DIRECTIVE_NAME;

/// Cap on selection set nesting, including through fragment spreads.
const RECURSION_LIMIT: usize = 512;

pub(crate) type FragmentMap<'a> = HashMap<&'a str, &'a Node<ast::FragmentDefinition>>;

/// Where a field's value comes from, computed once during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    /// The field itself carries the `@client` directive.
    Local,

    /// An enclosing field or fragment carries `@client`. Locality covers the
    /// whole subtree: a local boundary is never split further.
    InheritedLocal,

    /// The field is resolved by the remote transport.
    Remote,
}

impl Locality {
    pub fn is_local(&self) -> bool {
        matches!(self, Locality::Local | Locality::InheritedLocal)
    }
}

/// How locality flows into a nested selection set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InheritedLocality {
    /// No enclosing selection is local.
    None,

    /// An enclosing field is local; nested fields inherit.
    FromField,

    /// The enclosing fragment carries `@client`. A directive on a fragment
    /// applies to the fragment's own fields directly, so they classify as
    /// [`Locality::Local`], not as inherited.
    FromFragment,
}

impl InheritedLocality {
    fn locality(self) -> Locality {
        match self {
            InheritedLocality::None => Locality::Remote,
            InheritedLocality::FromField => Locality::InheritedLocal,
            InheritedLocality::FromFragment => Locality::Local,
        }
    }
}

/// A directive re-printed on the residual operation. `@client` and `@export`
/// never appear here; anything else (`@skip`, `@include`, custom directives)
/// passes through uninterpreted.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Directive {
    pub(crate) name: String,
    pub(crate) arguments: Vec<(String, InputValue)>,
}

/// One classified field selection.
///
/// Fragment spreads and inline fragments are inlined during classification,
/// so the tree only ever contains fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) arguments: Vec<(String, InputValue)>,
    pub(crate) directives: Vec<Directive>,
    pub(crate) locality: Locality,
    pub(crate) export: Option<String>,
    pub(crate) carries_export: bool,
    pub(crate) selection_set: Vec<Selection>,
}

impl Selection {
    /// The key under which this field appears in the result tree.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// The field name as defined in the schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn locality(&self) -> Locality {
        self.locality
    }

    /// The variable name this field exports its value to, if any.
    pub fn export(&self) -> Option<&str> {
        self.export.as_deref()
    }

    pub fn selection_set(&self) -> &[Selection] {
        &self.selection_set
    }

    pub(crate) fn is_local(&self) -> bool {
        self.locality.is_local()
    }

    /// Whether this field or any descendant resolves locally.
    pub(crate) fn has_local(&self) -> bool {
        self.is_local() || self.selection_set.iter().any(Selection::has_local)
    }

    /// Whether this field still reaches the transport: it is not local and
    /// either is a leaf or keeps at least one dispatched descendant. A
    /// remote field whose children are all local would print as an empty
    /// selection set, so it is pruned from the residual operation and its
    /// value is taken from the local partial during the merge.
    pub(crate) fn is_dispatched(&self) -> bool {
        !self.is_local()
            && (self.selection_set.is_empty()
                || self.selection_set.iter().any(Selection::is_dispatched))
    }

    /// Whether printing this subtree into the residual operation would drop
    /// anything: a local selection, or an `@export` directive (which is
    /// stripped even when inert). When nothing would be dropped the
    /// original source can be forwarded verbatim.
    pub(crate) fn has_stripped_directives(&self) -> bool {
        self.is_local()
            || self.carries_export
            || self
                .selection_set
                .iter()
                .any(Selection::has_stripped_directives)
    }

    fn from_field(
        field: &ast::Field,
        fragments: &FragmentMap,
        inherited: InheritedLocality,
        depth: usize,
    ) -> Result<Self, LocalStateError> {
        if depth > RECURSION_LIMIT {
            return Err(LocalStateError::InvalidDocument {
                reason: format!("selection set nesting exceeds the limit of {RECURSION_LIMIT}"),
            });
        }

        let locality = if field.directives.get(CLIENT_DIRECTIVE_NAME).is_some() {
            Locality::Local
        } else {
            inherited.locality()
        };

        // @export on a field outside a local boundary has no effect, so it
        // is only parsed (and validated) on local fields.
        let carries_export = field.directives.get(EXPORT_DIRECTIVE_NAME).is_some();
        let export = if locality.is_local() {
            parse_export(&field.directives, field.name.as_str())?
        } else {
            None
        };

        let arguments = field
            .arguments
            .iter()
            .map(|argument| {
                Ok((
                    argument.name.as_str().to_owned(),
                    InputValue::from_ast(&argument.value)?,
                ))
            })
            .collect::<Result<Vec<_>, LocalStateError>>()?;

        let children_inherit = if locality.is_local() {
            InheritedLocality::FromField
        } else {
            InheritedLocality::None
        };
        let selection_set =
            flatten_selection_set(&field.selection_set, fragments, children_inherit, depth + 1)?;

        Ok(Selection {
            name: field.name.as_str().to_owned(),
            alias: field.alias.as_ref().map(|alias| alias.as_str().to_owned()),
            arguments,
            directives: passthrough_directives(&field.directives)?,
            locality,
            export,
            carries_export,
            selection_set,
        })
    }

    /// Print this field into the residual operation, pruning local subtrees.
    pub(crate) fn write_residual(&self, buf: &mut String) {
        if let Some(alias) = &self.alias {
            buf.push_str(alias);
            buf.push_str(": ");
        }
        buf.push_str(&self.name);

        if !self.arguments.is_empty() {
            buf.push('(');
            for (i, (name, value)) in self.arguments.iter().enumerate() {
                if i > 0 {
                    buf.push_str(", ");
                }
                buf.push_str(name);
                buf.push_str(": ");
                value.write(buf);
            }
            buf.push(')');
        }

        for directive in &self.directives {
            buf.push_str(" @");
            buf.push_str(&directive.name);
            if !directive.arguments.is_empty() {
                buf.push('(');
                for (i, (name, value)) in directive.arguments.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    buf.push_str(name);
                    buf.push_str(": ");
                    value.write(buf);
                }
                buf.push(')');
            }
        }

        let dispatched: Vec<&Selection> = self
            .selection_set
            .iter()
            .filter(|selection| selection.is_dispatched())
            .collect();
        if !dispatched.is_empty() {
            buf.push_str(" { ");
            for selection in dispatched {
                selection.write_residual(buf);
                buf.push(' ');
            }
            buf.push('}');
        }
    }
}

fn parse_export(
    directives: &ast::DirectiveList,
    field_name: &str,
) -> Result<Option<String>, LocalStateError> {
    let Some(directive) = directives.get(EXPORT_DIRECTIVE_NAME) else {
        return Ok(None);
    };
    directive
        .specified_argument_by_name(EXPORT_AS_ARGUMENT_NAME)
        .and_then(|value| value.as_str())
        .map(|name| Some(name.to_owned()))
        .ok_or_else(|| LocalStateError::ExportMissingArgument {
            field: field_name.to_owned(),
        })
}

fn passthrough_directives(
    directives: &ast::DirectiveList,
) -> Result<Vec<Directive>, LocalStateError> {
    directives
        .0
        .iter()
        .filter(|directive| {
            directive.name.as_str() != CLIENT_DIRECTIVE_NAME
                && directive.name.as_str() != EXPORT_DIRECTIVE_NAME
        })
        .map(|directive| {
            Ok(Directive {
                name: directive.name.as_str().to_owned(),
                arguments: directive
                    .arguments
                    .iter()
                    .map(|argument| {
                        Ok((
                            argument.name.as_str().to_owned(),
                            InputValue::from_ast(&argument.value)?,
                        ))
                    })
                    .collect::<Result<Vec<_>, LocalStateError>>()?,
            })
        })
        .collect()
}

/// Flatten a selection set into a plain field list, inlining fragment
/// spreads and inline fragments. `@client` on a fragment spread, a fragment
/// definition or an inline fragment marks every inlined field local.
pub(crate) fn flatten_selection_set(
    selections: &[ast::Selection],
    fragments: &FragmentMap,
    inherited: InheritedLocality,
    depth: usize,
) -> Result<Vec<Selection>, LocalStateError> {
    let mut flattened = Vec::new();
    for selection in selections {
        match selection {
            ast::Selection::Field(field) => {
                flattened.push(Selection::from_field(field, fragments, inherited, depth)?);
            }
            ast::Selection::InlineFragment(inline) => {
                let next = if inline.directives.get(CLIENT_DIRECTIVE_NAME).is_some() {
                    InheritedLocality::FromFragment
                } else {
                    inherited
                };
                flattened.extend(flatten_selection_set(
                    &inline.selection_set,
                    fragments,
                    next,
                    depth + 1,
                )?);
            }
            ast::Selection::FragmentSpread(spread) => {
                let fragment = fragments.get(spread.fragment_name.as_str()).ok_or_else(|| {
                    LocalStateError::UnknownFragment {
                        name: spread.fragment_name.as_str().to_owned(),
                    }
                })?;
                let next = if spread.directives.get(CLIENT_DIRECTIVE_NAME).is_some()
                    || fragment.directives.get(CLIENT_DIRECTIVE_NAME).is_some()
                {
                    InheritedLocality::FromFragment
                } else {
                    inherited
                };
                flattened.extend(flatten_selection_set(
                    &fragment.selection_set,
                    fragments,
                    next,
                    depth + 1,
                )?);
            }
        }
    }
    Ok(flattened)
}
