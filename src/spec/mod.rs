//! Parsed operation model: directive classification, export bindings and
//! residual operation printing.

mod input_value;
mod operation;
mod selection;

pub(crate) use input_value::InputValue;
pub use operation::Operation;
pub use operation::OperationKind;
pub use selection::Locality;
pub use selection::Selection;

pub(crate) const CLIENT_DIRECTIVE_NAME: &str = "client";
pub(crate) const EXPORT_DIRECTIVE_NAME: &str = "export";
pub(crate) const EXPORT_AS_ARGUMENT_NAME: &str = "as";
pub(crate) const TYPENAME: &str = "__typename";
