use serde::Deserialize;
use serde::Serialize;
use typed_builder::TypedBuilder;

use crate::json_ext::Object;

/// A GraphQL request to run through the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
pub struct Request {
    /// The GraphQL operation source text.
    pub query: String,

    /// The operation name, required when the document contains more than
    /// one operation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[builder(default)]
    pub operation_name: Option<String>,

    /// The operation variables.
    #[serde(skip_serializing_if = "Object::is_empty", default)]
    #[builder(default)]
    pub variables: Object,
}
