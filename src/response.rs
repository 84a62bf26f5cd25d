use serde::Deserialize;
use serde::Serialize;
use typed_builder::TypedBuilder;

use crate::error::GraphQLError;
use crate::json_ext::Value;

/// A GraphQL response carrying the merged result tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
pub struct Response {
    /// The merged response data, matching the original query shape.
    #[builder(default = Value::Null)]
    pub data: Value,

    /// The errors raised while executing the operation.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[builder(default)]
    pub errors: Vec<GraphQLError>,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
