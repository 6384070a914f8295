//! GraphQL endpoint (`POST /graphql`).

#[cfg(feature = "http")]
pub mod client;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GraphQlError;

/// `{ query, variables }`. Mutations use the same shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorEntry {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub locations: Option<Value>,
    #[serde(default)]
    pub path: Option<Value>,
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl GraphQlResponse {
    /// `data`, or the first entry of `errors` carrying the partial data.
    pub fn into_result(self) -> Result<Value, GraphQlError> {
        match self.errors.and_then(|errors| errors.into_iter().next()) {
            Some(first) => Err(GraphQlError {
                message: first.message,
                locations: first.locations,
                path: first.path,
                extensions: first.extensions,
                data: self.data,
            }),
            None => Ok(self.data.unwrap_or(Value::Null)),
        }
    }
}
