//! GraphQL sub-client.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::DaisyClient;
use crate::error::{HttpError, SdkError};
use crate::graphql::{GraphQlRequest, GraphQlResponse};

pub struct GraphQl<'a> {
    pub(crate) client: &'a DaisyClient,
}

impl<'a> GraphQl<'a> {
    pub async fn query(&self, query: &str, variables: Option<Value>) -> Result<Value, SdkError> {
        self.execute(GraphQlRequest {
            query: query.to_string(),
            variables,
        })
        .await
    }

    /// Same wire shape as [`GraphQl::query`].
    pub async fn mutation(&self, query: &str, variables: Option<Value>) -> Result<Value, SdkError> {
        self.query(query, variables).await
    }

    /// [`GraphQl::query`] decoded into `T`.
    pub async fn query_as<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<T, SdkError> {
        let data = self.query(query, variables).await?;
        Ok(serde_json::from_value(data)?)
    }

    pub async fn execute(&self, request: GraphQlRequest) -> Result<Value, SdkError> {
        let body = match self.client.http.post("/graphql", &request).await {
            Ok(resp) => resp.data,
            // GraphQL servers may answer errors with a 4xx status.
            Err(HttpError::Api { body, .. }) if body.get("errors").is_some() => body,
            Err(e) => return Err(e.into()),
        };

        let response: GraphQlResponse = serde_json::from_value(body)?;
        Ok(response.into_result()?)
    }
}
