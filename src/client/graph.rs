use serde::Serialize;
use serde_json::Value;

use super::utils::{path_list, CommonParams, QueryString};
use super::{ApiResponse, Elasticsearch, Request};
use crate::connection::Method;
use crate::error::{Result, SerializationError};

/// Body and parameters of [`Graph::explore`]. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExploreRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertices: Option<Vec<Value>>,
    #[serde(skip)]
    pub routing: Option<String>,
    #[serde(skip)]
    pub timeout: Option<String>,
}

pub struct Graph<'a> {
    client: &'a Elasticsearch,
}

impl<'a> Graph<'a> {
    pub(crate) fn new(client: &'a Elasticsearch) -> Self {
        Self { client }
    }

    /// Discover vertices and connections among documents in `indices`.
    pub async fn explore(
        &self,
        indices: &[&str],
        request: &ExploreRequest,
        common: &CommonParams,
    ) -> Result<ApiResponse> {
        let path = format!("/{}/_graph/explore", path_list("index", indices)?);
        let mut query = QueryString::with_common(common);
        query
            .set_opt("routing", request.routing.as_deref())
            .set_opt("timeout", request.timeout.as_deref());

        let body = serde_json::to_value(request).map_err(SerializationError::from)?;
        let mut req = Request::new(Method::Post, path, query);
        if body.as_object().is_some_and(|o| !o.is_empty()) {
            req = req.json_body(body);
        }
        self.client.send(req).await
    }
}
