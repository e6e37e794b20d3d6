use serde::Serialize;

use super::utils::{path_part, CommonParams, QueryString};
use super::{ApiResponse, Elasticsearch, Request};
use crate::connection::Method;
use crate::error::{Error, Result};

/// Timeouts accepted by every shutdown endpoint.
#[derive(Debug, Clone, Default)]
pub struct ShutdownParams {
    pub master_timeout: Option<String>,
    pub timeout: Option<String>,
    pub common: CommonParams,
}

impl ShutdownParams {
    fn query(&self) -> QueryString {
        let mut query = QueryString::with_common(&self.common);
        query
            .set_opt("master_timeout", self.master_timeout.as_deref())
            .set_opt("timeout", self.timeout.as_deref());
        query
    }
}

/// Body of [`Shutdown::put_node`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct PutNodeRequest {
    /// `restart`, `remove` or `replace`.
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation_delay: Option<String>,
    /// Required when `kind` is `replace`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_node_name: Option<String>,
}

/// Node shutdown preparation.
pub struct Shutdown<'a> {
    client: &'a Elasticsearch,
}

impl<'a> Shutdown<'a> {
    pub(crate) fn new(client: &'a Elasticsearch) -> Self {
        Self { client }
    }

    /// Cancel a pending shutdown, resuming normal operation on the node.
    pub async fn delete_node(&self, node_id: &str, params: &ShutdownParams) -> Result<ApiResponse> {
        let path = format!("/_nodes/{}/shutdown", path_part("node_id", node_id)?);
        self.client
            .send(Request::new(Method::Delete, path, params.query()))
            .await
    }

    /// Shutdown status of one node, or of all nodes when `node_id` is `None`.
    pub async fn get_node(&self, node_id: Option<&str>, params: &ShutdownParams) -> Result<ApiResponse> {
        let path = match node_id.filter(|id| !id.is_empty()) {
            Some(id) => format!("/_nodes/{}/shutdown", path_part("node_id", id)?),
            None => "/_nodes/shutdown".to_string(),
        };
        self.client
            .send(Request::new(Method::Get, path, params.query()))
            .await
    }

    pub async fn put_node(
        &self,
        node_id: &str,
        request: &PutNodeRequest,
        params: &ShutdownParams,
    ) -> Result<ApiResponse> {
        let path = format!("/_nodes/{}/shutdown", path_part("node_id", node_id)?);
        if request.reason.is_empty() {
            return Err(Error::InvalidArgument("Empty value passed for parameter 'reason'".into()));
        }
        if request.kind.is_empty() {
            return Err(Error::InvalidArgument("Empty value passed for parameter 'type'".into()));
        }
        let body = serde_json::to_value(request).map_err(crate::error::SerializationError::from)?;
        self.client
            .send(Request::new(Method::Put, path, params.query()).json_body(body))
            .await
    }
}
