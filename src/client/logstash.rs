use serde_json::Value;

use super::utils::{path_list, path_part, CommonParams, QueryString};
use super::{ApiResponse, Elasticsearch, Request};
use crate::connection::Method;
use crate::error::{Error, Result};

/// Centrally managed Logstash pipelines.
pub struct Logstash<'a> {
    client: &'a Elasticsearch,
}

impl<'a> Logstash<'a> {
    pub(crate) fn new(client: &'a Elasticsearch) -> Self {
        Self { client }
    }

    pub async fn delete_pipeline(&self, id: &str, common: &CommonParams) -> Result<ApiResponse> {
        let path = format!("/_logstash/pipeline/{}", path_part("id", id)?);
        self.client
            .send(Request::new(Method::Delete, path, QueryString::with_common(common)))
            .await
    }

    /// Fetch the given pipelines, or all of them when `ids` is empty.
    pub async fn get_pipeline(&self, ids: &[&str], common: &CommonParams) -> Result<ApiResponse> {
        let path = if ids.iter().all(|id| id.is_empty()) {
            "/_logstash/pipeline".to_string()
        } else {
            format!("/_logstash/pipeline/{}", path_list("id", ids)?)
        };
        self.client
            .send(Request::new(Method::Get, path, QueryString::with_common(common)))
            .await
    }

    pub async fn put_pipeline(&self, id: &str, pipeline: Value, common: &CommonParams) -> Result<ApiResponse> {
        let path = format!("/_logstash/pipeline/{}", path_part("id", id)?);
        if pipeline.is_null() {
            return Err(Error::InvalidArgument(
                "Empty value passed for parameter 'pipeline'".into(),
            ));
        }
        self.client
            .send(Request::new(Method::Put, path, QueryString::with_common(common)).json_body(pipeline))
            .await
    }
}
