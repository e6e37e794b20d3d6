use serde_json::Value;

use super::utils::{path_part, CommonParams, QueryString};
use super::{ApiResponse, Elasticsearch, Request};
use crate::connection::Method;
use crate::error::Result;

pub struct Ingest<'a> {
    client: &'a Elasticsearch,
}

impl<'a> Ingest<'a> {
    pub(crate) fn new(client: &'a Elasticsearch) -> Self {
        Self { client }
    }

    /// Create or replace an ingest pipeline. `body` holds `processors`
    /// and optionally `description`.
    pub async fn put_pipeline(&self, id: &str, body: Value, common: &CommonParams) -> Result<ApiResponse> {
        let path = format!("/_ingest/pipeline/{}", path_part("id", id)?);
        self.client
            .send(Request::new(Method::Put, path, QueryString::with_common(common)).json_body(body))
            .await
    }
}
