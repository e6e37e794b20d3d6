use serde_json::Value;

use super::utils::{path_list, path_part, CommonParams, QueryString};
use super::{ApiResponse, Elasticsearch, Request};
use crate::connection::Method;
use crate::error::Result;

/// Index management.
pub struct Indices<'a> {
    client: &'a Elasticsearch,
}

impl<'a> Indices<'a> {
    pub(crate) fn new(client: &'a Elasticsearch) -> Self {
        Self { client }
    }

    /// Create `index`; `body` carries `mappings` and `settings`.
    pub async fn create(&self, index: &str, body: Option<Value>, common: &CommonParams) -> Result<ApiResponse> {
        let path = format!("/{}", path_part("index", index)?);
        let mut request = Request::new(Method::Put, path, QueryString::with_common(common));
        if let Some(body) = body {
            request = request.json_body(body);
        }
        self.client.send(request).await
    }

    pub async fn exists(&self, indices: &[&str], common: &CommonParams) -> Result<bool> {
        let path = format!("/{}", path_list("index", indices)?);
        let response = self
            .client
            .send(Request::new(Method::Head, path, QueryString::with_common(common)).ignore(&[404]))
            .await?;
        Ok(response.is_success())
    }

    pub async fn delete(
        &self,
        indices: &[&str],
        ignore_unavailable: Option<bool>,
        common: &CommonParams,
    ) -> Result<ApiResponse> {
        let path = format!("/{}", path_list("index", indices)?);
        let mut query = QueryString::with_common(common);
        query.set_opt("ignore_unavailable", ignore_unavailable);
        self.client
            .send(Request::new(Method::Delete, path, query))
            .await
    }

    pub async fn refresh(&self, indices: &[&str], common: &CommonParams) -> Result<ApiResponse> {
        let path = format!("/{}/_refresh", path_list("index", indices)?);
        self.client
            .send(Request::new(Method::Post, path, QueryString::with_common(common)))
            .await
    }
}
