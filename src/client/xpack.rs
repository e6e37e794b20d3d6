use super::utils::{CommonParams, QueryString};
use super::{ApiResponse, Elasticsearch, Request};
use crate::connection::Method;
use crate::error::Result;

/// Build, license and feature information.
pub struct XPack<'a> {
    client: &'a Elasticsearch,
}

impl<'a> XPack<'a> {
    pub(crate) fn new(client: &'a Elasticsearch) -> Self {
        Self { client }
    }

    /// `categories` limits the response to `build`, `license` and/or `features`.
    pub async fn info(
        &self,
        categories: &[&str],
        accept_enterprise: Option<bool>,
        common: &CommonParams,
    ) -> Result<ApiResponse> {
        let mut query = QueryString::with_common(common);
        query.set_opt("accept_enterprise", accept_enterprise);
        if !categories.is_empty() {
            query.set("categories", categories.join(","));
        }
        self.client
            .send(Request::new(Method::Get, "/_xpack", query))
            .await
    }

    pub async fn usage(&self, master_timeout: Option<&str>, common: &CommonParams) -> Result<ApiResponse> {
        let mut query = QueryString::with_common(common);
        query.set_opt("master_timeout", master_timeout);
        self.client
            .send(Request::new(Method::Get, "/_xpack/usage", query))
            .await
    }
}
