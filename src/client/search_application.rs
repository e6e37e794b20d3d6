use serde_json::{json, Value};

use super::utils::{path_part, stability_warning, CommonParams, QueryString, Stability};
use super::{ApiResponse, Elasticsearch, Request};
use crate::connection::Method;
use crate::error::{Error, Result};

/// Optional parameters of [`SearchApplication::list`].
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    /// Starting offset.
    pub from: Option<u32>,
    /// Lucene query string.
    pub q: Option<String>,
    /// Maximum number of results.
    pub size: Option<u32>,
    pub common: CommonParams,
}

/// Search applications and behavioral analytics collections.
pub struct SearchApplication<'a> {
    client: &'a Elasticsearch,
}

impl<'a> SearchApplication<'a> {
    pub(crate) fn new(client: &'a Elasticsearch) -> Self {
        Self { client }
    }

    /// Delete a search application and its alias. Attached indices stay.
    pub async fn delete(&self, name: &str, common: &CommonParams) -> Result<ApiResponse> {
        stability_warning("search_application.delete", Stability::Beta);
        let path = format!("/_application/search_application/{}", path_part("name", name)?);
        self.client
            .send(Request::new(Method::Delete, path, QueryString::with_common(common)))
            .await
    }

    /// Delete an analytics collection and its data stream.
    pub async fn delete_behavioral_analytics(&self, name: &str, common: &CommonParams) -> Result<ApiResponse> {
        stability_warning("search_application.delete_behavioral_analytics", Stability::Experimental);
        let path = format!("/_application/analytics/{}", path_part("name", name)?);
        self.client
            .send(Request::new(Method::Delete, path, QueryString::with_common(common)))
            .await
    }

    pub async fn get(&self, name: &str, common: &CommonParams) -> Result<ApiResponse> {
        stability_warning("search_application.get", Stability::Beta);
        let path = format!("/_application/search_application/{}", path_part("name", name)?);
        self.client
            .send(Request::new(Method::Get, path, QueryString::with_common(common)))
            .await
    }

    /// List analytics collections, optionally limited to `names`.
    pub async fn get_behavioral_analytics(&self, names: &[&str], common: &CommonParams) -> Result<ApiResponse> {
        stability_warning("search_application.get_behavioral_analytics", Stability::Experimental);
        let path = if names.iter().all(|n| n.is_empty()) {
            "/_application/analytics".to_string()
        } else {
            format!("/_application/analytics/{}", super::utils::path_list("name", names)?)
        };
        self.client
            .send(Request::new(Method::Get, path, QueryString::with_common(common)))
            .await
    }

    pub async fn list(&self, params: &ListParams) -> Result<ApiResponse> {
        stability_warning("search_application.list", Stability::Beta);
        let mut query = QueryString::with_common(&params.common);
        query
            .set_opt("from", params.from)
            .set_opt("q", params.q.as_deref())
            .set_opt("size", params.size);
        self.client
            .send(Request::new(Method::Get, "/_application/search_application", query))
            .await
    }

    /// Create or update a search application. With `create`, an existing
    /// application is not replaced.
    pub async fn put(
        &self,
        name: &str,
        search_application: Value,
        create: Option<bool>,
        common: &CommonParams,
    ) -> Result<ApiResponse> {
        stability_warning("search_application.put", Stability::Beta);
        let path = format!("/_application/search_application/{}", path_part("name", name)?);
        if search_application.is_null() {
            return Err(Error::InvalidArgument(
                "Empty value passed for parameter 'search_application'".into(),
            ));
        }
        let mut query = QueryString::with_common(common);
        query.set_opt("create", create);
        self.client
            .send(Request::new(Method::Put, path, query).json_body(search_application))
            .await
    }

    pub async fn put_behavioral_analytics(&self, name: &str, common: &CommonParams) -> Result<ApiResponse> {
        stability_warning("search_application.put_behavioral_analytics", Stability::Experimental);
        let path = format!("/_application/analytics/{}", path_part("name", name)?);
        self.client
            .send(Request::new(Method::Put, path, QueryString::with_common(common)))
            .await
    }

    /// Render the query the application's template produces for `params`.
    pub async fn render_query(&self, name: &str, params: Option<Value>, common: &CommonParams) -> Result<ApiResponse> {
        stability_warning("search_application.render_query", Stability::Experimental);
        let path = format!(
            "/_application/search_application/{}/_render_query",
            path_part("name", name)?
        );
        let mut request = Request::new(Method::Post, path, QueryString::with_common(common));
        if let Some(params) = params {
            request = request.json_body(json!({ "params": params }));
        }
        self.client.send(request).await
    }

    /// Run the application's search template with `params`.
    pub async fn search(
        &self,
        name: &str,
        params: Option<Value>,
        typed_keys: Option<bool>,
        common: &CommonParams,
    ) -> Result<ApiResponse> {
        stability_warning("search_application.search", Stability::Beta);
        let path = format!("/_application/search_application/{}/_search", path_part("name", name)?);
        let mut query = QueryString::with_common(common);
        query.set_opt("typed_keys", typed_keys);
        let mut request = Request::new(Method::Post, path, query);
        if let Some(params) = params {
            request = request.json_body(json!({ "params": params }));
        }
        self.client.send(request).await
    }
}
