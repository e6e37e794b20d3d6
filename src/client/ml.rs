use serde_json::{json, Value};

use super::utils::{path_part, CommonParams, QueryString};
use super::{ApiResponse, Elasticsearch, Request};
use crate::connection::Method;
use crate::error::Result;

/// Machine learning: trained model inference.
pub struct Ml<'a> {
    client: &'a Elasticsearch,
}

impl<'a> Ml<'a> {
    pub(crate) fn new(client: &'a Elasticsearch) -> Self {
        Self { client }
    }

    /// Run a deployed model over `docs`; each doc maps the model's input
    /// field to its text.
    pub async fn infer_trained_model(
        &self,
        model_id: &str,
        docs: Vec<Value>,
        timeout: Option<&str>,
        common: &CommonParams,
    ) -> Result<ApiResponse> {
        let path = format!("/_ml/trained_models/{}/_infer", path_part("model_id", model_id)?);
        let mut query = QueryString::with_common(common);
        query.set_opt("timeout", timeout);
        self.client
            .send(Request::new(Method::Post, path, query).json_body(json!({ "docs": docs })))
            .await
    }
}
