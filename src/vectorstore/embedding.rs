use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::{CommonParams, Elasticsearch};
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Produces embedding vectors for documents and queries.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>>;
}

/// Maximum characters sent per text. nomic-embed-text has an 8 192-token
/// context and dense content can reach ~2.3 tokens/char.
const MAX_EMBED_CHARS: usize = 3_000;

fn truncate_for_embedding(text: &str) -> &str {
    if text.len() <= MAX_EMBED_CHARS {
        return text;
    }
    let mut end = MAX_EMBED_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Client-side embeddings from an Ollama or OpenAI-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct HttpEmbeddings {
    http: reqwest::Client,
    config: EmbeddingConfig,
}

impl HttpEmbeddings {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: EmbeddingConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl EmbeddingService for HttpEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let truncated: Vec<String> = texts
            .iter()
            .map(|t| truncate_for_embedding(t).to_string())
            .collect();

        match self.config.provider.as_str() {
            "ollama" => self.embed_ollama(&truncated).await,
            "openai" => self.embed_openai(&truncated).await,
            other => Err(Error::ImproperlyConfigured(format!(
                "Unknown embedding provider: {other}"
            ))),
        }
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embed_documents(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embedding returned".into()))
    }
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    /// Truncate over-long inputs instead of failing with a 400.
    truncate: bool,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedData>,
}

#[derive(Deserialize)]
struct OpenAiEmbedData {
    embedding: Vec<f32>,
}

impl HttpEmbeddings {
    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        provider: &str,
        url: &str,
        body: &B,
    ) -> Result<R> {
        let mut req = self.http.post(url).json(body);
        if let Some(key) = self.config.api_key.as_deref() {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to call {provider} embed API: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "{provider} embed API returned {status}: {body}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse {provider} embed response: {e}")))
    }

    async fn embed_ollama(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.config.base_url);
        let mut all = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(32) {
            let req = OllamaEmbedRequest {
                model: &self.config.model,
                input: chunk,
                truncate: true,
            };
            let body: OllamaEmbedResponse = self.post("Ollama", &url, &req).await?;
            all.extend(body.embeddings);
        }

        Ok(all)
    }

    async fn embed_openai(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/v1/embeddings", self.config.base_url);
        let mut all = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(64) {
            let req = OpenAiEmbedRequest {
                model: &self.config.model,
                input: chunk,
            };
            let body: OpenAiEmbedResponse = self.post("OpenAI", &url, &req).await?;
            all.extend(body.data.into_iter().map(|d| d.embedding));
        }

        Ok(all)
    }
}

// ─── In-cluster ──────────────────────────────────────────

/// Embeddings computed by a trained model deployed in the cluster.
#[derive(Debug, Clone)]
pub struct EngineEmbeddings {
    client: Elasticsearch,
    model_id: String,
    input_field: String,
}

impl EngineEmbeddings {
    pub fn new(client: Elasticsearch, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            input_field: "text_field".to_string(),
        }
    }

    /// Name of the model's input field, `text_field` by default.
    pub fn with_input_field(mut self, field: impl Into<String>) -> Self {
        self.input_field = field.into();
        self
    }
}

#[async_trait]
impl EmbeddingService for EngineEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let docs = texts
            .iter()
            .map(|t| json!({ self.input_field.as_str(): t }))
            .collect();
        let resp = self
            .client
            .ml()
            .infer_trained_model(&self.model_id, docs, None, &CommonParams::default())
            .await?;

        let results = resp
            .json()
            .get("inference_results")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Embedding("inference response has no inference_results".into()))?;

        results
            .iter()
            .map(|r| {
                r.get("predicted_value")
                    .cloned()
                    .and_then(|v| serde_json::from_value::<Vec<f32>>(v).ok())
                    .ok_or_else(|| Error::Embedding(format!("unexpected inference result: {r}")))
            })
            .collect()
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embed_documents(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embedding returned".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_for_embedding("hello"), "hello");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let text = "é".repeat(MAX_EMBED_CHARS);
        let out = truncate_for_embedding(&text);
        assert!(out.len() <= MAX_EMBED_CHARS);
        assert!(out.chars().all(|c| c == 'é'));
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let embeddings = HttpEmbeddings::new(EmbeddingConfig {
            provider: "nope".into(),
            ..Default::default()
        });
        let err = embeddings.embed_query("x").await.unwrap_err();
        assert!(matches!(err, Error::ImproperlyConfigured(_)));
    }
}
