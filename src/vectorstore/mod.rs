//! Vector store on top of an index.
//!
//! A [`VectorStore`] owns one index and one [`RetrievalStrategy`]. The
//! strategy decides the index layout and the query body; the store does
//! the bulk indexing, searching and result decoding around it.

pub mod embedding;
pub mod strategies;
pub mod utils;

pub use embedding::{EmbeddingService, EngineEmbeddings, HttpEmbeddings};
pub use strategies::{
    Bm25, DenseVector, DenseVectorOptions, DenseVectorScriptScore, DistanceMetric, KnnType,
    RetrievalStrategy, Rrf, Semantic, SparseVector,
};
pub use utils::{cosine_similarity, maximal_marginal_relevance, model_must_be_deployed};

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::client::{CommonParams, Elasticsearch};
use crate::config::VectorStoreConfig;
use crate::error::{Error, Result};

/// One search result.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub id: String,
    /// `None` when the engine returned no score (e.g. sorted searches).
    pub score: Option<f64>,
    pub text: Option<String>,
    pub metadata: Value,
    /// Only populated by max marginal relevance searches.
    pub vector: Option<Vec<f32>>,
}

pub struct VectorStore {
    client: Elasticsearch,
    index: String,
    strategy: RetrievalStrategy,
    text_field: String,
    vector_field: String,
    metadata_mapping: Option<BTreeMap<String, String>>,
}

impl VectorStore {
    pub fn new(client: Elasticsearch, index: impl Into<String>, strategy: RetrievalStrategy) -> Self {
        let config = VectorStoreConfig {
            index: index.into(),
            ..Default::default()
        };
        Self::from_config(client, &config, strategy)
    }

    /// Fields the strategy names win over the configured ones, so stored
    /// documents and queries always agree.
    pub fn from_config(
        client: Elasticsearch,
        config: &VectorStoreConfig,
        strategy: RetrievalStrategy,
    ) -> Self {
        let text_field = field_from_strategy("text", strategy.text_field(), &config.text_field);
        let vector_field =
            field_from_strategy("vector", strategy.vector_field(), &config.vector_field);
        Self {
            client,
            index: config.index.clone(),
            strategy,
            text_field,
            vector_field,
            metadata_mapping: None,
        }
    }

    /// Declare metadata field types (`{field: type}`) for index creation.
    pub fn with_metadata_mapping(mut self, mapping: BTreeMap<String, String>) -> Self {
        self.metadata_mapping = Some(mapping);
        self
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn strategy(&self) -> &RetrievalStrategy {
        &self.strategy
    }

    pub fn client(&self) -> &Elasticsearch {
        &self.client
    }

    pub fn text_field(&self) -> &str {
        &self.text_field
    }

    pub fn vector_field(&self) -> &str {
        &self.vector_field
    }

    /// Create the index unless it exists. Returns whether it was created.
    pub async fn ensure_index(&self) -> Result<bool> {
        if self
            .client
            .indices()
            .exists(&[self.index.as_str()], &CommonParams::default())
            .await?
        {
            tracing::debug!(index = %self.index, "Index already exists");
            return Ok(false);
        }
        self.strategy
            .create_index(&self.client, &self.index, self.metadata_mapping.as_ref())
            .await?;
        tracing::info!(index = %self.index, strategy = self.strategy.kind(), "Created index");
        Ok(true)
    }

    /// Index `texts`, creating the index first if needed. `metadatas`,
    /// `vectors` and `ids` are parallel to `texts` when given; missing ids
    /// are generated. Returns the ids in input order.
    pub async fn add_texts(
        &self,
        texts: &[String],
        metadatas: Option<&[Value]>,
        vectors: Option<&[Vec<f32>]>,
        ids: Option<&[String]>,
        refresh: bool,
    ) -> Result<Vec<String>> {
        check_len("metadatas", metadatas.map(<[Value]>::len), texts.len())?;
        check_len("vectors", vectors.map(<[Vec<f32>]>::len), texts.len())?;
        check_len("ids", ids.map(<[String]>::len), texts.len())?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.ensure_index().await?;

        let mut operations = Vec::with_capacity(texts.len() * 2);
        let mut out_ids = Vec::with_capacity(texts.len());

        for (i, text) in texts.iter().enumerate() {
            let id = ids
                .map(|ids| ids[i].clone())
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            let mut doc = Map::new();
            doc.insert(self.text_field.clone(), json!(text));
            doc.insert(
                "metadata".into(),
                metadatas.map(|m| m[i].clone()).unwrap_or_else(|| json!({})),
            );
            match vectors {
                Some(vectors) => {
                    doc.insert(self.vector_field.clone(), json!(vectors[i]));
                }
                None => doc.extend(self.strategy.embed_for_indexing(text).await?),
            }

            operations.push(json!({ "index": { "_index": self.index, "_id": id } }));
            operations.push(Value::Object(doc));
            out_ids.push(id);
        }

        let resp = self
            .client
            .bulk(
                None,
                &operations,
                refresh.then_some("true"),
                &CommonParams::default(),
            )
            .await?;
        let body = resp.json();

        if body["errors"].as_bool().unwrap_or(false) {
            let failed: Vec<&Value> = body["items"]
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_object()?.values().next())
                        .filter(|result| result.get("error").is_some())
                        .collect()
                })
                .unwrap_or_default();
            let first_error = failed
                .first()
                .map(|r| {
                    r["error"]["reason"]
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| r["error"].to_string())
                })
                .unwrap_or_default();
            tracing::error!(failed = failed.len(), %first_error, "Bulk indexing failed");
            return Err(Error::Bulk {
                failed: failed.len(),
                first_error,
            });
        }

        tracing::debug!(count = out_ids.len(), index = %self.index, "Indexed documents");
        Ok(out_ids)
    }

    /// Top `k` hits for a text query and/or a query vector.
    pub async fn search(
        &self,
        query: Option<&str>,
        query_vector: Option<&[f32]>,
        k: usize,
        num_candidates: usize,
        filter: &[Value],
    ) -> Result<Vec<Hit>> {
        self.run_search(query, query_vector, k, num_candidates, filter, false)
            .await
    }

    /// Fetch `fetch_k` candidates, then pick `k` of them balancing
    /// relevance against diversity (`lambda` 1.0 = relevance only).
    /// Requires client-side embeddings.
    pub async fn max_marginal_relevance_search(
        &self,
        query: &str,
        k: usize,
        fetch_k: usize,
        lambda: f32,
        filter: &[Value],
    ) -> Result<Vec<Hit>> {
        let service = self.strategy.embedding_service().ok_or_else(|| {
            Error::InvalidArgument(
                "maximal marginal relevance search requires a strategy with an embedding service"
                    .into(),
            )
        })?;
        let query_vector = service.embed_query(query).await?;

        let candidates = self
            .run_search(Some(query), Some(&query_vector), fetch_k, fetch_k, filter, true)
            .await?;
        let (candidates, vectors): (Vec<Hit>, Vec<Vec<f32>>) = candidates
            .into_iter()
            .filter_map(|hit| match hit.vector.clone() {
                Some(v) => Some((hit, v)),
                None => {
                    tracing::warn!(id = %hit.id, "Hit has no stored vector, skipping");
                    None
                }
            })
            .unzip();

        let selected = maximal_marginal_relevance(&query_vector, &vectors, lambda, k)?;
        Ok(selected.into_iter().map(|i| candidates[i].clone()).collect())
    }

    /// Delete documents by id. Returns the number deleted.
    pub async fn delete(&self, ids: &[String], refresh: bool) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let resp = self
            .client
            .delete_by_query(
                &self.index,
                json!({ "query": { "ids": { "values": ids } } }),
                Some(refresh),
                &CommonParams::default(),
            )
            .await?;
        Ok(resp.json()["deleted"].as_u64().unwrap_or(0))
    }

    pub async fn delete_index(&self) -> Result<()> {
        self.client
            .indices()
            .delete(&[self.index.as_str()], Some(true), &CommonParams::default())
            .await?;
        Ok(())
    }

    async fn run_search(
        &self,
        query: Option<&str>,
        query_vector: Option<&[f32]>,
        k: usize,
        num_candidates: usize,
        filter: &[Value],
        with_vectors: bool,
    ) -> Result<Vec<Hit>> {
        let mut body = self
            .strategy
            .es_query(query, k, num_candidates, filter, query_vector)
            .await?;

        let mut source = vec![self.text_field.clone(), "metadata".to_string()];
        if with_vectors {
            source.push(self.vector_field.clone());
        }
        if let Some(obj) = body.as_object_mut() {
            obj.entry("size").or_insert_with(|| json!(k));
            obj.insert("_source".into(), json!(source));
        }

        let resp = self
            .client
            .search(&self.index, body, &CommonParams::default())
            .await?;

        let hits = resp.json()["hits"]["hits"]
            .as_array()
            .map(|hits| hits.iter().map(|h| self.decode_hit(h)).collect())
            .unwrap_or_default();
        Ok(hits)
    }

    fn decode_hit(&self, hit: &Value) -> Hit {
        let source = &hit["_source"];
        Hit {
            id: hit["_id"].as_str().unwrap_or_default().to_string(),
            score: hit["_score"].as_f64(),
            text: source[&self.text_field].as_str().map(str::to_string),
            metadata: source.get("metadata").cloned().unwrap_or_else(|| json!({})),
            vector: source
                .get(&self.vector_field)
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
        }
    }
}

fn field_from_strategy(kind: &str, from_strategy: Option<&str>, configured: &str) -> String {
    match from_strategy {
        Some(field) if field != configured => {
            tracing::warn!(
                configured,
                strategy = field,
                "Configured {kind} field differs from the strategy's, using the strategy's"
            );
            field.to_string()
        }
        Some(field) => field.to_string(),
        None => configured.to_string(),
    }
}

fn check_len(name: &str, len: Option<usize>, expected: usize) -> Result<()> {
    match len {
        Some(n) if n != expected => Err(Error::InvalidArgument(format!(
            "{name} has {n} entries but there are {expected} texts"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_strategy() {
        assert_eq!(field_from_strategy("vector", Some("emb"), "vector_field"), "emb");
        assert_eq!(field_from_strategy("vector", Some("emb"), "emb"), "emb");
        assert_eq!(field_from_strategy("text", None, "body"), "body");
    }

    #[test]
    fn test_check_len() {
        assert!(check_len("ids", None, 3).is_ok());
        assert!(check_len("ids", Some(3), 3).is_ok());
        let err = check_len("ids", Some(2), 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: ids has 2 entries but there are 3 texts"
        );
    }
}
