//! Retrieval strategies.
//!
//! Each strategy knows two things: the query DSL it sends for a search,
//! and the mappings/settings (and ingest pipelines) its index needs.
//!
//! | strategy                   | ranking                         | vectors computed |
//! |----------------------------|---------------------------------|------------------|
//! | [`Bm25`]                   | BM25 full text                  | never            |
//! | [`DenseVector`]            | approximate kNN, optional RRF   | client or engine |
//! | [`DenseVectorScriptScore`] | exact, `script_score`           | client           |
//! | [`SparseVector`]           | ELSER `text_expansion`          | engine           |
//! | [`Semantic`]               | `semantic` on `semantic_text`   | engine           |

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::embedding::EmbeddingService;
use super::utils::model_must_be_deployed;
use crate::client::{CommonParams, Elasticsearch};
use crate::error::{Error, Result};

/// Dense vector similarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    DotProduct,
    EuclideanDistance,
    MaxInnerProduct,
}

impl DistanceMetric {
    /// The `similarity` value of a `dense_vector` mapping.
    pub fn similarity(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::DotProduct => "dot_product",
            DistanceMetric::EuclideanDistance => "l2_norm",
            DistanceMetric::MaxInnerProduct => "max_inner_product",
        }
    }

    /// Painless score for an exact `script_score` search over `field`.
    fn script_source(&self, field: &str) -> String {
        match self {
            DistanceMetric::Cosine => {
                format!("cosineSimilarity(params.query_vector, '{field}') + 1.0")
            }
            DistanceMetric::EuclideanDistance => {
                format!("1 / (1 + l2norm(params.query_vector, '{field}'))")
            }
            DistanceMetric::DotProduct => format!(
                "double value = dotProduct(params.query_vector, '{field}'); \
                 return sigmoid(1, Math.E, -value);"
            ),
            DistanceMetric::MaxInnerProduct => format!(
                "double value = dotProduct(params.query_vector, '{field}'); \
                 if (value < 0) {{ return 1 / (1 + -1 * value); }} \
                 return value + 1;"
            ),
        }
    }
}

/// kNN index structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnnType {
    #[default]
    Hnsw,
    Int8Hnsw,
    Flat,
    Int8Flat,
}

impl KnnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnnType::Hnsw => "hnsw",
            KnnType::Int8Hnsw => "int8_hnsw",
            KnnType::Flat => "flat",
            KnnType::Int8Flat => "int8_flat",
        }
    }
}

/// Reciprocal rank fusion for hybrid search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rrf {
    /// Plain sum of scores, no `rank` section.
    Disabled,
    /// `"rrf": {}`, server defaults.
    #[default]
    Default,
    Configured {
        rank_constant: Option<u32>,
        window_size: Option<u32>,
    },
}

impl Rrf {
    fn to_json(self) -> Option<Value> {
        match self {
            Rrf::Disabled => None,
            Rrf::Default => Some(json!({})),
            Rrf::Configured {
                rank_constant,
                window_size,
            } => {
                let mut rrf = Map::new();
                if let Some(c) = rank_constant {
                    rrf.insert("rank_constant".into(), c.into());
                }
                if let Some(w) = window_size {
                    rrf.insert("window_size".into(), w.into());
                }
                Some(Value::Object(rrf))
            }
        }
    }
}

fn bm25_match(text_field: &str, query: Option<&str>, filter: &[Value]) -> Result<Value> {
    let query = require_query(query)?;
    Ok(json!({
        "bool": {
            "must": [{ "match": { text_field: { "query": query } } }],
            "filter": filter,
        }
    }))
}

fn require_query(query: Option<&str>) -> Result<&str> {
    query.ok_or_else(|| Error::InvalidArgument("please specify a query string".into()))
}

/// `mappings` with the given properties, plus `metadata` when a flat
/// `{field: type}` map is supplied.
fn mappings_with_metadata(
    mut properties: Map<String, Value>,
    metadata_mapping: Option<&BTreeMap<String, String>>,
) -> Value {
    if let Some(metadata) = metadata_mapping.filter(|m| !m.is_empty()) {
        let fields: Map<String, Value> = metadata
            .iter()
            .map(|(field, ty)| (field.clone(), json!({ "type": ty })))
            .collect();
        properties.insert("metadata".into(), json!({ "properties": fields }));
    }
    json!({ "properties": properties })
}

fn properties(field: &str, mapping: Value) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert(field.to_string(), mapping);
    m
}

async fn create(client: &Elasticsearch, index: &str, body: Value) -> Result<()> {
    client
        .indices()
        .create(index, Some(body), &CommonParams::default())
        .await?;
    Ok(())
}

async fn probe_dimensions(service: &dyn EmbeddingService) -> Result<usize> {
    Ok(service.embed_query("get number of dimensions").await?.len())
}

// ─── BM25 ────────────────────────────────────────────────

/// Full-text BM25 ranking with optional `k1`/`b` tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct Bm25 {
    pub text_field: String,
    pub k1: Option<f32>,
    pub b: Option<f32>,
}

impl Default for Bm25 {
    fn default() -> Self {
        Self {
            text_field: "text_field".into(),
            k1: None,
            b: None,
        }
    }
}

const BM25_SIMILARITY: &str = "custom_bm25";

impl Bm25 {
    fn es_query(&self, query: Option<&str>, filter: &[Value]) -> Result<Value> {
        Ok(json!({ "query": bm25_match(&self.text_field, query, filter)? }))
    }

    fn index_body(&self, metadata_mapping: Option<&BTreeMap<String, String>>) -> Value {
        let mappings = mappings_with_metadata(
            properties(
                &self.text_field,
                json!({ "type": "text", "similarity": BM25_SIMILARITY }),
            ),
            metadata_mapping,
        );

        let mut bm25 = Map::new();
        bm25.insert("type".into(), "BM25".into());
        if let Some(k1) = self.k1 {
            bm25.insert("k1".into(), json!(k1));
        }
        if let Some(b) = self.b {
            bm25.insert("b".into(), json!(b));
        }

        json!({
            "mappings": mappings,
            "settings": { "similarity": { BM25_SIMILARITY: bm25 } },
        })
    }
}

// ─── Dense vector (kNN) ──────────────────────────────────

/// Construction options for [`DenseVector`].
#[derive(Clone)]
pub struct DenseVectorOptions {
    pub knn_type: KnnType,
    pub vector_field: String,
    pub distance: DistanceMetric,
    /// Compute query vectors client-side.
    pub embedding_service: Option<Arc<dyn EmbeddingService>>,
    /// Compute query vectors with a model deployed in the cluster.
    pub model_id: Option<String>,
    pub num_dimensions: Option<usize>,
    /// Combine kNN with a BM25 match on `text_field`.
    pub hybrid: bool,
    pub rrf: Rrf,
    pub text_field: Option<String>,
}

impl Default for DenseVectorOptions {
    fn default() -> Self {
        Self {
            knn_type: KnnType::default(),
            vector_field: "vector_field".into(),
            distance: DistanceMetric::default(),
            embedding_service: None,
            model_id: None,
            num_dimensions: None,
            hybrid: false,
            rrf: Rrf::default(),
            text_field: Some("text_field".into()),
        }
    }
}

/// Approximate kNN, optionally fused with BM25.
#[derive(Clone)]
pub struct DenseVector {
    opts: DenseVectorOptions,
}

impl DenseVector {
    pub fn new(opts: DenseVectorOptions) -> Result<Self> {
        if opts.embedding_service.is_some() && opts.model_id.is_some() {
            return Err(Error::InvalidArgument(
                "either specify embedding_service or model_id, not both".into(),
            ));
        }
        if opts.model_id.is_some() && opts.num_dimensions.is_none() {
            return Err(Error::InvalidArgument(
                "if model_id is specified, num_dimensions must also be specified".into(),
            ));
        }
        if opts.hybrid && opts.text_field.as_deref().map_or(true, str::is_empty) {
            return Err(Error::InvalidArgument(
                "to enable hybrid you have to specify a text_field (for BM25 matching)".into(),
            ));
        }
        Ok(Self { opts })
    }

    pub fn options(&self) -> &DenseVectorOptions {
        &self.opts
    }

    async fn es_query(
        &self,
        query: Option<&str>,
        k: usize,
        num_candidates: usize,
        filter: &[Value],
        query_vector: Option<&[f32]>,
    ) -> Result<Value> {
        let mut knn = Map::new();
        knn.insert("filter".into(), json!(filter));
        knn.insert("field".into(), json!(self.opts.vector_field));
        knn.insert("k".into(), json!(k));
        knn.insert("num_candidates".into(), json!(num_candidates));

        if let Some(vector) = query_vector {
            knn.insert("query_vector".into(), json!(vector));
        } else if let Some(service) = &self.opts.embedding_service {
            let query = query.ok_or_else(|| {
                Error::InvalidArgument("either specify a query string or a query_vector".into())
            })?;
            knn.insert("query_vector".into(), json!(service.embed_query(query).await?));
        } else {
            // model_id is guaranteed by construction when no service is set
            let query = require_query(query)?;
            knn.insert(
                "query_vector_builder".into(),
                json!({
                    "text_embedding": {
                        "model_id": self.opts.model_id,
                        "model_text": query,
                    }
                }),
            );
        }

        if !self.opts.hybrid {
            return Ok(json!({ "knn": knn }));
        }

        let text_field = self.opts.text_field.as_deref().unwrap_or_default();
        let mut body = Map::new();
        body.insert("knn".into(), Value::Object(knn));
        body.insert("query".into(), bm25_match(text_field, query, filter)?);
        if let Some(rrf) = self.opts.rrf.to_json() {
            body.insert("rank".into(), json!({ "rrf": rrf }));
        }
        Ok(Value::Object(body))
    }

    async fn create_index(
        &self,
        client: &Elasticsearch,
        index: &str,
        metadata_mapping: Option<&BTreeMap<String, String>>,
    ) -> Result<()> {
        let dims = match (self.opts.num_dimensions, &self.opts.embedding_service) {
            (Some(d), _) => Some(d),
            (None, Some(service)) => Some(probe_dimensions(service.as_ref()).await?),
            (None, None) => None,
        };

        if let Some(model_id) = &self.opts.model_id {
            model_must_be_deployed(client, model_id).await?;
        }

        let mut vector = Map::new();
        vector.insert("type".into(), "dense_vector".into());
        if let Some(dims) = dims {
            vector.insert("dims".into(), json!(dims));
        }
        vector.insert("index".into(), true.into());
        vector.insert("similarity".into(), self.opts.distance.similarity().into());
        vector.insert(
            "index_options".into(),
            json!({ "type": self.opts.knn_type.as_str() }),
        );

        let mut props = properties(&self.opts.vector_field, Value::Object(vector));
        if self.opts.hybrid {
            if let Some(text_field) = &self.opts.text_field {
                props.insert(text_field.clone(), json!({ "type": "text" }));
            }
        }

        let body = json!({ "mappings": mappings_with_metadata(props, metadata_mapping) });
        create(client, index, body).await
    }
}

impl fmt::Debug for DenseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseVector")
            .field("knn_type", &self.opts.knn_type)
            .field("vector_field", &self.opts.vector_field)
            .field("distance", &self.opts.distance)
            .field("embedding_service", &self.opts.embedding_service.is_some())
            .field("model_id", &self.opts.model_id)
            .field("num_dimensions", &self.opts.num_dimensions)
            .field("hybrid", &self.opts.hybrid)
            .field("rrf", &self.opts.rrf)
            .field("text_field", &self.opts.text_field)
            .finish()
    }
}

// ─── Dense vector (exact, script score) ──────────────────

/// Brute-force scoring of every matching document.
#[derive(Clone)]
pub struct DenseVectorScriptScore {
    pub embedding_service: Option<Arc<dyn EmbeddingService>>,
    pub vector_field: String,
    pub distance: DistanceMetric,
    pub num_dimensions: Option<usize>,
}

impl DenseVectorScriptScore {
    pub fn new(embedding_service: Arc<dyn EmbeddingService>) -> Self {
        Self {
            embedding_service: Some(embedding_service),
            ..Self::without_embeddings()
        }
    }

    /// Callers must pass `query_vector` on every search and set
    /// `num_dimensions` before creating the index.
    pub fn without_embeddings() -> Self {
        Self {
            embedding_service: None,
            vector_field: "vector_field".into(),
            distance: DistanceMetric::default(),
            num_dimensions: None,
        }
    }

    async fn es_query(
        &self,
        query: Option<&str>,
        filter: &[Value],
        query_vector: Option<&[f32]>,
    ) -> Result<Value> {
        let vector = match query_vector {
            Some(v) => v.to_vec(),
            None => {
                let service = self.embedding_service.as_ref().ok_or_else(|| {
                    Error::InvalidArgument(
                        "if no embedding_service is given, you need to provide a query_vector"
                            .into(),
                    )
                })?;
                let query = query.filter(|q| !q.is_empty()).ok_or_else(|| {
                    Error::InvalidArgument(
                        "either specify a query string or a query_vector".into(),
                    )
                })?;
                service.embed_query(query).await?
            }
        };

        let inner = if filter.is_empty() {
            json!({ "match_all": {} })
        } else {
            json!({ "bool": { "filter": filter } })
        };

        Ok(json!({
            "query": {
                "script_score": {
                    "query": inner,
                    "script": {
                        "source": self.distance.script_source(&self.vector_field),
                        "params": { "query_vector": vector },
                    },
                }
            }
        }))
    }

    async fn create_index(
        &self,
        client: &Elasticsearch,
        index: &str,
        metadata_mapping: Option<&BTreeMap<String, String>>,
    ) -> Result<()> {
        let dims = match (self.num_dimensions, &self.embedding_service) {
            (Some(d), _) => d,
            (None, Some(service)) => probe_dimensions(service.as_ref()).await?,
            (None, None) => {
                return Err(Error::InvalidArgument(
                    "num_dimensions is required without an embedding_service".into(),
                ))
            }
        };

        let props = properties(
            &self.vector_field,
            json!({ "type": "dense_vector", "dims": dims, "index": false }),
        );
        let body = json!({ "mappings": mappings_with_metadata(props, metadata_mapping) });
        create(client, index, body).await
    }
}

impl fmt::Debug for DenseVectorScriptScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseVectorScriptScore")
            .field("embedding_service", &self.embedding_service.is_some())
            .field("vector_field", &self.vector_field)
            .field("distance", &self.distance)
            .field("num_dimensions", &self.num_dimensions)
            .finish()
    }
}

// ─── Sparse vector (ELSER) ───────────────────────────────

const TOKENS_FIELD: &str = "tokens";

/// Learned sparse retrieval. Tokens are produced at ingest by an
/// inference pipeline and at query time by `text_expansion`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseVector {
    pub model_id: String,
    pub text_field: String,
    pub vector_field: String,
}

impl Default for SparseVector {
    fn default() -> Self {
        Self {
            model_id: ".elser_model_2".into(),
            text_field: "text_field".into(),
            vector_field: "vector_field".into(),
        }
    }
}

impl SparseVector {
    pub fn pipeline_name(&self) -> String {
        format!("{}_sparse_embedding", self.model_id)
    }

    fn es_query(&self, query: Option<&str>, k: usize, filter: &[Value]) -> Result<Value> {
        let query = require_query(query)?;
        let tokens = format!("{}.{TOKENS_FIELD}", self.vector_field);
        Ok(json!({
            "query": {
                "bool": {
                    "must": [{
                        "text_expansion": {
                            tokens: { "model_id": self.model_id, "model_text": query }
                        }
                    }],
                    "filter": filter,
                }
            },
            "size": k,
        }))
    }

    async fn create_index(
        &self,
        client: &Elasticsearch,
        index: &str,
        metadata_mapping: Option<&BTreeMap<String, String>>,
    ) -> Result<()> {
        let pipeline = self.pipeline_name();

        if !self.model_id.is_empty() {
            model_must_be_deployed(client, &self.model_id).await?;

            let processors = json!({
                "description": "Embedding pipeline for the vector store",
                "processors": [{
                    "inference": {
                        "model_id": self.model_id,
                        "target_field": self.vector_field,
                        "field_map": { self.text_field.as_str(): "text_field" },
                        "inference_config": {
                            "text_expansion": { "results_field": TOKENS_FIELD }
                        },
                    }
                }],
            });
            client
                .ingest()
                .put_pipeline(&pipeline, processors, &CommonParams::default())
                .await?;
        }

        let props = properties(
            &self.vector_field,
            json!({ "properties": { TOKENS_FIELD: { "type": "rank_features" } } }),
        );
        let body = json!({
            "mappings": mappings_with_metadata(props, metadata_mapping),
            "settings": { "default_pipeline": pipeline },
        });
        create(client, index, body).await
    }
}

// ─── Semantic ────────────────────────────────────────────

/// Dense or sparse retrieval through a `semantic_text` field; inference
/// always happens in the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Semantic {
    /// Inference endpoint backing the `semantic_text` field.
    pub model_id: String,
    pub text_field: String,
    pub inference_field: String,
}

impl Semantic {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            text_field: "text_field".into(),
            inference_field: "text_semantic".into(),
        }
    }

    fn es_query(&self, query: Option<&str>, filter: &[Value]) -> Result<Value> {
        let query = require_query(query)?;
        Ok(json!({
            "query": {
                "bool": {
                    "must": [{
                        "semantic": { "field": self.inference_field, "query": query }
                    }],
                    "filter": filter,
                }
            }
        }))
    }

    async fn create_index(
        &self,
        client: &Elasticsearch,
        index: &str,
        metadata_mapping: Option<&BTreeMap<String, String>>,
    ) -> Result<()> {
        let mut props = properties(
            &self.inference_field,
            json!({ "type": "semantic_text", "inference_id": self.model_id }),
        );
        props.insert(
            self.text_field.clone(),
            json!({ "type": "text", "copy_to": self.inference_field }),
        );
        let body = json!({ "mappings": mappings_with_metadata(props, metadata_mapping) });
        create(client, index, body).await
    }
}

// ─── Dispatch ────────────────────────────────────────────

/// How a vector store ranks documents and lays out its index.
#[derive(Debug, Clone)]
pub enum RetrievalStrategy {
    Bm25(Bm25),
    DenseVector(DenseVector),
    DenseVectorScriptScore(DenseVectorScriptScore),
    SparseVector(SparseVector),
    Semantic(Semantic),
}

impl RetrievalStrategy {
    pub fn kind(&self) -> &'static str {
        match self {
            RetrievalStrategy::Bm25(_) => "BM25",
            RetrievalStrategy::DenseVector(_) => "DenseVector",
            RetrievalStrategy::DenseVectorScriptScore(_) => "DenseVectorScriptScore",
            RetrievalStrategy::SparseVector(_) => "SparseVector",
            RetrievalStrategy::Semantic(_) => "Semantic",
        }
    }

    /// Field the strategy matches text against, if it reads one.
    pub fn text_field(&self) -> Option<&str> {
        match self {
            RetrievalStrategy::Bm25(s) => Some(&s.text_field),
            RetrievalStrategy::DenseVector(s) => s.opts.text_field.as_deref(),
            RetrievalStrategy::DenseVectorScriptScore(_) => None,
            RetrievalStrategy::SparseVector(s) => Some(&s.text_field),
            RetrievalStrategy::Semantic(s) => Some(&s.text_field),
        }
    }

    /// Field holding a dense vector per document, if the strategy stores one.
    pub fn vector_field(&self) -> Option<&str> {
        match self {
            RetrievalStrategy::DenseVector(s) => Some(&s.opts.vector_field),
            RetrievalStrategy::DenseVectorScriptScore(s) => Some(&s.vector_field),
            _ => None,
        }
    }

    /// Build the search body. `query` may be omitted when `query_vector`
    /// is given; an empty vector counts as absent.
    pub async fn es_query(
        &self,
        query: Option<&str>,
        k: usize,
        num_candidates: usize,
        filter: &[Value],
        query_vector: Option<&[f32]>,
    ) -> Result<Value> {
        let query_vector = query_vector.filter(|v| !v.is_empty());
        match self {
            RetrievalStrategy::Bm25(s) => s.es_query(query, filter),
            RetrievalStrategy::DenseVector(s) => {
                s.es_query(query, k, num_candidates, filter, query_vector).await
            }
            RetrievalStrategy::DenseVectorScriptScore(s) => {
                s.es_query(query, filter, query_vector).await
            }
            RetrievalStrategy::SparseVector(s) => {
                reject_vector(query_vector, "Inference is currently always applied in the cluster.")?;
                s.es_query(query, k, filter)
            }
            RetrievalStrategy::Semantic(s) => {
                reject_vector(query_vector, "Inference is currently always applied in-stack.")?;
                s.es_query(query, filter)
            }
        }
    }

    /// Create `index` with this strategy's mappings, settings and pipelines.
    pub async fn create_index(
        &self,
        client: &Elasticsearch,
        index: &str,
        metadata_mapping: Option<&BTreeMap<String, String>>,
    ) -> Result<()> {
        tracing::debug!(strategy = self.kind(), index, "Creating index");
        match self {
            RetrievalStrategy::Bm25(s) => create(client, index, s.index_body(metadata_mapping)).await,
            RetrievalStrategy::DenseVector(s) => s.create_index(client, index, metadata_mapping).await,
            RetrievalStrategy::DenseVectorScriptScore(s) => {
                s.create_index(client, index, metadata_mapping).await
            }
            RetrievalStrategy::SparseVector(s) => s.create_index(client, index, metadata_mapping).await,
            RetrievalStrategy::Semantic(s) => s.create_index(client, index, metadata_mapping).await,
        }
    }

    /// Fields to merge into a document before indexing it; empty unless
    /// this strategy embeds on the client.
    pub async fn embed_for_indexing(&self, text: &str) -> Result<Map<String, Value>> {
        let target = match self {
            RetrievalStrategy::DenseVector(s) => s
                .opts
                .embedding_service
                .as_ref()
                .map(|service| (service, &s.opts.vector_field)),
            RetrievalStrategy::DenseVectorScriptScore(s) => s
                .embedding_service
                .as_ref()
                .map(|service| (service, &s.vector_field)),
            _ => None,
        };
        let mut out = Map::new();
        if let Some((service, field)) = target {
            out.insert(field.clone(), json!(service.embed_query(text).await?));
        }
        Ok(out)
    }

    /// Whether query vectors are computed on the client.
    pub fn needs_inference(&self) -> bool {
        self.embedding_service().is_some()
    }

    pub fn embedding_service(&self) -> Option<&Arc<dyn EmbeddingService>> {
        match self {
            RetrievalStrategy::DenseVector(s) => s.opts.embedding_service.as_ref(),
            RetrievalStrategy::DenseVectorScriptScore(s) => s.embedding_service.as_ref(),
            _ => None,
        }
    }
}

fn reject_vector(query_vector: Option<&[f32]>, why: &str) -> Result<()> {
    match query_vector {
        Some(_) => Err(Error::InvalidArgument(format!(
            "Cannot do sparse retrieval with a query_vector. {why}"
        ))),
        None => Ok(()),
    }
}

impl From<Bm25> for RetrievalStrategy {
    fn from(s: Bm25) -> Self {
        RetrievalStrategy::Bm25(s)
    }
}

impl From<DenseVector> for RetrievalStrategy {
    fn from(s: DenseVector) -> Self {
        RetrievalStrategy::DenseVector(s)
    }
}

impl From<DenseVectorScriptScore> for RetrievalStrategy {
    fn from(s: DenseVectorScriptScore) -> Self {
        RetrievalStrategy::DenseVectorScriptScore(s)
    }
}

impl From<SparseVector> for RetrievalStrategy {
    fn from(s: SparseVector) -> Self {
        RetrievalStrategy::SparseVector(s)
    }
}

impl From<Semantic> for RetrievalStrategy {
    fn from(s: Semantic) -> Self {
        RetrievalStrategy::Semantic(s)
    }
}
