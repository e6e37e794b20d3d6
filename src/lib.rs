//! # elastic-client
//!
//! An async client for the Elasticsearch HTTP API, with a vector store
//! layer for BM25, kNN, hybrid and sparse retrieval.
//!
//! ## Architecture
//!
//! ```text
//!   VectorStore ──► RetrievalStrategy ──► EmbeddingService
//!        │           (query DSL, index      (HTTP or in-cluster)
//!        │            mappings, pipelines)
//!        ▼
//!   Elasticsearch ── namespaces: search_application, logstash, shutdown,
//!        │            xpack, graph, indices, ingest, ml
//!        │  serialize body, deserialize by mimetype
//!        ▼
//!   Connection ── host/cloud id, headers, api key, gzip,
//!        │        request + curl trace logging, status → error
//!        ▼
//!   Transport (reqwest)
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for the connection, embeddings and vector store
//! - [`error`] - Error types and the status → error kind table
//! - [`serializer`] - JSON/text/vector-tile serializers and typed value encoding
//! - [`connection`] - Per-node connection: headers, compression, logging, error mapping
//! - [`client`] - The `Elasticsearch` client and its endpoint namespaces
//! - [`vectorstore`] - Retrieval strategies, embeddings, cosine similarity and MMR

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod serializer;
pub mod vectorstore;

pub use client::{ApiResponse, CommonParams, Elasticsearch};
pub use error::{ApiError, ApiErrorKind, Error, Result};
