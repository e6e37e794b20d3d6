use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::connection::ApiKey;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Cluster connection settings
    pub connection: ConnectionConfig,
    /// Client-side embedding provider
    pub embedding: EmbeddingConfig,
    /// Vector store index and field names
    pub vector_store: VectorStoreConfig,
}

/// How to reach a cluster node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Hostname of the node (ignored when `cloud_id` is set)
    pub host: String,
    /// Port; defaults to 9200, or to the cloud id's port
    pub port: Option<u16>,
    /// "http" or "https"
    pub scheme: String,
    /// Force https
    pub use_ssl: bool,
    /// Path prefix when the cluster sits behind a proxy
    pub url_prefix: String,
    /// Default request timeout in seconds
    pub timeout_secs: f64,
    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// Gzip request bodies and advertise gzip/deflate; cloud defaults to on
    pub http_compress: Option<bool>,
    /// Elastic Cloud deployment identifier
    pub cloud_id: Option<String>,
    /// API key credentials
    pub api_key: Option<ApiKey>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            scheme: "http".to_string(),
            use_ssl: false,
            url_prefix: String::new(),
            timeout_secs: 10.0,
            headers: BTreeMap::new(),
            http_compress: None,
            cloud_id: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the embedding API
    pub base_url: String,
    /// Model name for embeddings
    pub model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    pub index: String,
    pub text_field: String,
    pub vector_field: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            index: "vector-store".to_string(),
            text_field: "text_field".to_string(),
            vector_field: "vector_field".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        let conn = &mut config.connection;

        if let Ok(host) = std::env::var("ELASTICSEARCH_HOST") {
            conn.host = host;
        }
        if let Ok(val) = std::env::var("ELASTICSEARCH_PORT") {
            if let Ok(v) = val.parse() {
                conn.port = Some(v);
            }
        }
        if let Ok(scheme) = std::env::var("ELASTICSEARCH_SCHEME") {
            conn.scheme = scheme;
        }
        if let Ok(prefix) = std::env::var("ELASTICSEARCH_URL_PREFIX") {
            conn.url_prefix = prefix;
        }
        if let Ok(val) = std::env::var("ELASTICSEARCH_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<f64>() {
                if v > 0.0 {
                    conn.timeout_secs = v;
                }
            }
        }
        if let Ok(val) = std::env::var("ELASTICSEARCH_HTTP_COMPRESS") {
            if let Some(v) = parse_bool(&val) {
                conn.http_compress = Some(v);
            }
        }
        if let Ok(id) = std::env::var("ELASTIC_CLOUD_ID") {
            conn.cloud_id = Some(id);
        }

        // Either a pre-encoded key, or an id + key pair
        if let Ok(key) = std::env::var("ELASTIC_API_KEY") {
            conn.api_key = match std::env::var("ELASTIC_API_KEY_ID") {
                Ok(id) => Some(ApiKey::id_key(id, key)),
                Err(_) => Some(ApiKey::Encoded(key)),
            };
        }

        // Embedding config
        if let Ok(provider) = std::env::var("EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Ok(url) = std::env::var("EMBEDDING_BASE_URL") {
            config.embedding.base_url = url;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Ok(key) = std::env::var("EMBEDDING_API_KEY") {
            config.embedding.api_key = Some(key);
        }

        // Vector store config
        if let Ok(index) = std::env::var("VECTOR_STORE_INDEX") {
            config.vector_store.index = index;
        }
        if let Ok(field) = std::env::var("VECTOR_STORE_TEXT_FIELD") {
            config.vector_store.text_field = field;
        }
        if let Ok(field) = std::env::var("VECTOR_STORE_VECTOR_FIELD") {
            config.vector_store.vector_field = field;
        }

        config
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.connection.host, "localhost");
        assert_eq!(config.connection.port, None);
        assert_eq!(config.connection.timeout_secs, 10.0);
        assert_eq!(config.vector_store.text_field, "text_field");
        assert_eq!(config.embedding.provider, "ollama");
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let mut config = Config::default();
        config.connection.api_key = Some(ApiKey::id_key("id", "key"));
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.connection.api_key, config.connection.api_key);
    }
}
