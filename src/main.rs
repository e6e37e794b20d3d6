use std::sync::Arc;

use anyhow::{bail, Context};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use elastic_client::client::CommonParams;
use elastic_client::config::Config;
use elastic_client::vectorstore::{DenseVector, DenseVectorOptions, HttpEmbeddings, VectorStore};
use elastic_client::Elasticsearch;

const USAGE: &str = "usage: elastic-client <command>

commands:
  info                              cluster information
  search-app <name> [params-json]   run a search application
  vector-search <query>             kNN search over the configured vector store";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let client = Elasticsearch::new(&config.connection).context("Failed to create client")?;
    tracing::info!("Connecting to {}", client.connection().host());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let output = match args.first().map(String::as_str) {
        Some("info") => client.info(&CommonParams::default()).await?.into_json(),
        Some("search-app") => {
            let name = args.get(1).context(USAGE)?;
            let params = args
                .get(2)
                .map(|raw| serde_json::from_str::<Value>(raw))
                .transpose()
                .context("params must be a JSON object")?;
            client
                .search_application()
                .search(name, params, None, &CommonParams::default())
                .await?
                .into_json()
        }
        Some("vector-search") => {
            let query = args.get(1).context(USAGE)?;
            tracing::info!(
                "Embedding provider: {} ({})",
                config.embedding.provider,
                config.embedding.base_url
            );
            let strategy = DenseVector::new(DenseVectorOptions {
                embedding_service: Some(Arc::new(HttpEmbeddings::new(config.embedding.clone()))),
                vector_field: config.vector_store.vector_field.clone(),
                text_field: Some(config.vector_store.text_field.clone()),
                ..Default::default()
            })?;
            let store = VectorStore::from_config(client, &config.vector_store, strategy.into());
            let hits = store.search(Some(query), None, 10, 50, &[]).await?;
            hits.into_iter()
                .map(|h| {
                    serde_json::json!({
                        "id": h.id,
                        "score": h.score,
                        "text": h.text,
                        "metadata": h.metadata,
                    })
                })
                .collect()
        }
        _ => bail!(USAGE),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
