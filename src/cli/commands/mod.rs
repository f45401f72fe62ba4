//! CLI command implementations.
//!
//! Each command loads configuration, builds the adapters it needs, and
//! delegates to the service layer. Shared construction lives here so all
//! four commands wire the same stack the same way.

pub mod ask;
pub mod chat;
pub mod index;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::bigquery::BigQueryWarehouse;
use crate::adapters::openai::{OpenAiChat, OpenAiEmbeddings};
use crate::adapters::sqlite::SqliteCollectionStore;
use crate::domain::models::Config;
use crate::domain::ports::{ChatClient, CollectionStore, EmbeddingClient, Warehouse};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{Agent, CategoryResolver, SchemaSet};

/// Load configuration, honoring an explicit `--config` path.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Open the vector index database named in the configuration.
pub(crate) async fn open_store(config: &Config) -> Result<Arc<SqliteCollectionStore>> {
    let store = SqliteCollectionStore::open(&config.index.db_path)
        .await
        .with_context(|| format!("Failed to open vector index at {}", config.index.db_path))?;
    Ok(Arc::new(store))
}

/// Build the full question-answering stack: provider clients, warehouse,
/// category resolver, and schema documentation.
pub(crate) async fn build_agent(config: &Config) -> Result<(Agent, Arc<SqliteCollectionStore>)> {
    let store = open_store(config).await?;

    let chat: Arc<dyn ChatClient> = Arc::new(OpenAiChat::new(&config.provider)?);
    let embeddings: Arc<dyn EmbeddingClient> = Arc::new(OpenAiEmbeddings::new(&config.provider)?);
    let warehouse: Arc<dyn Warehouse> = Arc::new(BigQueryWarehouse::new(&config.warehouse)?);

    let vectors: Arc<dyn CollectionStore> = store.clone();
    let resolver = CategoryResolver::new(embeddings, vectors, &config.index);
    let schemas = SchemaSet::load(&config.schemas);

    let agent = Agent::new(chat, warehouse, resolver, config.index.clone(), schemas);
    Ok((agent, store))
}

/// Warn about missing or empty collections without failing startup.
///
/// Similarity lookups degrade to LIKE-pattern guidance until the index is
/// built, so this is advice, not a gate.
pub(crate) async fn report_missing_collections(config: &Config, store: &dyn CollectionStore) {
    for mapping in &config.index.columns {
        match store.count(&mapping.collection).await {
            Ok(Some(entries)) if entries > 0 => {}
            Ok(_) => eprintln!(
                "{}",
                console::style(format!(
                    "aviso: coleção '{}' vazia ou ausente; execute `askrio index`",
                    mapping.collection
                ))
                .yellow()
            ),
            Err(err) => {
                tracing::warn!(collection = %mapping.collection, error = %err, "collection check failed");
            }
        }
    }
}
