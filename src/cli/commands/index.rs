//! Index command handler
//!
//! Rebuilds the vector collections from distinct warehouse values. A partial
//! failure still prints the full report, then exits non-zero.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};

use crate::adapters::bigquery::BigQueryWarehouse;
use crate::adapters::openai::OpenAiEmbeddings;
use crate::cli::output::{create_spinner, TableFormatter};
use crate::domain::models::ColumnMapping;
use crate::domain::ports::{CollectionStore, EmbeddingClient, Warehouse};
use crate::services::IndexBuilder;

use super::{load_config, open_store};

/// Rebuild all configured collections, or a single one with `--column`.
pub async fn execute(column: Option<String>, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let columns = select_columns(column.as_deref(), &config.index.columns)?;

    let store = open_store(&config).await?;
    let embeddings: Arc<dyn EmbeddingClient> = Arc::new(OpenAiEmbeddings::new(&config.provider)?);
    let warehouse: Arc<dyn Warehouse> = Arc::new(BigQueryWarehouse::new(&config.warehouse)?);
    let vectors: Arc<dyn CollectionStore> = store;
    let builder = IndexBuilder::new(warehouse, embeddings, vectors, &config);

    let spinner = create_spinner(format!("Rebuilding {} collection(s)...", columns.len()));
    let report = builder.rebuild_all(&columns).await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let formatter = TableFormatter::new();
        println!("{}", formatter.format_build_report(&report));
        println!(
            "{} distinct value(s) embedded, {} entries stored.",
            report.total_values(),
            report.total_stored()
        );
        if report.degraded_batch_count() > 0 {
            eprintln!(
                "{}",
                console::style(format!(
                    "warning: {} batch(es) fell back to zero vectors; rerun `askrio index` to re-embed them",
                    report.degraded_batch_count()
                ))
                .yellow()
            );
        }
    }

    if !report.is_complete() {
        bail!("index rebuild finished with failures");
    }
    Ok(())
}

fn select_columns(requested: Option<&str>, configured: &[ColumnMapping]) -> Result<Vec<ColumnMapping>> {
    let Some(name) = requested else {
        return Ok(configured.to_vec());
    };
    match configured.iter().find(|mapping| mapping.column == name) {
        Some(mapping) => Ok(vec![mapping.clone()]),
        None => {
            let known: Vec<&str> = configured.iter().map(|m| m.column.as_str()).collect();
            bail!(
                "column '{}' is not configured for indexing (configured: {})",
                name,
                known.join(", ")
            );
        }
    }
}
