//! Vector index construction from warehouse columns.
//!
//! For each configured column the builder pulls the distinct values,
//! embeds them in fixed-size batches over a bounded worker pool, and
//! replaces the target collection in one shot. A batch that exhausts its
//! retries degrades to zero vectors instead of sinking the rebuild; the
//! values stay findable by exact id, just not by meaning, and the report
//! flags them.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::errors::AgentResult;
use crate::domain::models::catalog::CollectionEntry;
use crate::domain::models::config::{ColumnMapping, Config};
use crate::domain::models::report::{BuildReport, ColumnBuildOutcome, ColumnStatus};
use crate::domain::ports::collections::CollectionStore;
use crate::domain::ports::embedding::EmbeddingClient;
use crate::domain::ports::warehouse::Warehouse;
use crate::services::retry::RetryPolicy;

/// Source table holding the categorical columns.
const SOURCE_TABLE: &str = "datario.adm_central_atendimento_1746.chamado";

/// Rebuilds vector collections from warehouse columns.
pub struct IndexBuilder {
    warehouse: Arc<dyn Warehouse>,
    embeddings: Arc<dyn EmbeddingClient>,
    store: Arc<dyn CollectionStore>,
    retry: RetryPolicy,
    batch_size: usize,
    max_workers: usize,
}

struct EmbeddedBatch {
    index: usize,
    texts: Vec<String>,
    vectors: Vec<Vec<f32>>,
    degraded: bool,
}

impl IndexBuilder {
    pub fn new(
        warehouse: Arc<dyn Warehouse>,
        embeddings: Arc<dyn EmbeddingClient>,
        store: Arc<dyn CollectionStore>,
        config: &Config,
    ) -> Self {
        Self {
            warehouse,
            embeddings,
            store,
            retry: RetryPolicy::from_config(&config.retry),
            batch_size: config.index.batch_size.max(1),
            max_workers: config.index.max_workers.max(1),
        }
    }

    /// Rebuild every configured column's collection.
    ///
    /// Columns are processed one after another; failure of one is recorded
    /// in the report and does not abort the rest.
    pub async fn rebuild_all(&self, columns: &[ColumnMapping]) -> BuildReport {
        let started_at = chrono::Utc::now();
        let mut outcomes = Vec::with_capacity(columns.len());

        for mapping in columns {
            outcomes.push(self.rebuild_column(mapping).await);
        }

        let report = BuildReport {
            started_at,
            finished_at: chrono::Utc::now(),
            columns: outcomes,
        };
        info!(
            columns = report.columns.len(),
            values = report.total_values(),
            stored = report.total_stored(),
            degraded_batches = report.degraded_batch_count(),
            complete = report.is_complete(),
            "index rebuild finished"
        );
        report
    }

    async fn rebuild_column(&self, mapping: &ColumnMapping) -> ColumnBuildOutcome {
        let started = Instant::now();
        let column = mapping.column.clone();
        let collection = mapping.collection.clone();

        let values = match self.extract_unique_values(&column).await {
            Ok(values) => values,
            Err(err) => {
                warn!(column = %column, error = %err, "distinct value extraction failed");
                return ColumnBuildOutcome {
                    column,
                    collection,
                    status: ColumnStatus::Failed(err.to_string()),
                    values: 0,
                    batches: 0,
                    degraded_batches: Vec::new(),
                    stored: 0,
                    elapsed_ms: elapsed_ms(started),
                };
            }
        };

        if values.is_empty() {
            warn!(column = %column, "column has no distinct values, skipping");
            return ColumnBuildOutcome {
                column,
                collection,
                status: ColumnStatus::SkippedEmpty,
                values: 0,
                batches: 0,
                degraded_batches: Vec::new(),
                stored: 0,
                elapsed_ms: elapsed_ms(started),
            };
        }

        let batches: Vec<(usize, Vec<String>)> = values
            .chunks(self.batch_size)
            .enumerate()
            .map(|(index, chunk)| (index, chunk.to_vec()))
            .collect();
        let batch_count = batches.len();

        info!(
            column = %column,
            collection = %collection,
            values = values.len(),
            batches = batch_count,
            batch_size = self.batch_size,
            workers = self.max_workers,
            "embedding distinct values"
        );

        // Workers run concurrently; assembly below restores batch order so
        // entry ids stay stable across rebuilds.
        let mut embedded: Vec<EmbeddedBatch> = stream::iter(batches)
            .map(|(index, texts)| self.embed_batch(index, texts))
            .buffer_unordered(self.max_workers)
            .collect()
            .await;
        embedded.sort_by_key(|batch| batch.index);

        let mut entries = Vec::with_capacity(values.len());
        let mut degraded_batches = Vec::new();
        for batch in &embedded {
            if batch.degraded {
                degraded_batches.push(batch.index);
            }
            for (text, vector) in batch.texts.iter().zip(batch.vectors.iter()) {
                entries.push(CollectionEntry::at_position(
                    &collection,
                    entries.len(),
                    text.clone(),
                    vector.clone(),
                ));
            }
        }

        match self.replace_collection(&collection, &entries).await {
            Ok(stored) => {
                let elapsed = started.elapsed();
                let per_second = values.len() as f64 / elapsed.as_secs_f64().max(1e-9);
                info!(
                    collection = %collection,
                    stored,
                    degraded_batches = degraded_batches.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    per_second = per_second as u64,
                    "collection replaced"
                );
                ColumnBuildOutcome {
                    column,
                    collection,
                    status: ColumnStatus::Built,
                    values: values.len(),
                    batches: batch_count,
                    degraded_batches,
                    stored,
                    elapsed_ms: elapsed_ms(started),
                }
            }
            Err(err) => {
                warn!(collection = %collection, error = %err, "collection replacement failed");
                ColumnBuildOutcome {
                    column,
                    collection,
                    status: ColumnStatus::Failed(err.to_string()),
                    values: values.len(),
                    batches: batch_count,
                    degraded_batches,
                    stored: 0,
                    elapsed_ms: elapsed_ms(started),
                }
            }
        }
    }

    /// Distinct non-empty values of `column`, ordered and deduplicated so
    /// rebuilds are reproducible.
    async fn extract_unique_values(&self, column: &str) -> AgentResult<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {column} FROM `{SOURCE_TABLE}` \
             WHERE {column} IS NOT NULL AND {column} != '' ORDER BY {column}"
        );
        let rows = self.warehouse.execute(&sql).await?;

        let mut values: Vec<String> = rows
            .iter()
            .filter_map(|row| row.values().next())
            .filter_map(cell_text)
            .filter(|text| !text.is_empty())
            .collect();
        values.sort();
        values.dedup();
        Ok(values)
    }

    async fn embed_batch(&self, index: usize, texts: Vec<String>) -> EmbeddedBatch {
        let started = Instant::now();

        match self.retry.execute(|| self.embeddings.embed(&texts)).await {
            Ok(vectors) => {
                let elapsed = started.elapsed();
                let per_second = texts.len() as f64 / elapsed.as_secs_f64().max(1e-9);
                debug!(
                    batch = index,
                    values = texts.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    per_second = per_second as u64,
                    "batch embedded"
                );
                EmbeddedBatch {
                    index,
                    texts,
                    vectors,
                    degraded: false,
                }
            }
            Err(err) => {
                warn!(
                    batch = index,
                    values = texts.len(),
                    error = %err,
                    "batch exhausted retries, degrading to zero vectors"
                );
                let vectors = vec![vec![0.0; self.embeddings.dimension()]; texts.len()];
                EmbeddedBatch {
                    index,
                    texts,
                    vectors,
                    degraded: true,
                }
            }
        }
    }

    /// Recreate, fill, then count. Creating a collection replaces any prior
    /// one atomically and the bulk insert is atomic too; the gap between
    /// the two is the rebuild exclusion window readers stay out of.
    async fn replace_collection(
        &self,
        collection: &str,
        entries: &[CollectionEntry],
    ) -> AgentResult<usize> {
        self.store
            .create_collection(collection, self.embeddings.dimension())
            .await?;
        self.store.insert_entries(collection, entries).await?;
        let stored = self.store.count(collection).await?.unwrap_or(0);
        Ok(stored as usize)
    }
}

fn cell_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text.trim().to_string()),
        other => Some(other.to_string()),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_normalizes_values() {
        assert_eq!(cell_text(&serde_json::json!("  Poda  ")), Some("Poda".to_string()));
        assert_eq!(cell_text(&serde_json::json!(42)), Some("42".to_string()));
        assert_eq!(cell_text(&serde_json::Value::Null), None);
    }
}
