//! Build report produced by a vector index rebuild.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one column's rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnStatus {
    /// Collection was replaced and verified
    Built,
    /// The column had no distinct values; collection untouched
    SkippedEmpty,
    /// Extraction or replacement failed; sibling columns unaffected
    Failed(String),
}

/// Per-column accounting for one rebuild run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnBuildOutcome {
    /// Warehouse column
    pub column: String,

    /// Target collection
    pub collection: String,

    pub status: ColumnStatus,

    /// Distinct values extracted
    pub values: usize,

    /// Batches submitted to the embedding workers
    pub batches: usize,

    /// Batch indices that exhausted retries and fell back to zero-vectors.
    /// Their values are stored but unsearchable by meaning.
    pub degraded_batches: Vec<usize>,

    /// Entries counted in the store after replacement
    pub stored: usize,

    pub elapsed_ms: u64,
}

impl ColumnBuildOutcome {
    pub fn is_built(&self) -> bool {
        matches!(self.status, ColumnStatus::Built)
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded_batches.is_empty()
    }
}

/// Everything one `rebuild_all` run did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub columns: Vec<ColumnBuildOutcome>,
}

impl BuildReport {
    pub fn total_values(&self) -> usize {
        self.columns.iter().map(|c| c.values).sum()
    }

    pub fn total_stored(&self) -> usize {
        self.columns.iter().map(|c| c.stored).sum()
    }

    pub fn degraded_batch_count(&self) -> usize {
        self.columns.iter().map(|c| c.degraded_batches.len()).sum()
    }

    /// True when every configured column was rebuilt (skips count as
    /// complete; failures do not).
    pub fn is_complete(&self) -> bool {
        self.columns
            .iter()
            .all(|c| !matches!(c.status, ColumnStatus::Failed(_)))
    }
}
