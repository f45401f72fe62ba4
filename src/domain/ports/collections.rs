//! Vector store port: named collections of (id, document, vector) triples
//! with cosine nearest-neighbor search.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::AgentResult;
use crate::domain::models::catalog::CollectionEntry;

/// A neighbor returned by `nearest`, closest first.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborHit {
    pub document: String,
    /// Cosine distance, `1 - cos(a, b)`; lower is closer.
    pub distance: f32,
}

/// Name and size of one stored collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub dimension: usize,
    pub entries: u64,
}

/// Durable store of named collections.
///
/// Collections are rebuilt wholesale: delete, create, bulk-insert. A bulk
/// insert is atomic, but the window between create and insert is the
/// rebuild exclusion window; readers should not query a collection that is
/// being rebuilt.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Create an empty collection. An existing collection of the same name
    /// is replaced, entries included.
    async fn create_collection(&self, name: &str, dimension: usize) -> AgentResult<()>;

    /// Remove a collection and its entries. Missing collection is a no-op.
    async fn delete_collection(&self, name: &str) -> AgentResult<()>;

    /// Bulk-insert entries, atomically. Every vector must match the
    /// collection dimension.
    async fn insert_entries(&self, name: &str, entries: &[CollectionEntry]) -> AgentResult<()>;

    /// Up to `limit` nearest neighbors of `vector` by cosine distance,
    /// closest first. A missing or empty collection yields an empty vec.
    async fn nearest(
        &self,
        name: &str,
        vector: &[f32],
        limit: usize,
    ) -> AgentResult<Vec<NeighborHit>>;

    /// Entry count, or `None` if the collection does not exist.
    async fn count(&self, name: &str) -> AgentResult<Option<u64>>;

    /// All collections with their sizes, name-ordered.
    async fn list_collections(&self) -> AgentResult<Vec<CollectionInfo>>;
}
