//! SQLite-backed collection store.
//!
//! Collections are rows in a `collections` table; their entries live in an
//! `entries` table with embeddings serialized as little-endian f32 BLOBs.
//! Nearest-neighbor search is a full scan with cosine distance computed in
//! Rust, which is plenty for the catalog sizes involved (a few thousand
//! category values per collection).

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row as SqlxRow, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::errors::{AgentError, AgentResult};
use crate::domain::models::catalog::CollectionEntry;
use crate::domain::ports::collections::{CollectionInfo, CollectionStore, NeighborHit};

/// `CollectionStore` persisted in a single SQLite database file.
pub struct SqliteCollectionStore {
    pool: SqlitePool,
}

impl SqliteCollectionStore {
    /// Open (or create) the store at `db_path`, creating parent directories
    /// as needed.
    pub async fn open(db_path: &str) -> AgentResult<Self> {
        ensure_parent_directory(db_path)?;

        let connect_options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(connect_options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// In-memory store for tests.
    pub async fn open_in_memory() -> AgentResult<Self> {
        let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AgentError::Store(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> AgentResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                name TEXT PRIMARY KEY,
                metric TEXT NOT NULL,
                dimension INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                collection TEXT NOT NULL REFERENCES collections(name) ON DELETE CASCADE,
                id TEXT NOT NULL,
                document TEXT NOT NULL,
                embedding BLOB NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn dimension_of(&self, name: &str) -> AgentResult<Option<usize>> {
        let dimension: Option<i64> =
            sqlx::query_scalar("SELECT dimension FROM collections WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(dimension.map(|d| d as usize))
    }
}

#[async_trait]
impl CollectionStore for SqliteCollectionStore {
    async fn create_collection(&self, name: &str, dimension: usize) -> AgentResult<()> {
        let mut tx = self.pool.begin().await?;

        // Creating an existing name replaces it; the cascade clears entries.
        sqlx::query("DELETE FROM collections WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO collections (name, metric, dimension, created_at) VALUES (?, 'cosine', ?, ?)",
        )
        .bind(name)
        .bind(dimension as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> AgentResult<()> {
        sqlx::query("DELETE FROM collections WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_entries(&self, name: &str, entries: &[CollectionEntry]) -> AgentResult<()> {
        let Some(expected) = self.dimension_of(name).await? else {
            return Err(AgentError::Store(format!("collection '{name}' does not exist")));
        };

        for entry in entries {
            if entry.vector.len() != expected {
                return Err(AgentError::DimensionMismatch {
                    collection: name.to_string(),
                    expected,
                    actual: entry.vector.len(),
                });
            }
        }

        let mut tx = self.pool.begin().await?;
        for entry in entries {
            sqlx::query(
                "INSERT INTO entries (collection, id, document, embedding) VALUES (?, ?, ?, ?)",
            )
            .bind(name)
            .bind(&entry.id)
            .bind(&entry.document)
            .bind(embedding_to_bytes(&entry.vector))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn nearest(
        &self,
        name: &str,
        vector: &[f32],
        limit: usize,
    ) -> AgentResult<Vec<NeighborHit>> {
        let rows = sqlx::query("SELECT document, embedding FROM entries WHERE collection = ?")
            .bind(name)
            .fetch_all(&self.pool)
            .await?;

        let mut hits = Vec::with_capacity(rows.len());
        for row in rows {
            let document: String = row.get("document");
            let embedding_bytes: Vec<u8> = row.get("embedding");
            let embedding = bytes_to_embedding(&embedding_bytes)?;
            hits.push(NeighborHit {
                document,
                distance: cosine_distance(vector, &embedding),
            });
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn count(&self, name: &str) -> AgentResult<Option<u64>> {
        if self.dimension_of(name).await?.is_none() {
            return Ok(None);
        }
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries WHERE collection = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(Some(count as u64))
    }

    async fn list_collections(&self) -> AgentResult<Vec<CollectionInfo>> {
        let rows = sqlx::query(
            r#"
            SELECT c.name, c.dimension, COUNT(e.id) AS entries
            FROM collections c
            LEFT JOIN entries e ON e.collection = c.name
            GROUP BY c.name
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut collections = Vec::with_capacity(rows.len());
        for row in rows {
            let dimension: i64 = row.get("dimension");
            let entries: i64 = row.get("entries");
            collections.push(CollectionInfo {
                name: row.get("name"),
                dimension: dimension as usize,
                entries: entries as u64,
            });
        }
        Ok(collections)
    }
}

fn ensure_parent_directory(db_path: &str) -> AgentResult<()> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AgentError::Store(format!("creating {}: {e}", parent.display())))?;
        }
    }
    Ok(())
}

/// Serialize an embedding to little-endian f32 bytes.
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Deserialize an embedding from little-endian f32 bytes.
pub fn bytes_to_embedding(bytes: &[u8]) -> AgentResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AgentError::Store(format!(
            "embedding blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Cosine distance between two vectors (1 - cosine similarity).
///
/// Returns `f32::MAX` for mismatched dimensions or zero-magnitude input so
/// such entries sort last instead of poisoning the result order.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::MAX;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return f32::MAX;
    }

    1.0 - (dot / (mag_a * mag_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, document: &str, vector: Vec<f32>) -> CollectionEntry {
        CollectionEntry {
            id: id.to_string(),
            document: document.to_string(),
            vector,
        }
    }

    #[test]
    fn embedding_roundtrip() {
        let embedding = vec![0.1, -0.2, 0.3, 0.4];
        let restored = bytes_to_embedding(&embedding_to_bytes(&embedding)).unwrap();
        assert_eq!(embedding.len(), restored.len());
        for (a, b) in embedding.iter().zip(restored.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn truncated_blob_is_rejected() {
        assert!(bytes_to_embedding(&[0u8; 7]).is_err());
    }

    #[test]
    fn cosine_distance_identical_and_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        assert!(cosine_distance(&a, &a).abs() < 1e-6);

        let b = vec![0.0, 1.0, 0.0];
        assert!((cosine_distance(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_distance_degenerate_inputs_sort_last() {
        assert_eq!(cosine_distance(&[1.0, 0.0], &[1.0]), f32::MAX);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), f32::MAX);
    }

    #[tokio::test]
    async fn nearest_orders_by_distance_and_truncates() {
        let store = SqliteCollectionStore::open_in_memory().await.unwrap();
        store.create_collection("tipos", 2).await.unwrap();
        store
            .insert_entries(
                "tipos",
                &[
                    entry("tipos_0", "Iluminação Pública", vec![1.0, 0.0]),
                    entry("tipos_1", "Limpeza", vec![0.0, 1.0]),
                    entry("tipos_2", "Iluminação de Praça", vec![0.9, 0.1]),
                ],
            )
            .await
            .unwrap();

        let hits = store.nearest("tipos", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document, "Iluminação Pública");
        assert_eq!(hits[1].document, "Iluminação de Praça");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[tokio::test]
    async fn nearest_on_missing_collection_is_empty() {
        let store = SqliteCollectionStore::open_in_memory().await.unwrap();
        let hits = store.nearest("nope", &[1.0, 0.0], 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn create_replaces_prior_collection() {
        let store = SqliteCollectionStore::open_in_memory().await.unwrap();
        store.create_collection("tipos", 2).await.unwrap();
        store
            .insert_entries("tipos", &[entry("tipos_0", "Limpeza", vec![0.0, 1.0])])
            .await
            .unwrap();
        assert_eq!(store.count("tipos").await.unwrap(), Some(1));

        store.create_collection("tipos", 3).await.unwrap();
        assert_eq!(store.count("tipos").await.unwrap(), Some(0));

        let collections = store.list_collections().await.unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].dimension, 3);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = SqliteCollectionStore::open_in_memory().await.unwrap();
        store.create_collection("tipos", 2).await.unwrap();
        store.delete_collection("tipos").await.unwrap();
        store.delete_collection("tipos").await.unwrap();
        assert_eq!(store.count("tipos").await.unwrap(), None);
    }

    #[tokio::test]
    async fn insert_enforces_dimension() {
        let store = SqliteCollectionStore::open_in_memory().await.unwrap();
        store.create_collection("tipos", 3).await.unwrap();

        let err = store
            .insert_entries("tipos", &[entry("tipos_0", "Limpeza", vec![1.0, 0.0])])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::DimensionMismatch { expected: 3, actual: 2, .. }
        ));
        // The whole batch is rejected, nothing partial lands.
        assert_eq!(store.count("tipos").await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn insert_into_missing_collection_fails() {
        let store = SqliteCollectionStore::open_in_memory().await.unwrap();
        let err = store
            .insert_entries("nope", &[entry("nope_0", "x", vec![1.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Store(_)));
    }

    #[tokio::test]
    async fn list_collections_reports_entry_counts() {
        let store = SqliteCollectionStore::open_in_memory().await.unwrap();
        store.create_collection("subtipos", 2).await.unwrap();
        store.create_collection("tipos", 2).await.unwrap();
        store
            .insert_entries(
                "tipos",
                &[
                    entry("tipos_0", "Iluminação Pública", vec![1.0, 0.0]),
                    entry("tipos_1", "Limpeza", vec![0.0, 1.0]),
                ],
            )
            .await
            .unwrap();

        let collections = store.list_collections().await.unwrap();
        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].name, "subtipos");
        assert_eq!(collections[0].entries, 0);
        assert_eq!(collections[1].name, "tipos");
        assert_eq!(collections[1].entries, 2);
    }
}
