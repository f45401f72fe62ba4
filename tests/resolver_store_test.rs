mod common;

use std::sync::Arc;

use askrio::adapters::sqlite::SqliteCollectionStore;
use askrio::domain::models::catalog::CollectionEntry;
use askrio::domain::models::Config;
use askrio::domain::ports::{CollectionStore, EmbeddingClient};
use askrio::services::CategoryResolver;

use common::FixedEmbeddings;

/// Entries at controlled angles from the fixed query vector `[1, 0, 0, 0]`.
async fn seeded_store() -> Arc<SqliteCollectionStore> {
    let store = SqliteCollectionStore::open_in_memory()
        .await
        .expect("failed to open in-memory store");
    store.create_collection("tipo_collection", 4).await.unwrap();
    store
        .insert_entries(
            "tipo_collection",
            &[
                CollectionEntry::at_position(
                    "tipo_collection",
                    0,
                    "Exato",
                    vec![1.0, 0.0, 0.0, 0.0],
                ),
                CollectionEntry::at_position(
                    "tipo_collection",
                    1,
                    "Próximo",
                    vec![0.707, 0.707, 0.0, 0.0],
                ),
                CollectionEntry::at_position(
                    "tipo_collection",
                    2,
                    "Ortogonal",
                    vec![0.0, 1.0, 0.0, 0.0],
                ),
                CollectionEntry::at_position(
                    "tipo_collection",
                    3,
                    "Oposto",
                    vec![-1.0, 0.0, 0.0, 0.0],
                ),
            ],
        )
        .await
        .unwrap();
    Arc::new(store)
}

fn resolver(
    embeddings: Arc<FixedEmbeddings>,
    store: Arc<SqliteCollectionStore>,
    threshold: f32,
    top_k: usize,
) -> CategoryResolver {
    let mut index = Config::default().index;
    index.similarity_threshold = threshold;
    index.top_k = top_k;
    let client: Arc<dyn EmbeddingClient> = embeddings;
    let vectors: Arc<dyn CollectionStore> = store;
    CategoryResolver::new(client, vectors, &index)
}

#[tokio::test]
async fn matches_above_threshold_come_back_ordered() {
    let embeddings = Arc::new(FixedEmbeddings::new(vec![1.0, 0.0, 0.0, 0.0]));
    let resolver = resolver(Arc::clone(&embeddings), seeded_store().await, 0.3, 5);

    let matches = resolver.resolve("tipo_collection", "qualquer termo").await;

    let values: Vec<&str> = matches.iter().map(|m| m.value.as_str()).collect();
    assert_eq!(values, ["Exato", "Próximo"]);
    assert!(matches[0].similarity > matches[1].similarity);
    assert!(matches[0].similarity > 0.999);
    assert!((matches[1].similarity - 0.707).abs() < 0.01);
}

#[tokio::test]
async fn top_k_caps_the_result_even_when_more_qualify() {
    let embeddings = Arc::new(FixedEmbeddings::new(vec![1.0, 0.0, 0.0, 0.0]));
    let resolver = resolver(embeddings, seeded_store().await, 0.3, 1);

    let matches = resolver.resolve("tipo_collection", "qualquer termo").await;

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].value, "Exato");
}

#[tokio::test]
async fn missing_collection_yields_no_matches() {
    let embeddings = Arc::new(FixedEmbeddings::new(vec![1.0, 0.0, 0.0, 0.0]));
    let store = Arc::new(SqliteCollectionStore::open_in_memory().await.unwrap());
    let resolver = resolver(embeddings, store, 0.3, 5);

    let matches = resolver.resolve("tipo_collection", "luz").await;

    assert!(matches.is_empty());
}

#[tokio::test]
async fn blank_term_is_rejected_without_an_embedding_call() {
    let embeddings = Arc::new(FixedEmbeddings::new(vec![1.0, 0.0, 0.0, 0.0]));
    let resolver = resolver(Arc::clone(&embeddings), seeded_store().await, 0.3, 5);

    let matches = resolver.resolve("tipo_collection", "   ").await;

    assert!(matches.is_empty());
    assert_eq!(embeddings.call_count(), 0);
}
