//! SQLite persistence for the vector index.

pub mod collection_store;

pub use collection_store::{
    bytes_to_embedding, cosine_distance, embedding_to_bytes, SqliteCollectionStore,
};
