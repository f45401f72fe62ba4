//! Port trait definitions (hexagonal architecture).
//!
//! Async trait interfaces the adapters implement:
//! - `EmbeddingClient`: remote embedding provider
//! - `ChatClient`: LLM chat/completion provider
//! - `Warehouse`: analytical query execution
//! - `CollectionStore`: durable vector collections
//!
//! Services depend only on these traits, injected as `Arc<dyn …>`, so every
//! external system can be swapped for a fake in tests.

pub mod chat;
pub mod collections;
pub mod embedding;
pub mod warehouse;

pub use chat::{ChatClient, ChatOutcome, ToolDescriptor, ToolInvocation};
pub use collections::{CollectionInfo, CollectionStore, NeighborHit};
pub use embedding::EmbeddingClient;
pub use warehouse::Warehouse;
