//! Askrio - natural-language analytics over Rio de Janeiro's 1746 service calls
//!
//! Askrio answers Portuguese questions about the city's 1746 service-call
//! data by routing each question through a staged workflow: classify, generate
//! SQL against the public warehouse, execute, and synthesize a plain-language
//! answer. A local vector index over categorical column values lets the SQL
//! generator resolve colloquial terms ("reclamação de luz") to the exact
//! category strings stored in the warehouse.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, error taxonomy, and the ports
//!   external systems are reached through
//! - **Adapters Layer** (`adapters`): OpenAI-compatible provider clients,
//!   the BigQuery REST warehouse, and the SQLite vector store
//! - **Service Layer** (`services`): the agent workflow, category resolver,
//!   index builder, prompt templates, and retry policy
//! - **Infrastructure Layer** (`infrastructure`): configuration loading
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use askrio::infrastructure::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     // build adapters and ask away
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{AgentError, AgentResult};
pub use domain::models::{
    BuildReport, ColumnMapping, Config, IndexConfig, LoggingConfig, ProviderConfig, RetryConfig,
    Route, SchemaConfig, SessionState, WarehouseConfig, WorkflowStage,
};
pub use domain::ports::{ChatClient, CollectionStore, EmbeddingClient, Warehouse};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Agent, CategoryResolver, IndexBuilder, SchemaSet};
