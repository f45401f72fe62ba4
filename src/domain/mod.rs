//! Domain layer: models, errors, and the ports adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{AgentError, AgentResult};
