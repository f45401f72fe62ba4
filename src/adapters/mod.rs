//! Infrastructure adapters for external systems.

pub mod bigquery;
pub mod openai;
pub mod sqlite;
