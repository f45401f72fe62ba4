//! Data warehouse port: query text in, ordered rows out.

use async_trait::async_trait;

use crate::domain::errors::AgentResult;
use crate::domain::models::session::Row;

/// Analytical query execution boundary.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Run one SQL statement and return its rows in result order.
    /// Any failure surfaces as `AgentError::Execution` with a message;
    /// the caller decides whether that aborts anything.
    async fn execute(&self, sql: &str) -> AgentResult<Vec<Row>>;
}
