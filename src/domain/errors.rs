//! Domain errors for the askrio agent.

use thiserror::Error;

/// Domain-level errors that can occur anywhere in the pipeline.
///
/// Resolution misses are deliberately *not* represented here: an empty
/// match list is a normal outcome handled by fallback, never an error.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Provider error: {message}")]
    Provider { message: String, transient: bool },

    #[error("Invalid generated query: {0}")]
    GenerationInvalid(String),

    #[error("Query execution failed: {0}")]
    Execution(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Collection {collection} expects dimension {expected}, got {actual}")]
    DimensionMismatch { collection: String, expected: usize, actual: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

impl AgentError {
    /// Provider failure worth retrying: timeouts, connection drops,
    /// rate limiting, server-side errors.
    pub fn provider_transient(message: impl Into<String>) -> Self {
        Self::Provider { message: message.into(), transient: true }
    }

    /// Provider failure that will not improve on retry: auth failures,
    /// invalid requests, malformed response bodies.
    pub fn provider_permanent(message: impl Into<String>) -> Self {
        Self::Provider { message: message.into(), transient: false }
    }

    /// Classify an HTTP status from a provider. 429 and 5xx are transient.
    pub fn provider_from_status(status: u16, body: &str) -> Self {
        let transient = status == 429 || status >= 500;
        Self::Provider {
            message: format!("HTTP {status}: {body}"),
            transient,
        }
    }

    /// Whether a retry policy should attempt this error again.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Provider { transient: true, .. })
    }
}

impl From<sqlx::Error> for AgentError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        // Transport-level failures (timeouts, refused connections) are
        // transient; anything already carrying a status was classified
        // at the call site.
        let transient = err.is_timeout() || err.is_connect() || err.is_request();
        Self::Provider { message: err.to_string(), transient }
    }
}
