//! Embedding provider port.
//!
//! Converts batches of text into dense vectors for similarity search.
//! Implementations do not retry and do not chunk: batch sizing and retry
//! policy belong to the callers (index builder, resolver).

use async_trait::async_trait;

use crate::domain::errors::AgentResult;

/// Remote embedding provider boundary.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Model identifier sent to the provider.
    fn model(&self) -> &str;

    /// Vector dimension for this model. Every vector returned by `embed`
    /// has exactly this length.
    fn dimension(&self) -> usize;

    /// Embed a non-empty batch of texts.
    ///
    /// Returns one vector per input, same order and length as `texts`.
    /// Transport failures, non-2xx statuses, and malformed or
    /// length-mismatched responses surface as `AgentError::Provider`.
    async fn embed(&self, texts: &[String]) -> AgentResult<Vec<Vec<f32>>>;
}
