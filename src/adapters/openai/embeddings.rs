//! OpenAI embedding adapter.
//!
//! Thin wrapper over the `/embeddings` endpoint of any OpenAI-compatible
//! API. No retry and no chunking here: the index builder owns batch sizing
//! and the retry policy, the resolver deliberately treats failures as
//! misses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::errors::{AgentError, AgentResult};
use crate::domain::models::config::ProviderConfig;
use crate::domain::ports::embedding::EmbeddingClient;

/// Env var consulted when the config carries no API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Resolve the provider API key from config or environment.
pub fn resolve_api_key(config: &ProviderConfig) -> AgentResult<String> {
    config
        .api_key
        .clone()
        .or_else(|| std::env::var(OPENAI_API_KEY_ENV).ok())
        .ok_or_else(|| {
            AgentError::Configuration(format!(
                "provider API key not set; set {OPENAI_API_KEY_ENV} or provider.api_key"
            ))
        })
}

/// `EmbeddingClient` backed by the OpenAI embeddings API.
pub struct OpenAiEmbeddings {
    base_url: String,
    model: String,
    dimension: usize,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiEmbeddings {
    /// Build the adapter, resolving credentials up front so a missing key
    /// fails at startup, not mid-rebuild.
    pub fn new(config: &ProviderConfig) -> AgentResult<Self> {
        let api_key = resolve_api_key(config)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.base_url.clone(),
            model: config.embedding_model.clone(),
            dimension: config.embedding_dimension,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddings {
    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> AgentResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(AgentError::provider_permanent("embed called with no texts"));
        }

        let url = format!("{}/embeddings", self.base_url);
        let body = EmbeddingsRequest {
            model: &self.model,
            input: texts,
            encoding_format: "float",
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(AgentError::provider_from_status(status, &body));
        }

        let result: EmbeddingsResponse = response.json().await.map_err(|e| {
            AgentError::provider_permanent(format!("malformed embedding response: {e}"))
        })?;

        // The API may reorder items; index restores input order.
        let mut data = result.data;
        data.sort_by_key(|d| d.index);

        if data.len() != texts.len() {
            return Err(AgentError::provider_permanent(format!(
                "embedding response has {} vectors for {} inputs",
                data.len(),
                texts.len()
            )));
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

// -- OpenAI API request/response types --

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_from_config_wins() {
        let config = ProviderConfig {
            api_key: Some("cfg-key".to_string()),
            ..Default::default()
        };
        temp_env::with_var(OPENAI_API_KEY_ENV, Some("env-key"), || {
            assert_eq!(resolve_api_key(&config).unwrap(), "cfg-key");
        });
    }

    #[test]
    fn api_key_falls_back_to_env() {
        let config = ProviderConfig::default();
        temp_env::with_var(OPENAI_API_KEY_ENV, Some("env-key"), || {
            assert_eq!(resolve_api_key(&config).unwrap(), "env-key");
        });
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let config = ProviderConfig::default();
        temp_env::with_var(OPENAI_API_KEY_ENV, None::<&str>, || {
            let err = resolve_api_key(&config).unwrap_err();
            assert!(matches!(err, AgentError::Configuration(_)));
        });
    }

    #[test]
    fn request_body_shape() {
        let texts = vec!["Iluminação Pública".to_string()];
        let body = EmbeddingsRequest {
            model: "text-embedding-3-large",
            input: &texts,
            encoding_format: "float",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "text-embedding-3-large");
        assert_eq!(json["input"][0], "Iluminação Pública");
        assert_eq!(json["encoding_format"], "float");
    }
}
