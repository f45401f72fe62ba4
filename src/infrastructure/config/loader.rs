use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Index database path cannot be empty")]
    EmptyIndexPath,

    #[error("Invalid batch_size: {0}. Must be at least 1")]
    InvalidBatchSize(usize),

    #[error("Invalid max_workers: {0}. Must be at least 1")]
    InvalidMaxWorkers(usize),

    #[error("Invalid similarity_threshold: {0}. Must be within [0, 1]")]
    InvalidThreshold(f32),

    #[error("Invalid top_k: {0}. Must be at least 1")]
    InvalidTopK(usize),

    #[error("Invalid embedding_dimension: {0}. Must be at least 1")]
    InvalidDimension(usize),

    #[error("No indexed columns configured")]
    NoColumns,

    #[error("Invalid max_attempts: {0}. Cannot be 0")]
    InvalidMaxAttempts(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. askrio.yaml (project config)
    /// 3. askrio.local.yaml (local overrides, optional)
    /// 4. Environment variables (ASKRIO_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("askrio.yaml"))
            .merge(Yaml::file("askrio.local.yaml"))
            .merge(Env::prefixed("ASKRIO_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.warehouse.project.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "warehouse.project cannot be empty".to_string(),
            ));
        }

        if config.provider.embedding_dimension == 0 {
            return Err(ConfigError::InvalidDimension(
                config.provider.embedding_dimension,
            ));
        }

        // Validate index config
        if config.index.db_path.is_empty() {
            return Err(ConfigError::EmptyIndexPath);
        }

        if config.index.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(config.index.batch_size));
        }

        if config.index.max_workers == 0 {
            return Err(ConfigError::InvalidMaxWorkers(config.index.max_workers));
        }

        if !(0.0..=1.0).contains(&config.index.similarity_threshold) {
            return Err(ConfigError::InvalidThreshold(
                config.index.similarity_threshold,
            ));
        }

        if config.index.top_k == 0 {
            return Err(ConfigError::InvalidTopK(config.index.top_k));
        }

        if config.index.columns.is_empty() {
            return Err(ConfigError::NoColumns);
        }

        for mapping in &config.index.columns {
            if mapping.column.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "indexed column name cannot be empty".to_string(),
                ));
            }
            if mapping.collection.is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "column '{}' has no collection name",
                    mapping.column
                )));
            }
        }

        // Validate retry config
        if config.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(config.retry.max_attempts));
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}
