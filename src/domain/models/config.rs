use serde::{Deserialize, Serialize};

/// Main configuration structure for askrio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Embedding/chat provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Data warehouse configuration
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Vector index configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Table schema description files
    #[serde(default)]
    pub schemas: SchemaConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            warehouse: WarehouseConfig::default(),
            index: IndexConfig::default(),
            retry: RetryConfig::default(),
            schemas: SchemaConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// OpenAI-compatible provider configuration, shared by the chat and
/// embedding adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProviderConfig {
    /// Base URL of the provider API
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// Chat completion model
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding vector dimension for the configured model
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// API key (can also be set via OPENAI_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature for chat completions
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_provider_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-5".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-large".to_string()
}

const fn default_embedding_dimension() -> usize {
    3072
}

const fn default_provider_timeout_secs() -> u64 {
    120
}

const fn default_temperature() -> f32 {
    1.0
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
            api_key: None,
            timeout_secs: default_provider_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

/// BigQuery data warehouse configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WarehouseConfig {
    /// Billing project the query jobs run under
    #[serde(default = "default_warehouse_project")]
    pub project: String,

    /// Base URL of the BigQuery REST API (for testing/proxies)
    #[serde(default = "default_warehouse_base_url")]
    pub base_url: String,

    /// OAuth bearer token (can also be set via BIGQUERY_TOKEN env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Server-side query timeout in milliseconds
    #[serde(default = "default_warehouse_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_warehouse_project() -> String {
    "datario".to_string()
}

fn default_warehouse_base_url() -> String {
    "https://bigquery.googleapis.com/bigquery/v2".to_string()
}

const fn default_warehouse_timeout_ms() -> u64 {
    60_000
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            project: default_warehouse_project(),
            base_url: default_warehouse_base_url(),
            access_token: None,
            timeout_ms: default_warehouse_timeout_ms(),
        }
    }
}

/// Vector index configuration: where the collections live, how they are
/// built, and how similarity search behaves at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IndexConfig {
    /// Path to the SQLite database holding the collections
    #[serde(default = "default_index_db_path")]
    pub db_path: String,

    /// Number of values embedded per provider call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Bound on concurrent embedding workers during a rebuild
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Minimum similarity for a match to be returned
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Neighbors requested per similarity query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Categorical columns to index, with their collection names
    #[serde(default = "default_columns")]
    pub columns: Vec<ColumnMapping>,
}

/// One indexed categorical column and the collection that holds its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ColumnMapping {
    /// Warehouse column name
    pub column: String,

    /// Vector store collection name
    pub collection: String,
}

fn default_index_db_path() -> String {
    ".askrio/index.db".to_string()
}

const fn default_batch_size() -> usize {
    1000
}

const fn default_max_workers() -> usize {
    3
}

const fn default_similarity_threshold() -> f32 {
    0.3
}

const fn default_top_k() -> usize {
    5
}

fn default_columns() -> Vec<ColumnMapping> {
    vec![
        ColumnMapping {
            column: "tipo".to_string(),
            collection: "tipo_collection".to_string(),
        },
        ColumnMapping {
            column: "subtipo".to_string(),
            collection: "subtipo_collection".to_string(),
        },
        ColumnMapping {
            column: "nome_unidade_organizacional".to_string(),
            collection: "unidade_organizacional_collection".to_string(),
        },
        ColumnMapping {
            column: "id_unidade_organizacional_mae".to_string(),
            collection: "unidade_mae_collection".to_string(),
        },
    ]
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            db_path: default_index_db_path(),
            batch_size: default_batch_size(),
            max_workers: default_max_workers(),
            similarity_threshold: default_similarity_threshold(),
            top_k: default_top_k(),
            columns: default_columns(),
        }
    }
}

impl IndexConfig {
    /// Collection name for a column, if that column is configured.
    pub fn collection_for(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.collection.as_str())
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of attempts per embedding batch, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Paths of the schema description files handed to the SQL generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchemaConfig {
    /// Service-call table description
    #[serde(default = "default_chamado_schema_path")]
    pub chamado: String,

    /// Neighborhood table description
    #[serde(default = "default_bairro_schema_path")]
    pub bairro: String,
}

fn default_chamado_schema_path() -> String {
    "schemas/chamado.md".to_string()
}

fn default_bairro_schema_path() -> String {
    "schemas/bairro.md".to_string()
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            chamado: default_chamado_schema_path(),
            bairro: default_bairro_schema_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}
