pub mod catalog;
pub mod config;
pub mod report;
pub mod session;

pub use catalog::{CollectionEntry, SimilarityMatch};
pub use config::{
    ColumnMapping, Config, IndexConfig, LoggingConfig, ProviderConfig, RetryConfig, SchemaConfig,
    WarehouseConfig,
};
pub use report::{BuildReport, ColumnBuildOutcome, ColumnStatus};
pub use session::{ChatMessage, ChatRole, Route, Row, SessionState, WorkflowStage};
