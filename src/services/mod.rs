pub mod agent;
pub mod extraction;
pub mod fallback;
pub mod index_builder;
pub mod prompts;
pub mod resolver;
pub mod retry;

pub use agent::{Agent, SchemaSet};
pub use index_builder::IndexBuilder;
pub use resolver::{CategoryResolver, ResolverTool};
pub use retry::RetryPolicy;
