//! Chat completion port.
//!
//! One request/response boundary around the LLM: ordered messages in, one
//! message out, optionally carrying tool invocations the caller must
//! resolve before asking again.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::AgentResult;
use crate::domain::models::session::ChatMessage;

/// A callable tool offered to the model: name, what it does, and a JSON
/// schema for its arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool the model asked to invoke.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    /// Parsed JSON arguments (the wire carries them as an encoded string).
    pub arguments: serde_json::Value,
}

impl ToolInvocation {
    /// The `query` argument every resolver tool takes.
    pub fn query_argument(&self) -> Option<&str> {
        self.arguments.get("query").and_then(|v| v.as_str())
    }
}

/// What one completion call produced.
#[derive(Debug, Clone, Default)]
pub struct ChatOutcome {
    /// Assistant text, if any.
    pub text: Option<String>,

    /// Tool invocations, in the order the model requested them.
    pub tool_calls: Vec<ToolInvocation>,
}

impl ChatOutcome {
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// LLM chat/completion boundary.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// One completion call. `tools` may be empty, in which case the model
    /// is not offered any tool.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDescriptor],
    ) -> AgentResult<ChatOutcome>;
}
