//! Per-question session state threaded through the synthesis workflow.
//!
//! One `SessionState` is created per incoming question and owned by exactly
//! one pipeline run. Stages take the state by value and hand back the
//! updated value; nothing is shared across concurrent questions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One result row from the warehouse, column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// How the router classified a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Needs data from the warehouse
    DataQuery,
    /// Greeting, thanks, or anything answerable without data
    Conversational,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataQuery => "data_query",
            Self::Conversational => "conversational",
        }
    }

    /// Classify a raw router decision. Anything that does not clearly ask
    /// for data falls back to the conversational path.
    pub fn from_decision(decision: &str) -> Self {
        if decision.to_lowercase().contains("data_query") {
            Self::DataQuery
        } else {
            Self::Conversational
        }
    }
}

/// Stages of the query synthesis workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Router,
    SqlGenerator,
    SqlExecutor,
    ResponseSynthesizer,
    ConversationalResponder,
    Done,
}

impl WorkflowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Router => "router",
            Self::SqlGenerator => "sql_generator",
            Self::SqlExecutor => "sql_executor",
            Self::ResponseSynthesizer => "response_synthesizer",
            Self::ConversationalResponder => "conversational_responder",
            Self::Done => "done",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One entry in the session message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// The record a question accumulates as it moves through the workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Unique id of this pipeline run
    pub id: Uuid,

    /// The user's question, verbatim
    pub question: String,

    /// Router classification, set by the router stage
    pub route: Option<Route>,

    /// Generated (or fallback) SQL, set by the generator stage
    pub sql_query: Option<String>,

    /// Warehouse result rows, set by the executor stage
    pub rows: Vec<Row>,

    /// First captured pipeline error, if any
    pub error: Option<String>,

    /// The answer shown to the user
    pub final_response: String,

    /// Running message log across stages
    pub messages: Vec<ChatMessage>,

    /// Rendered resolver-tool results from the generation phase
    pub tool_context: Option<String>,
}

impl SessionState {
    /// Fresh state for one incoming question. The question is the first
    /// entry of the message log.
    pub fn new(question: impl Into<String>) -> Self {
        let question = question.into();
        Self {
            id: Uuid::new_v4(),
            question: question.clone(),
            route: None,
            sql_query: None,
            rows: Vec::new(),
            error: None,
            final_response: String::new(),
            messages: vec![ChatMessage::user(question)],
            tool_context: None,
        }
    }

    /// Record a stage failure without aborting the pipeline. The first
    /// error wins; later stages still see it.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        if self.error.is_none() {
            self.error = Some(message.into());
        }
        self
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }
}
