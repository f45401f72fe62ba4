//! Common test doubles for integration tests
//!
//! Fake provider and warehouse implementations that let the agent stack run
//! end-to-end without network access. The SQLite vector store is always the
//! real one.

// Each integration test binary compiles this module separately and uses a
// different subset of it.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use askrio::domain::errors::{AgentError, AgentResult};
use askrio::domain::models::{ChatMessage, Row};
use askrio::domain::ports::{ChatClient, ChatOutcome, EmbeddingClient, ToolDescriptor, Warehouse};

/// Deterministic pseudo-embedding: the vector depends only on the text, so
/// equal texts embed identically across calls and runs.
pub fn hash_vector(text: &str, dimension: usize) -> Vec<f32> {
    let mut seed = 2_166_136_261_u32;
    for byte in text.bytes() {
        seed ^= u32::from(byte);
        seed = seed.wrapping_mul(16_777_619);
    }
    (0..dimension)
        .map(|i| {
            seed = seed
                .wrapping_mul(1_664_525)
                .wrapping_add(1_013_904_223_u32.wrapping_add(i as u32));
            ((seed >> 16) as f32 / 65_536.0) - 0.5
        })
        .collect()
}

/// Embedding client backed by `hash_vector`.
pub struct HashEmbeddings {
    pub dimension: usize,
}

#[async_trait]
impl EmbeddingClient for HashEmbeddings {
    fn model(&self) -> &str {
        "fake-embedding"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> AgentResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| hash_vector(text, self.dimension))
            .collect())
    }
}

/// Embedding client that returns one fixed vector for every input and
/// counts calls. Useful when a test needs full control over similarity.
pub struct FixedEmbeddings {
    pub vector: Vec<f32>,
    pub calls: AtomicUsize,
}

impl FixedEmbeddings {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingClient for FixedEmbeddings {
    fn model(&self) -> &str {
        "fixed-embedding"
    }

    fn dimension(&self) -> usize {
        self.vector.len()
    }

    async fn embed(&self, texts: &[String]) -> AgentResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![self.vector.clone(); texts.len()])
    }
}

/// Embedding client that fails permanently for any batch containing the
/// poison text, succeeding for all others.
pub struct PoisonedEmbeddings {
    pub dimension: usize,
    pub poison: String,
}

#[async_trait]
impl EmbeddingClient for PoisonedEmbeddings {
    fn model(&self) -> &str {
        "poisoned-embedding"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> AgentResult<Vec<Vec<f32>>> {
        if texts.iter().any(|text| text == &self.poison) {
            return Err(AgentError::provider_permanent("simulated provider rejection"));
        }
        Ok(texts
            .iter()
            .map(|text| hash_vector(text, self.dimension))
            .collect())
    }
}

/// Chat client that replays a scripted sequence of outcomes and records the
/// full message list of every call.
pub struct ScriptedChat {
    replies: Mutex<VecDeque<AgentResult<ChatOutcome>>>,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChat {
    pub fn new(replies: Vec<AgentResult<ChatOutcome>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatClient for ScriptedChat {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolDescriptor],
    ) -> AgentResult<ChatOutcome> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(text_outcome("")))
    }
}

/// Shorthand for a text-only chat outcome.
pub fn text_outcome(text: &str) -> ChatOutcome {
    ChatOutcome {
        text: Some(text.to_string()),
        tool_calls: vec![],
    }
}

/// Warehouse that returns fixed rows (or a fixed failure) and records every
/// query it receives.
pub struct StubWarehouse {
    pub rows: Vec<Row>,
    pub fail_with: Option<String>,
    pub queries: Mutex<Vec<String>>,
}

impl StubWarehouse {
    pub fn returning(rows: Vec<Row>) -> Self {
        Self {
            rows,
            fail_with: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            rows: Vec::new(),
            fail_with: Some(message.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl Warehouse for StubWarehouse {
    async fn execute(&self, sql: &str) -> AgentResult<Vec<Row>> {
        self.queries.lock().unwrap().push(sql.to_string());
        match &self.fail_with {
            Some(message) => Err(AgentError::Execution(message.clone())),
            None => Ok(self.rows.clone()),
        }
    }
}

/// Warehouse keyed by column name: `SELECT DISTINCT <column> ...` returns the
/// configured values for that column, one per row.
pub struct ValuesWarehouse {
    pub by_column: HashMap<String, Vec<String>>,
    pub failing_columns: Vec<String>,
}

impl Default for ValuesWarehouse {
    fn default() -> Self {
        Self::new()
    }
}

impl ValuesWarehouse {
    pub fn new() -> Self {
        Self {
            by_column: HashMap::new(),
            failing_columns: Vec::new(),
        }
    }

    pub fn with_values(mut self, column: &str, values: &[&str]) -> Self {
        self.by_column.insert(
            column.to_string(),
            values.iter().map(ToString::to_string).collect(),
        );
        self
    }

    pub fn with_failing_column(mut self, column: &str) -> Self {
        self.failing_columns.push(column.to_string());
        self
    }
}

#[async_trait]
impl Warehouse for ValuesWarehouse {
    async fn execute(&self, sql: &str) -> AgentResult<Vec<Row>> {
        for column in &self.failing_columns {
            if sql.contains(&format!("DISTINCT {column} FROM")) {
                return Err(AgentError::Execution(format!(
                    "simulated extraction failure for {column}"
                )));
            }
        }
        for (column, values) in &self.by_column {
            if sql.contains(&format!("DISTINCT {column} FROM")) {
                return Ok(values.iter().map(|value| value_row(column, value)).collect());
            }
        }
        Ok(Vec::new())
    }
}

/// Single-cell row, the shape a `SELECT DISTINCT <column>` query produces.
pub fn value_row(column: &str, value: &str) -> Row {
    let mut row = Row::new();
    row.insert(
        column.to_string(),
        serde_json::Value::String(value.to_string()),
    );
    row
}
