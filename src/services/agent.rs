//! Question-answering workflow.
//!
//! Five stages with explicit transitions: Router classifies the question,
//! SqlGenerator runs the two-phase generation protocol (offering the
//! resolver tools, then folding their results into a second call),
//! SqlExecutor submits the query, ResponseSynthesizer turns rows or a
//! captured error into prose, and ConversationalResponder answers anything
//! that never needed data. Every stage absorbs its own failures; a single
//! bad question never aborts the pipeline.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::errors::{AgentError, AgentResult};
use crate::domain::models::config::{IndexConfig, SchemaConfig};
use crate::domain::models::session::{ChatMessage, Route, SessionState, WorkflowStage};
use crate::domain::ports::chat::{ChatClient, ToolDescriptor, ToolInvocation};
use crate::domain::ports::warehouse::Warehouse;
use crate::services::extraction::extract_sql;
use crate::services::fallback::{fallback_query, is_valid_query};
use crate::services::prompts;
use crate::services::resolver::{CategoryResolver, ResolverTool};

/// Shown when synthesis itself cannot reach the provider. Raw provider
/// errors never become the final answer.
const INTERNAL_ERROR_RESPONSE: &str =
    "Desculpe, ocorreu um erro interno. Tente novamente ou reformule sua pergunta.";

/// Greeting used when the conversational call fails.
const GREETING_FALLBACK: &str = "Olá! Sou o assistente de análise de dados da Prefeitura \
     do Rio de Janeiro. Como posso ajudá-lo com informações sobre os serviços municipais?";

/// Rendered tool result for an unrecognized tool name.
const UNKNOWN_TOOL_RESULT: &str = "Tool não encontrada";

const EMPTY_RESPONSE: &str = "Erro: Não foi possível gerar resposta";

/// Table descriptions injected into the generation prompts.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    pub chamado: String,
    pub bairro: String,
}

impl SchemaSet {
    /// Read both schema description files named by the configuration.
    /// An unreadable file degrades to a Portuguese placeholder: generation
    /// quality suffers, the pipeline keeps answering.
    pub fn load(config: &SchemaConfig) -> Self {
        Self {
            chamado: read_schema(&config.chamado),
            bairro: read_schema(&config.bairro),
        }
    }
}

fn read_schema(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path, "schema file missing, using placeholder");
            format!("Arquivo de schema {path} não encontrado")
        }
        Err(err) => {
            warn!(path, error = %err, "schema file unreadable, using placeholder");
            format!("Erro ao carregar schema {path}: {err}")
        }
    }
}

struct Generation {
    content: String,
    tool_context: Option<String>,
}

/// The question-answering agent. One instance serves many questions; all
/// dependencies are shared and internally immutable, so concurrent calls
/// to [`Agent::answer`] are independent pipelines.
pub struct Agent {
    chat: Arc<dyn ChatClient>,
    warehouse: Arc<dyn Warehouse>,
    resolver: CategoryResolver,
    index: IndexConfig,
    schemas: SchemaSet,
}

impl Agent {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        warehouse: Arc<dyn Warehouse>,
        resolver: CategoryResolver,
        index: IndexConfig,
        schemas: SchemaSet,
    ) -> Self {
        Self { chat, warehouse, resolver, index, schemas }
    }

    /// Run one question through the workflow and return the finished state.
    ///
    /// Never fails: provider, execution, and generation errors are absorbed
    /// into the state and surface as an apologetic final response at worst.
    pub async fn answer(&self, question: &str) -> SessionState {
        let mut state = SessionState::new(question);
        let mut stage = WorkflowStage::Router;

        while !stage.is_terminal() {
            debug!(stage = stage.as_str(), "entering stage");
            (state, stage) = match stage {
                WorkflowStage::Router => self.route(state).await,
                WorkflowStage::SqlGenerator => self.generate(state).await,
                WorkflowStage::SqlExecutor => self.execute(state).await,
                WorkflowStage::ResponseSynthesizer => self.synthesize(state).await,
                WorkflowStage::ConversationalResponder => self.converse(state).await,
                WorkflowStage::Done => (state, WorkflowStage::Done),
            };
        }

        if state.final_response.is_empty() {
            state.final_response = EMPTY_RESPONSE.to_string();
        }
        state
    }

    /// Classify the question. Provider failure or malformed output routes
    /// to the conversational path, never an error.
    async fn route(&self, mut state: SessionState) -> (SessionState, WorkflowStage) {
        let prompt = prompts::router_prompt(&state.question);
        let route = match self.chat.complete(&[ChatMessage::user(prompt)], &[]).await {
            Ok(outcome) => Route::from_decision(outcome.text_or_empty()),
            Err(err) => {
                warn!(error = %err, "router call failed, treating question as conversational");
                Route::Conversational
            }
        };
        info!(route = route.as_str(), "question classified");
        state.route = Some(route);

        let next = match route {
            Route::DataQuery => WorkflowStage::SqlGenerator,
            Route::Conversational => WorkflowStage::ConversationalResponder,
        };
        (state, next)
    }

    /// Two-phase generation, then extraction, validity check, and keyword
    /// fallback. The query reaching the executor is never empty.
    async fn generate(&self, mut state: SessionState) -> (SessionState, WorkflowStage) {
        match self.generate_query(&state).await {
            Ok(generation) => {
                state.tool_context = generation.tool_context;
                state.push_message(ChatMessage::assistant(generation.content.clone()));

                let sql = extract_sql(&generation.content)
                    .filter(|text| is_valid_query(text))
                    .unwrap_or_else(|| {
                        info!("generation produced no usable query, applying pattern fallback");
                        fallback_query(&state.question)
                    });
                debug!(sql = %sql, "query ready for execution");
                state.sql_query = Some(sql);
            }
            Err(err) => {
                warn!(error = %err, "query generation failed");
                state.sql_query = None;
                state = state.with_error(format!("Erro ao gerar SQL: {err}"));
            }
        }

        let next = if state.sql_query.is_some() && state.error.is_none() {
            WorkflowStage::SqlExecutor
        } else {
            WorkflowStage::ResponseSynthesizer
        };
        (state, next)
    }

    async fn generate_query(&self, state: &SessionState) -> AgentResult<Generation> {
        let system = prompts::sql_generator_system_prompt(
            &self.schemas.chamado,
            &self.schemas.bairro,
            &prompts::agent_scratchpad(&state.messages),
        );
        let descriptors: Vec<ToolDescriptor> =
            ResolverTool::all().iter().map(ResolverTool::descriptor).collect();

        let phase_one = self
            .chat
            .complete(
                &[ChatMessage::system(system), ChatMessage::user(state.question.clone())],
                &descriptors,
            )
            .await?;

        if phase_one.tool_calls.is_empty() {
            return Ok(Generation {
                content: phase_one.text_or_empty().to_string(),
                tool_context: None,
            });
        }

        let context = self.resolve_tool_calls(&phase_one.tool_calls).await?;
        let follow_up =
            prompts::tool_context_prompt(&context, &self.schemas.chamado, &self.schemas.bairro);

        // A failed follow-up falls back to the first-phase text; extraction
        // and the pattern table take it from there.
        let content = match self
            .chat
            .complete(
                &[ChatMessage::system(follow_up), ChatMessage::user(state.question.clone())],
                &[],
            )
            .await
        {
            Ok(outcome) => outcome.text_or_empty().to_string(),
            Err(err) => {
                warn!(error = %err, "tool-context call failed, using first-phase text");
                phase_one.text_or_empty().to_string()
            }
        };

        Ok(Generation { content, tool_context: Some(context) })
    }

    /// Dispatch each tool call through the resolver and render the results
    /// as `name('term'): result` lines for the follow-up prompt.
    async fn resolve_tool_calls(&self, calls: &[ToolInvocation]) -> AgentResult<String> {
        let mut lines = Vec::with_capacity(calls.len());
        for call in calls {
            let term = call.query_argument().ok_or_else(|| {
                AgentError::GenerationInvalid(format!(
                    "tool call {} missing 'query' argument",
                    call.name
                ))
            })?;

            let result = match ResolverTool::from_wire_name(&call.name) {
                Some(tool) => {
                    let collection = tool.collection_name(&self.index);
                    let matches = self.resolver.resolve(&collection, term).await;
                    tool.render_matches(term, &matches)
                }
                None => {
                    warn!(tool = %call.name, "model requested an unknown tool");
                    UNKNOWN_TOOL_RESULT.to_string()
                }
            };
            lines.push(format!("{}('{}'): {}", call.name, term, result));
        }
        Ok(lines.join("\n"))
    }

    /// Submit the query. Failures are captured into the state; the workflow
    /// always proceeds to synthesis.
    async fn execute(&self, mut state: SessionState) -> (SessionState, WorkflowStage) {
        let sql = state.sql_query.clone().unwrap_or_default();
        if sql.trim().is_empty() {
            warn!("executor reached with empty query text");
            state.rows = Vec::new();
            state = state.with_error("SQL query vazia ou inválida");
            return (state, WorkflowStage::ResponseSynthesizer);
        }

        info!(sql = %sql, "executing query");
        match self.warehouse.execute(&sql).await {
            Ok(rows) => {
                let note =
                    format!("Consulta executada com sucesso. {} linhas retornadas.", rows.len());
                info!(rows = rows.len(), "query executed");
                state.rows = rows;
                state.push_message(ChatMessage::system(note));
            }
            Err(err) => {
                let detail = match err {
                    AgentError::Execution(message) => message,
                    other => other.to_string(),
                };
                let message = format!("Erro ao executar SQL: {detail}");
                warn!(error = %message, "query execution failed");
                state.rows = Vec::new();
                state.push_message(ChatMessage::system(message.clone()));
                state = state.with_error(message);
            }
        }
        (state, WorkflowStage::ResponseSynthesizer)
    }

    /// Turn rows, or a captured error, into the final answer.
    async fn synthesize(&self, mut state: SessionState) -> (SessionState, WorkflowStage) {
        let prompt = match &state.error {
            Some(error) => prompts::error_response_prompt(&state.question, error),
            None => prompts::response_synthesizer_prompt(
                &prompts::data_summary(&state.rows),
                &state.question,
            ),
        };

        let answer = match self.chat.complete(&[ChatMessage::user(prompt)], &[]).await {
            Ok(outcome) => match non_empty_trimmed(outcome.text_or_empty()) {
                Some(text) => text,
                None => INTERNAL_ERROR_RESPONSE.to_string(),
            },
            Err(err) => {
                warn!(error = %err, "response synthesis failed");
                INTERNAL_ERROR_RESPONSE.to_string()
            }
        };

        state.final_response = answer.clone();
        state.push_message(ChatMessage::assistant(answer));
        (state, WorkflowStage::Done)
    }

    /// Cordial reply for greetings and off-topic questions.
    async fn converse(&self, mut state: SessionState) -> (SessionState, WorkflowStage) {
        let prompt = prompts::conversational_prompt(&state.question);
        let answer = match self.chat.complete(&[ChatMessage::user(prompt)], &[]).await {
            Ok(outcome) => match non_empty_trimmed(outcome.text_or_empty()) {
                Some(text) => text,
                None => GREETING_FALLBACK.to_string(),
            },
            Err(err) => {
                warn!(error = %err, "conversational reply failed");
                GREETING_FALLBACK.to_string()
            }
        };

        state.final_response = answer.clone();
        state.push_message(ChatMessage::assistant(answer));
        (state, WorkflowStage::Done)
    }
}

fn non_empty_trimmed(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
