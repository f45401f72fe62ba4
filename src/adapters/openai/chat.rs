//! OpenAI chat completion adapter.
//!
//! Direct HTTP calls to the `/chat/completions` endpoint, including the
//! function-calling surface the SQL generator uses for term resolution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::adapters::openai::embeddings::resolve_api_key;
use crate::domain::errors::{AgentError, AgentResult};
use crate::domain::models::config::ProviderConfig;
use crate::domain::models::session::ChatMessage;
use crate::domain::ports::chat::{ChatClient, ChatOutcome, ToolDescriptor, ToolInvocation};

/// `ChatClient` backed by the OpenAI chat completions API.
pub struct OpenAiChat {
    base_url: String,
    model: String,
    temperature: f32,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiChat {
    /// Build the adapter, resolving credentials up front.
    pub fn new(config: &ProviderConfig) -> AgentResult<Self> {
        let api_key = resolve_api_key(config)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.base_url.clone(),
            model: config.chat_model.clone(),
            temperature: config.temperature,
            api_key,
            client,
        })
    }

    fn build_request<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        tools: &'a [ToolDescriptor],
    ) -> CompletionRequest<'a> {
        let wire_messages = messages
            .iter()
            .map(|m| WireMessage { role: m.role.as_str(), content: &m.content })
            .collect();

        let wire_tools: Vec<WireTool<'a>> = tools
            .iter()
            .map(|t| WireTool { kind: "function", function: t })
            .collect();

        CompletionRequest {
            model: &self.model,
            messages: wire_messages,
            tool_choice: if wire_tools.is_empty() { None } else { Some("auto") },
            tools: if wire_tools.is_empty() { None } else { Some(wire_tools) },
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl ChatClient for OpenAiChat {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDescriptor],
    ) -> AgentResult<ChatOutcome> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request(messages, tools);

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

        let parsed: CompletionResponse = response.json().await.map_err(|e| {
            AgentError::provider_permanent(format!("malformed completion response: {e}"))
        })?;

        outcome_from_response(parsed)
    }
}

/// Pull text and tool invocations out of a parsed response.
fn outcome_from_response(response: CompletionResponse) -> AgentResult<ChatOutcome> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| AgentError::provider_permanent("completion response has no choices"))?;

    let mut tool_calls = Vec::new();
    for call in message.tool_calls.unwrap_or_default() {
        let arguments: serde_json::Value =
            serde_json::from_str(&call.function.arguments).map_err(|e| {
                AgentError::provider_permanent(format!(
                    "tool call {} has unparseable arguments: {e}",
                    call.function.name
                ))
            })?;
        tool_calls.push(ToolInvocation { name: call.function.name, arguments });
    }

    Ok(ChatOutcome {
        text: message.content.filter(|c| !c.is_empty()),
        tool_calls,
    })
}

// -- OpenAI API request/response types --

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolDescriptor,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    function: WireFunctionCall,
}

#[derive(Debug, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::session::ChatMessage;

    fn adapter() -> OpenAiChat {
        let config = ProviderConfig {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        OpenAiChat::new(&config).unwrap()
    }

    #[test]
    fn request_omits_tools_when_none_offered() {
        let chat = adapter();
        let messages = [ChatMessage::user("Olá")];
        let body = chat.build_request(&messages, &[]);
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("tool_choice").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn request_wraps_tools_as_functions() {
        let chat = adapter();
        let messages = [ChatMessage::system("prompt"), ChatMessage::user("q")];
        let tools = [ToolDescriptor {
            name: "get_tipo".to_string(),
            description: "Busca tipos".to_string(),
            parameters: serde_json::json!({"type": "object"}),
        }];
        let json = serde_json::to_value(chat.build_request(&messages, &tools)).unwrap();
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "get_tipo");
        assert_eq!(json["tool_choice"], "auto");
    }

    #[test]
    fn parses_tool_calls_with_json_string_arguments() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_subtipo", "arguments": "{\"query\": \"buraco\"}"}
                    }]
                }
            }]
        });
        let parsed: CompletionResponse = serde_json::from_value(raw).unwrap();
        let outcome = outcome_from_response(parsed).unwrap();
        assert!(outcome.text.is_none());
        assert_eq!(outcome.tool_calls.len(), 1);
        assert_eq!(outcome.tool_calls[0].name, "get_subtipo");
        assert_eq!(outcome.tool_calls[0].query_argument(), Some("buraco"));
    }

    #[test]
    fn parses_plain_text_responses() {
        let raw = serde_json::json!({
            "choices": [{"message": {"content": "data_query"}}]
        });
        let parsed: CompletionResponse = serde_json::from_value(raw).unwrap();
        let outcome = outcome_from_response(parsed).unwrap();
        assert_eq!(outcome.text.as_deref(), Some("data_query"));
        assert!(outcome.tool_calls.is_empty());
    }

    #[test]
    fn empty_choices_is_a_provider_error() {
        let parsed: CompletionResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        let err = outcome_from_response(parsed).unwrap_err();
        assert!(matches!(err, AgentError::Provider { .. }));
    }

    #[test]
    fn unparseable_tool_arguments_are_a_provider_error() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "function": {"name": "get_tipo", "arguments": "not json"}
                    }]
                }
            }]
        });
        let parsed: CompletionResponse = serde_json::from_value(raw).unwrap();
        assert!(outcome_from_response(parsed).is_err());
    }
}
