//! OpenAI chat-completions wire format, and the mapping between it and
//! Touchline's turn log.
//!
//! A tool turn expands to two wire messages: the assistant message carrying
//! the tool call, then the tool message carrying its result.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use touchline_core::types::{ToolCallRequest, ToolDefinition, Turn, TurnContent};

use crate::traits::{Decision, OutputMode, ProviderError};

/// Appended to the system prompt in JSON mode (the API requires the word "JSON").
const JSON_MODE_SUFFIX: &str = "\n\nRespond with a single JSON object and nothing else.";

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum ChatMessage {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },

    #[serde(rename = "assistant")]
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<WireToolCall>>,
    },

    #[serde(rename = "tool")]
    Tool {
        content: String,
        tool_call_id: String,
    },
}

/// A tool call as it appears on the wire (arguments are a JSON string).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WireToolCall {
    pub id: String,
    /// Always "function" in current OpenAI API.
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

/// The function name and arguments within a tool call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments string.
    pub arguments: String,
}

impl From<&ToolCallRequest> for WireToolCall {
    fn from(call: &ToolCallRequest) -> Self {
        WireToolCall {
            id: call.id.clone(),
            call_type: function_type(),
            function: FunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.to_string(),
            },
        }
    }
}

impl WireToolCall {
    /// Convert to a `ToolCallRequest`, keeping unparseable arguments raw so
    /// argument validation can reject them.
    fn into_request(self, index: usize) -> ToolCallRequest {
        let raw = self.function.arguments;
        let arguments = if raw.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&raw).unwrap_or(Value::String(raw))
        };
        let id = if self.id.is_empty() {
            format!("call_{index}")
        } else {
            self.id
        };
        ToolCallRequest::new(id, self.function.name, arguments)
    }
}

/// Build the wire message list for one decision.
pub fn build_messages(instructions: &str, turns: &[Turn], output: OutputMode) -> Vec<ChatMessage> {
    let mut system = instructions.to_string();
    if output == OutputMode::Json {
        system.push_str(JSON_MODE_SUFFIX);
    }

    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatMessage::System { content: system });

    for turn in turns {
        match turn {
            Turn::User { content } => messages.push(ChatMessage::User {
                content: content.clone(),
            }),
            Turn::Assistant { content } => messages.push(ChatMessage::Assistant {
                content: Some(content.render()),
                tool_calls: None,
            }),
            Turn::Tool { call, result } => {
                messages.push(ChatMessage::Assistant {
                    content: None,
                    tool_calls: Some(vec![WireToolCall::from(call)]),
                });
                messages.push(ChatMessage::Tool {
                    content: result.to_value().to_string(),
                    tool_call_id: call.id.clone(),
                });
            }
        }
    }

    messages
}

// ─────────────────────────────────────────────
// Request / response bodies
// ─────────────────────────────────────────────

/// `response_format` payload.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Raw chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<UsageInfo>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

/// Token usage statistics.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    /// Turn the raw response into a decision.
    ///
    /// Only the first tool call is honoured; requests go out with
    /// `parallel_tool_calls: false` so more than one is unexpected.
    pub fn into_decision(self, output: OutputMode) -> Result<Decision, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("no choices in response".into()))?;

        let mut tool_calls = choice.message.tool_calls.unwrap_or_default();
        if !tool_calls.is_empty() {
            if tool_calls.len() > 1 {
                warn!(count = tool_calls.len(), "provider returned several tool calls, using the first");
            }
            let first = tool_calls.swap_remove(0);
            return Ok(Decision::CallTool(first.into_request(0)));
        }

        let content = choice.message.content.map(|text| parse_content(text, output));
        Ok(Decision::Answer(content))
    }
}

/// In JSON mode a reply that parses as an object becomes structured content;
/// anything else stays text.
fn parse_content(text: String, output: OutputMode) -> TurnContent {
    if output == OutputMode::Json {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text.trim()) {
            return TurnContent::Structured(value);
        }
    }
    TurnContent::Text(text)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
