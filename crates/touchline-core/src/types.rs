//! Core types for Touchline — the turn log, tool calls, and tool results.
//!
//! A conversation is a list of role-tagged [`Turn`]s. Tool turns carry both the
//! request the provider made and the result it resolved to, so a tool call can
//! never sit in the log without its answer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────
// Turns
// ─────────────────────────────────────────────

/// Who produced a turn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };
        f.write_str(s)
    }
}

/// Turn payload — free text or a structured JSON value.
///
/// Serialized untagged: text becomes a JSON string, structured stays as-is.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Structured(Value),
}

impl TurnContent {
    /// Whether this payload carries nothing worth showing.
    pub fn is_blank(&self) -> bool {
        match self {
            TurnContent::Text(s) => s.trim().is_empty(),
            TurnContent::Structured(v) => v.is_null(),
        }
    }

    /// Render for display or for a text-only wire format.
    pub fn render(&self) -> String {
        match self {
            TurnContent::Text(s) => s.clone(),
            TurnContent::Structured(v) => v.to_string(),
        }
    }
}

impl From<&str> for TurnContent {
    fn from(s: &str) -> Self {
        TurnContent::Text(s.to_string())
    }
}

impl From<String> for TurnContent {
    fn from(s: String) -> Self {
        TurnContent::Text(s)
    }
}

/// One role-tagged entry in a conversation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Turn {
    User {
        content: String,
    },
    Assistant {
        content: TurnContent,
    },
    /// A resolved tool call: what was asked and what came back.
    Tool {
        call: ToolCallRequest,
        result: ToolResult,
    },
}

impl Turn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Turn::User {
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<TurnContent>) -> Self {
        Turn::Assistant {
            content: content.into(),
        }
    }

    /// Create a tool turn from a request and its result.
    pub fn tool(call: ToolCallRequest, result: ToolResult) -> Self {
        Turn::Tool { call, result }
    }

    pub fn role(&self) -> Role {
        match self {
            Turn::User { .. } => Role::User,
            Turn::Assistant { .. } => Role::Assistant,
            Turn::Tool { .. } => Role::Tool,
        }
    }

    /// The turn's content; a tool turn's content is its result.
    pub fn content(&self) -> TurnContent {
        match self {
            Turn::User { content } => TurnContent::Text(content.clone()),
            Turn::Assistant { content } => content.clone(),
            Turn::Tool { result, .. } => TurnContent::Structured(result.to_value()),
        }
    }
}

// ─────────────────────────────────────────────
// Tool calls
// ─────────────────────────────────────────────

/// A provider's request to invoke a named tool.
///
/// `arguments` is kept raw; the registry validates it against the tool's
/// declared parameters before anything runs.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRequest {
    /// Provider-assigned call id (used to pair the result on the wire).
    pub id: String,
    /// Name of the tool to run.
    pub name: String,
    /// Arguments as sent by the provider (expected to be a JSON object).
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        ToolCallRequest {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Outcome of a tool invocation, fed back to the provider as a tool turn.
///
/// Serialized untagged, so an error is `{"error": ..., "details": ...}` and a
/// success is the mapping itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ToolResult {
    Error { error: String, details: String },
    Value(Map<String, Value>),
}

impl ToolResult {
    /// Build an error descriptor.
    pub fn error(error: impl Into<String>, details: impl Into<String>) -> Self {
        ToolResult::Error {
            error: error.into(),
            details: details.into(),
        }
    }

    /// Build a success result from any JSON value.
    ///
    /// Objects are used as-is; other values are wrapped as `{"value": ...}`.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => ToolResult::Value(map),
            other => {
                let mut map = Map::new();
                map.insert("value".into(), other);
                ToolResult::Value(map)
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Error { .. })
    }

    /// Look up a field of a success result.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            ToolResult::Value(map) => map.get(key),
            ToolResult::Error { .. } => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ToolResult::Error { error, details } => serde_json::json!({
                "error": error,
                "details": details,
            }),
            ToolResult::Value(map) => Value::Object(map.clone()),
        }
    }
}

// ─────────────────────────────────────────────
// Tool definitions (for provider requests)
// ─────────────────────────────────────────────

/// Definition of a tool, sent to the provider so it knows what it may call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    /// The function schema.
    pub function: FunctionDefinition,
}

/// Schema of a function tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
