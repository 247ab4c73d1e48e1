//! Tool trait — the interface every orchestrator tool implements.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use touchline_core::types::{ToolDefinition, ToolResult};

/// Validated, coerced arguments handed to `Tool::execute`.
pub type ToolArgs = HashMap<String, Value>;

// ─────────────────────────────────────────────
// Parameter schema
// ─────────────────────────────────────────────

/// Primitive kind of a tool parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamKind {
    /// JSON Schema type name.
    pub fn schema_type(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }
}

/// One declared parameter of a tool.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every orchestrator tool implements this trait.
///
/// The orchestrator advertises tools via `to_definition()`, the registry
/// validates arguments against `params()`, and calls are dispatched to
/// `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the provider uses to call this tool.
    fn name(&self) -> &str;

    /// Description shown to the provider.
    fn description(&self) -> &str;

    /// Declared parameters, in display order.
    fn params(&self) -> Vec<ParamSpec>;

    /// JSON Schema built from `params()`.
    fn parameters(&self) -> Value {
        let params = self.params();
        let mut properties = Map::new();
        for p in &params {
            properties.insert(
                p.name.to_string(),
                json!({ "type": p.kind.schema_type(), "description": p.description }),
            );
        }
        let required: Vec<&str> = params.iter().filter(|p| p.required).map(|p| p.name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Run the tool with validated arguments.
    ///
    /// Expected failures should come back as `ToolResult::Error`; an `Err`
    /// is caught by the registry and turned into one.
    async fn execute(&self, args: ToolArgs) -> anyhow::Result<ToolResult>;

    /// Build the `ToolDefinition` sent to the provider.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required `String` param, returning a user-friendly error.
pub fn require_string(args: &ToolArgs, key: &str) -> anyhow::Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))
}
