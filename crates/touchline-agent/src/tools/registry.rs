//! Tool Registry — the fixed set of tools an orchestrator may call.
//!
//! Registration happens once at startup; afterwards the registry is shared
//! read-only (`Arc<ToolRegistry>`) between every session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Number, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use touchline_core::types::{ToolDefinition, ToolResult};

use super::base::{ParamKind, ParamSpec, Tool, ToolArgs};

/// Default per-invocation timeout.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
}

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name, validates arguments and dispatches calls.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    tool_timeout: Duration,
}

impl ToolRegistry {
    /// Create an empty registry with the default tool timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TOOL_TIMEOUT)
    }

    pub fn with_timeout(tool_timeout: Duration) -> Self {
        Self {
            tools: HashMap::new(),
            tool_timeout,
        }
    }

    /// Bound applied to each tool invocation.
    pub fn tool_timeout(&self) -> Duration {
        self.tool_timeout
    }

    /// Register a tool. Names are unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        info!(tool = %name, "registered tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, RegistryError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    /// Names of all registered tools, sorted for determinism.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Provider-facing definitions for all registered tools, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        defs
    }

    /// Check raw provider arguments against the tool's declared parameters.
    ///
    /// Declared parameters are coerced to their kind; undeclared keys pass
    /// through. A `null` optional parameter is treated as absent.
    pub fn validate_arguments(&self, tool: &dyn Tool, raw: &Value) -> Result<ToolArgs, RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidArguments {
            tool: tool.name().to_string(),
            reason,
        };

        let object = raw
            .as_object()
            .ok_or_else(|| invalid(format!("expected a JSON object, got {}", value_kind(raw))))?;

        let mut args: ToolArgs = object
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for spec in tool.params() {
            match args.remove(spec.name) {
                Some(value) => {
                    let coerced = coerce(&spec, value).map_err(&invalid)?;
                    args.insert(spec.name.to_string(), coerced);
                }
                None if spec.required => {
                    return Err(invalid(format!("missing required parameter '{}'", spec.name)));
                }
                None => {}
            }
        }

        Ok(args)
    }

    /// Run a tool under the registry timeout.
    ///
    /// Never fails: an `Err` or a timeout becomes an error descriptor the
    /// provider can read.
    pub async fn invoke(&self, tool: &dyn Tool, args: ToolArgs) -> ToolResult {
        let name = tool.name();
        debug!(tool = %name, "invoking tool");

        match tokio::time::timeout(self.tool_timeout, tool.execute(args)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(tool = %name, error = %e, "tool execution failed");
                ToolResult::error(format!("Tool '{name}' failed"), e.to_string())
            }
            Err(_) => {
                warn!(tool = %name, timeout_secs = self.tool_timeout.as_secs(), "tool timed out");
                ToolResult::error(
                    format!("Tool '{name}' timed out"),
                    format!("no result within {}s", self.tool_timeout.as_secs()),
                )
            }
        }
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────
// Coercion
// ─────────────────────────────────────────────

fn coerce(spec: &ParamSpec, value: Value) -> Result<Value, String> {
    let mismatch = |v: &Value| {
        format!(
            "parameter '{}' must be {}, got {}",
            spec.name,
            spec.kind.schema_type(),
            value_kind(v)
        )
    };

    match (spec.kind, value) {
        (ParamKind::String, v @ Value::String(_)) => Ok(v),
        (ParamKind::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (ParamKind::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),

        (ParamKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(Value::Number(n)),
        (ParamKind::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(Value::Number(i.into())),
            Err(_) => Err(mismatch(&Value::String(s))),
        },

        (ParamKind::Number, v @ Value::Number(_)) => Ok(v),
        (ParamKind::Number, Value::String(s)) => match s.trim().parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Ok(Value::Number(n)),
            None => Err(mismatch(&Value::String(s))),
        },

        (ParamKind::Boolean, v @ Value::Bool(_)) => Ok(v),
        (ParamKind::Boolean, Value::String(s)) if s == "true" => Ok(Value::Bool(true)),
        (ParamKind::Boolean, Value::String(s)) if s == "false" => Ok(Value::Bool(false)),

        (_, other) => Err(mismatch(&other)),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::tools::base::require_string;

    /// Minimal test tool.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn params(&self) -> Vec<ParamSpec> {
            vec![
                ParamSpec::required("text", ParamKind::String, "Text to echo"),
                ParamSpec::optional("times", ParamKind::Integer, "Repeat count"),
                ParamSpec::optional("ratio", ParamKind::Number, "Any ratio"),
                ParamSpec::optional("loud", ParamKind::Boolean, "Shout"),
            ]
        }
        async fn execute(&self, args: ToolArgs) -> anyhow::Result<ToolResult> {
            let text = require_string(&args, "text")?;
            Ok(ToolResult::from_json(json!({ "echo": text })))
        }
    }

    /// Tool that always fails.
    struct FailTool;

    #[async_trait]
    impl Tool for FailTool {
        fn name(&self) -> &str {
            "fail"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn params(&self) -> Vec<ParamSpec> {
            vec![]
        }
        async fn execute(&self, _args: ToolArgs) -> anyhow::Result<ToolResult> {
            anyhow::bail!("intentional failure")
        }
    }

    /// Tool that never finishes in time.
    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &str {
            "slow"
        }
        fn description(&self) -> &str {
            "Sleeps"
        }
        fn params(&self) -> Vec<ParamSpec> {
            vec![]
        }
        async fn execute(&self, _args: ToolArgs) -> anyhow::Result<ToolResult> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ToolResult::from_json(json!({})))
        }
    }

    fn registry() -> ToolRegistry {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool)).unwrap();
        reg
    }

    #[test]
    fn test_register_and_resolve() {
        let reg = registry();
        assert_eq!(reg.resolve("echo").unwrap().name(), "echo");
        assert_eq!(reg.len(), 1);
        assert!(matches!(reg.resolve("nope"), Err(RegistryError::UnknownTool(n)) if n == "nope"));
    }

    #[test]
    fn test_register_duplicate_rejected() {
        let mut reg = registry();
        let err = reg.register(Arc::new(EchoTool)).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("echo".into()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_definitions_sorted() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(FailTool)).unwrap();
        reg.register(Arc::new(EchoTool)).unwrap();
        let names: Vec<String> = reg.definitions().iter().map(|d| d.name().to_string()).collect();
        assert_eq!(names, vec!["echo", "fail"]);
        assert_eq!(reg.tool_names(), vec!["echo", "fail"]);
    }

    #[test]
    fn test_validate_passes_and_keeps_extra_keys() {
        let reg = registry();
        let args = reg
            .validate_arguments(&EchoTool, &json!({"text": "hi", "extra": [1, 2]}))
            .unwrap();
        assert_eq!(args["text"], json!("hi"));
        assert_eq!(args["extra"], json!([1, 2]));
    }

    #[test]
    fn test_validate_coerces_kinds() {
        let reg = registry();
        let args = reg
            .validate_arguments(
                &EchoTool,
                &json!({"text": 12, "times": "3", "ratio": "0.5", "loud": "true"}),
            )
            .unwrap();
        assert_eq!(args["text"], json!("12"));
        assert_eq!(args["times"], json!(3));
        assert_eq!(args["ratio"], json!(0.5));
        assert_eq!(args["loud"], json!(true));
    }

    #[test]
    fn test_validate_missing_required() {
        let reg = registry();
        let err = reg.validate_arguments(&EchoTool, &json!({"times": 2})).unwrap_err();
        match err {
            RegistryError::InvalidArguments { tool, reason } => {
                assert_eq!(tool, "echo");
                assert!(reason.contains("text"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_validate_null_required_is_missing() {
        let reg = registry();
        assert!(reg.validate_arguments(&EchoTool, &json!({"text": null})).is_err());
    }

    #[test]
    fn test_validate_null_optional_dropped() {
        let reg = registry();
        let args = reg
            .validate_arguments(&EchoTool, &json!({"text": "a", "times": null}))
            .unwrap();
        assert!(!args.contains_key("times"));
    }

    #[test]
    fn test_validate_rejects_non_object_and_bad_kinds() {
        let reg = registry();
        assert!(reg.validate_arguments(&EchoTool, &json!("text=hi")).is_err());
        assert!(reg.validate_arguments(&EchoTool, &json!({"text": ["a"]})).is_err());
        assert!(reg.validate_arguments(&EchoTool, &json!({"text": "a", "times": "many"})).is_err());
        assert!(reg.validate_arguments(&EchoTool, &json!({"text": "a", "times": 1.5})).is_err());
        assert!(reg.validate_arguments(&EchoTool, &json!({"text": "a", "loud": "yes"})).is_err());
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let reg = registry();
        let args = reg.validate_arguments(&EchoTool, &json!({"text": "hello"})).unwrap();
        let result = reg.invoke(&EchoTool, args).await;
        assert_eq!(result.get("echo"), Some(&json!("hello")));
    }

    #[tokio::test]
    async fn test_invoke_error_caught() {
        let reg = ToolRegistry::new();
        let result = reg.invoke(&FailTool, ToolArgs::new()).await;
        match result {
            ToolResult::Error { error, details } => {
                assert!(error.contains("fail"));
                assert!(details.contains("intentional failure"));
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invoke_timeout_becomes_error() {
        let reg = ToolRegistry::with_timeout(Duration::from_millis(20));
        let result = reg.invoke(&SlowTool, ToolArgs::new()).await;
        assert!(result.is_error());
    }

    #[test]
    fn test_default() {
        let reg = ToolRegistry::default();
        assert!(reg.is_empty());
    }
}
