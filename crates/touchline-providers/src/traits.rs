//! Completion provider trait — the reasoning component the orchestrator asks
//! "call a tool, or answer?".
//!
//! The concrete model call is swappable: the HTTP client in `http_provider.rs`
//! covers OpenAI-compatible APIs, and tests drive the loop with scripted
//! providers.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use touchline_core::types::{ToolCallRequest, ToolDefinition, Turn, TurnContent};

/// Whether the provider may pick a tool on this decision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolChoice {
    /// Provider decides between calling a tool and answering.
    #[default]
    Auto,
    /// Provider must answer; used to force finalization.
    None,
}

/// Shape the final answer should take.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Text,
    /// Ask for a single JSON object and surface it as structured content.
    Json,
}

/// Everything the provider sees for one decision.
#[derive(Clone, Copy, Debug)]
pub struct DecideRequest<'a> {
    /// System instructions for the agent.
    pub instructions: &'a str,
    /// Full ordered conversation, oldest first.
    pub conversation: &'a [Turn],
    /// Tools the provider may choose from.
    pub tools: &'a [ToolDefinition],
    pub tool_choice: ToolChoice,
    pub output: OutputMode,
}

/// What the provider decided.
#[derive(Clone, Debug, PartialEq)]
pub enum Decision {
    /// Invoke a tool, then ask again.
    CallTool(ToolCallRequest),
    /// Final answer; `None` when the provider produced nothing.
    Answer(Option<TurnContent>),
}

/// Failure talking to the provider.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ProviderError {
    #[error("provider not configured: {0}")]
    NotConfigured(String),
    #[error("request to provider failed: {0}")]
    Http(String),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not parse provider response: {0}")]
    Parse(String),
    #[error("provider did not respond within {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Trait every completion provider implements.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Decide the next step for the conversation.
    ///
    /// Must not block indefinitely; the orchestrator also bounds the call
    /// with its own timeout.
    async fn decide(&self, request: DecideRequest<'_>) -> Result<Decision, ProviderError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(ToolChoice::default(), ToolChoice::Auto);
        assert_eq!(OutputMode::default(), OutputMode::Text);
    }

    #[test]
    fn test_error_messages() {
        let err = ProviderError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "provider did not respond within 60s");

        let err = ProviderError::Status {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "provider returned 429: rate limited");
    }
}
