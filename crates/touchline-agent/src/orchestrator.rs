//! Orchestrator — the provider ↔ tool decision loop.
//!
//! One call to [`Orchestrator::run_turn`] is one cycle: the user turn is
//! appended, the provider is asked to decide until it answers (or the round
//! budget runs out), and exactly one assistant turn closes the cycle.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use touchline_core::config::AgentConfig;
use touchline_core::types::{ToolDefinition, TurnContent};
use touchline_core::utils::truncate_string;
use touchline_core::Conversation;
use touchline_providers::{
    CompletionProvider, DecideRequest, Decision, OutputMode, ProviderError, ToolChoice,
};

use crate::error::{OrchestratorError, TurnError};
use crate::tools::{RegistryError, ToolRegistry};

/// Assistant text recorded when the provider produced nothing.
pub const NO_RESPONSE_PLACEHOLDER: &str = "[No explicit response generated]";

// ─────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────

/// Who the agent is.
#[derive(Clone, Debug)]
pub struct AgentProfile {
    pub name: String,
    pub instructions: String,
}

impl From<&AgentConfig> for AgentProfile {
    fn from(config: &AgentConfig) -> Self {
        Self {
            name: config.name.clone(),
            instructions: config.instructions.clone(),
        }
    }
}

/// Loop limits.
#[derive(Clone, Copy, Debug)]
pub struct OrchestratorConfig {
    /// Tool rounds allowed per cycle before an answer is forced.
    pub max_tool_rounds: u32,
    /// Bound on a single provider decision.
    pub provider_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

impl From<&AgentConfig> for OrchestratorConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            max_tool_rounds: config.max_tool_rounds,
            provider_timeout: Duration::from_secs(config.provider_timeout_secs),
        }
    }
}

// ─────────────────────────────────────────────
// FinalAnswer
// ─────────────────────────────────────────────

/// Outcome of one cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum FinalAnswer {
    Text(String),
    Structured(Value),
    /// The provider answered with nothing.
    NoResponse,
    /// The cycle ended on an error; the message is still recorded.
    Failed(TurnError),
}

impl FinalAnswer {
    fn from_content(content: Option<TurnContent>) -> Self {
        match content {
            Some(c) if c.is_blank() => FinalAnswer::NoResponse,
            Some(TurnContent::Text(text)) => FinalAnswer::Text(text),
            Some(TurnContent::Structured(value)) => FinalAnswer::Structured(value),
            None => FinalAnswer::NoResponse,
        }
    }

    /// Content recorded as the assistant turn.
    pub fn to_content(&self) -> TurnContent {
        match self {
            FinalAnswer::Text(text) => TurnContent::Text(text.clone()),
            FinalAnswer::Structured(value) => TurnContent::Structured(value.clone()),
            FinalAnswer::NoResponse => TurnContent::Text(NO_RESPONSE_PLACEHOLDER.to_string()),
            FinalAnswer::Failed(e) => {
                TurnContent::Text(format!("An error occurred during execution: {e}"))
            }
        }
    }
}

impl fmt::Display for FinalAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_content().render())
    }
}

// ─────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────

/// Drives one agent over a fixed tool set.
///
/// Shared read-only between sessions; each session brings its own
/// `Conversation`.
pub struct Orchestrator {
    provider: Arc<dyn CompletionProvider>,
    tools: Arc<ToolRegistry>,
    definitions: Vec<ToolDefinition>,
    profile: AgentProfile,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        tools: Arc<ToolRegistry>,
        profile: AgentProfile,
        config: OrchestratorConfig,
    ) -> Result<Self, OrchestratorError> {
        if config.max_tool_rounds == 0 {
            return Err(OrchestratorError::InvalidRoundBudget);
        }
        // A zero bound would fail every decision or tool call immediately.
        if config.provider_timeout.is_zero() {
            return Err(OrchestratorError::ZeroTimeout("providerTimeoutSecs"));
        }
        if tools.tool_timeout().is_zero() {
            return Err(OrchestratorError::ZeroTimeout("toolTimeoutSecs"));
        }

        let definitions = tools.definitions();
        info!(
            agent = %profile.name,
            provider = provider.display_name(),
            tools = definitions.len(),
            max_tool_rounds = config.max_tool_rounds,
            "orchestrator initialized"
        );

        Ok(Self {
            provider,
            tools,
            definitions,
            profile,
            config,
        })
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one cycle, asking for a free-text answer.
    pub async fn run_turn(&self, conversation: &mut Conversation, user_text: &str) -> FinalAnswer {
        self.run_cycle(conversation, user_text, OutputMode::Text).await
    }

    /// Run one cycle, asking for a single JSON object as the answer.
    pub async fn run_structured_turn(
        &self,
        conversation: &mut Conversation,
        user_text: &str,
    ) -> FinalAnswer {
        self.run_cycle(conversation, user_text, OutputMode::Json).await
    }

    async fn run_cycle(
        &self,
        conversation: &mut Conversation,
        user_text: &str,
        output: OutputMode,
    ) -> FinalAnswer {
        conversation.push_user(user_text);
        let answer = self.decide_until_answer(conversation, output).await;

        match &answer {
            FinalAnswer::Failed(e) => warn!(agent = %self.profile.name, error = %e, "cycle failed"),
            FinalAnswer::NoResponse => warn!(agent = %self.profile.name, "provider gave no response"),
            _ => debug!(agent = %self.profile.name, "cycle answered"),
        }

        conversation.push_assistant(answer.to_content());
        answer
    }

    async fn decide_until_answer(
        &self,
        conversation: &mut Conversation,
        output: OutputMode,
    ) -> FinalAnswer {
        let budget = self.config.max_tool_rounds;
        let mut rounds = 0u32;

        loop {
            let tool_choice = if rounds < budget {
                ToolChoice::Auto
            } else {
                ToolChoice::None
            };

            let decision = match self.decide(conversation, tool_choice, output).await {
                Ok(d) => d,
                Err(e) => return FinalAnswer::Failed(TurnError::Provider(e)),
            };

            let call = match decision {
                Decision::Answer(content) => return FinalAnswer::from_content(content),
                Decision::CallTool(call) => call,
            };

            if rounds >= budget {
                warn!(tool = %call.name, rounds, "provider still wants a tool after the budget");
                return FinalAnswer::Failed(TurnError::RoundBudgetExceeded(budget));
            }

            let tool = match self.tools.resolve(&call.name) {
                Ok(t) => t,
                Err(_) => return FinalAnswer::Failed(TurnError::UnknownTool(call.name)),
            };

            let args = match self.tools.validate_arguments(tool.as_ref(), &call.arguments) {
                Ok(a) => a,
                Err(RegistryError::InvalidArguments { tool, reason }) => {
                    return FinalAnswer::Failed(TurnError::InvalidArguments { tool, reason })
                }
                Err(other) => {
                    return FinalAnswer::Failed(TurnError::InvalidArguments {
                        tool: call.name,
                        reason: other.to_string(),
                    })
                }
            };

            info!(tool = %call.name, round = rounds + 1, "executing tool call");
            let result = self.tools.invoke(tool.as_ref(), args).await;
            debug!(
                tool = %call.name,
                result = %truncate_string(&result.to_value().to_string(), 200),
                "tool result"
            );

            conversation.push_tool(call, result);
            rounds += 1;
        }
    }

    async fn decide(
        &self,
        conversation: &Conversation,
        tool_choice: ToolChoice,
        output: OutputMode,
    ) -> Result<Decision, ProviderError> {
        let request = DecideRequest {
            instructions: &self.profile.instructions,
            conversation: conversation.turns(),
            tools: &self.definitions,
            tool_choice,
            output,
        };

        let limit = self.config.provider_timeout;
        tokio::time::timeout(limit, self.provider.decide(request))
            .await
            .map_err(|_| ProviderError::Timeout(limit))?
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
