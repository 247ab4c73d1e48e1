//! Errors surfaced by an orchestration cycle.

use thiserror::Error;

use touchline_providers::ProviderError;

/// Why a cycle ended without a usable answer.
///
/// Carried inside `FinalAnswer::Failed`; never returned as an `Err`.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TurnError {
    #[error("the assistant asked for an unknown tool '{0}'")]
    UnknownTool(String),

    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("no final answer after {0} tool rounds")]
    RoundBudgetExceeded(u32),
}

/// Construction-time errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("maxToolRounds must be at least 1")]
    InvalidRoundBudget,

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}
