//! Completion provider layer for Touchline.
//!
//! # Architecture
//!
//! - [`traits::CompletionProvider`] — the decision interface the orchestrator drives
//! - [`wire`] — OpenAI chat-completions request/response types and turn mapping
//! - [`http_provider::HttpProvider`] — OpenAI-compatible HTTP implementation
//! - [`http_provider::create_provider`] — convenience builder from config

pub mod http_provider;
pub mod traits;
pub mod wire;

pub use http_provider::{create_provider, HttpProvider};
pub use traits::{
    CompletionProvider, DecideRequest, Decision, OutputMode, ProviderError, ToolChoice,
};
