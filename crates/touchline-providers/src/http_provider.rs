//! HTTP completion provider for OpenAI-compatible APIs.
//!
//! Talks directly to any `/chat/completions` endpoint; the base URL and model
//! come from `ProviderConfig`, so proxies and self-hosted gateways work too.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use touchline_core::config::ProviderConfig;

use crate::traits::{CompletionProvider, DecideRequest, Decision, OutputMode, ProviderError, ToolChoice};
use crate::wire::{build_messages, ChatCompletionRequest, ChatCompletionResponse, ResponseFormat};

/// Request timeout used by [`HttpProvider::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A completion provider that talks to an OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    /// Whole-request bound, reported as `ProviderError::Timeout` when hit.
    timeout: Duration,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpProvider {
    /// Create a provider from config with [`DEFAULT_REQUEST_TIMEOUT`].
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Self::with_timeout(config, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a provider whose requests are bounded by `timeout`.
    /// Fails only if the HTTP client cannot be built.
    pub fn with_timeout(config: &ProviderConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpProvider {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Http(e.to_string())
        }
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    fn build_request(&self, request: &DecideRequest<'_>) -> ChatCompletionRequest {
        let has_tools = !request.tools.is_empty();
        let tool_choice = match request.tool_choice {
            ToolChoice::Auto => "auto",
            ToolChoice::None => "none",
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: build_messages(request.instructions, request.conversation, request.output),
            tools: has_tools.then(|| request.tools.to_vec()),
            tool_choice: has_tools.then(|| tool_choice.to_string()),
            parallel_tool_calls: has_tools.then_some(false),
            response_format: (request.output == OutputMode::Json).then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        }
    }
}

#[async_trait]
impl CompletionProvider for HttpProvider {
    async fn decide(&self, request: DecideRequest<'_>) -> Result<Decision, ProviderError> {
        debug!(
            model = %self.model,
            turns = request.conversation.len(),
            tools = request.tools.len(),
            tool_choice = ?request.tool_choice,
            output = ?request.output,
            "Calling provider"
        );

        let body = self.build_request(&request);
        let url = self.completions_url();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                self.transport_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %error_text, "API error");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let chat_resp = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "Failed to read provider response");
            if e.is_timeout() {
                ProviderError::Timeout(self.timeout)
            } else {
                ProviderError::Parse(e.to_string())
            }
        })?;

        if let Some(usage) = &chat_resp.usage {
            debug!(total_tokens = usage.total_tokens, "Provider usage");
        }

        let decision = chat_resp.into_decision(request.output)?;
        debug!(
            tool_call = matches!(decision, Decision::CallTool(_)),
            "Provider decision received"
        );
        Ok(decision)
    }

    fn display_name(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build an `HttpProvider` from config, refusing when no API key is set.
/// `timeout` bounds each request; pass the orchestrator's provider timeout.
pub fn create_provider(config: &ProviderConfig, timeout: Duration) -> Result<HttpProvider, ProviderError> {
    if !config.is_configured() {
        return Err(ProviderError::NotConfigured(
            "no API key set. Add provider.apiKey to the config or export OPENAI_API_KEY".into(),
        ));
    }

    debug!(model = %config.model, api_base = %config.api_base, "Creating completion provider");
    HttpProvider::with_timeout(config, timeout)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
