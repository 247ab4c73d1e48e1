//! Registration-code lookup: the `LookupService` seam, its Airtable client,
//! and the `validate_registration_code` tool that wraps it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use touchline_core::config::LookupConfig;
use touchline_core::types::ToolResult;

use super::base::{require_string, ParamKind, ParamSpec, Tool, ToolArgs};

const MIN_CODE_LEN: usize = 4;
const MAX_CODE_LEN: usize = 32;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum LookupError {
    #[error("registration records could not be reached: {0}")]
    Unreachable(String),
    #[error("no registration found for code {0}")]
    NotFound(String),
    #[error("'{0}' is not a valid registration code (4-32 letters, digits or '-')")]
    InvalidFormat(String),
    #[error("registration lookup did not respond within {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("unexpected response from registration records: {0}")]
    Unexpected(String),
}

impl LookupError {
    /// Short headline used as the `error` field of the tool result.
    pub fn headline(&self) -> &'static str {
        match self {
            LookupError::Unreachable(_) => "Registration lookup unavailable",
            LookupError::NotFound(_) => "Registration code not found",
            LookupError::InvalidFormat(_) => "Invalid registration code",
            LookupError::Timeout(_) => "Registration lookup timed out",
            LookupError::Unexpected(_) => "Unexpected registration lookup response",
        }
    }
}

/// Result of a successful lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct CodeValidation {
    /// Normalized code that was looked up.
    pub code: String,
    pub valid: bool,
    /// Fields of the matching record.
    pub details: Map<String, Value>,
}

/// Validates registration codes against the club's records.
#[async_trait]
pub trait LookupService: Send + Sync {
    async fn validate(&self, code: &str) -> Result<CodeValidation, LookupError>;
}

/// Trim and upper-case a code, rejecting anything outside the accepted shape.
pub fn normalize_code(code: &str) -> Result<String, LookupError> {
    let trimmed = code.trim();
    let ok_len = (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&trimmed.len());
    let ok_chars = trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if ok_len && ok_chars {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(LookupError::InvalidFormat(trimmed.to_string()))
    }
}

// ─────────────────────────────────────────────
// Airtable client
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RecordList {
    #[serde(default)]
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Looks codes up in an Airtable table.
pub struct AirtableLookupService {
    client: reqwest::Client,
    config: LookupConfig,
}

impl AirtableLookupService {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LookupError::Unexpected(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.base_id,
            self.config.table
        )
    }

    async fn fetch(&self, code: &str) -> Result<RecordList, LookupError> {
        let formula = format!("{{{}}}='{}'", self.config.code_field, code);
        let response = self
            .client
            .get(self.table_url())
            .bearer_auth(&self.config.api_key)
            .query(&[("filterByFormula", formula.as_str()), ("maxRecords", "1")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout(Duration::from_secs(self.config.timeout_secs))
                } else {
                    LookupError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Airtable returned an error");
            return Err(LookupError::Unexpected(format!("HTTP {status}")));
        }

        response
            .json::<RecordList>()
            .await
            .map_err(|e| LookupError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl LookupService for AirtableLookupService {
    async fn validate(&self, code: &str) -> Result<CodeValidation, LookupError> {
        let code = normalize_code(code)?;
        if !self.config.is_configured() {
            return Err(LookupError::Unreachable(
                "the registration records store is not configured".into(),
            ));
        }

        let limit = Duration::from_secs(self.config.timeout_secs);
        let list = tokio::time::timeout(limit, self.fetch(&code))
            .await
            .map_err(|_| LookupError::Timeout(limit))??;

        let record = list
            .records
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound(code.clone()))?;

        let valid = match record.fields.get("status").and_then(Value::as_str) {
            Some(status) => status.eq_ignore_ascii_case("active"),
            None => true,
        };
        debug!(code = %code, valid, "registration code looked up");

        Ok(CodeValidation {
            code,
            valid,
            details: record.fields,
        })
    }
}

// ─────────────────────────────────────────────
// Tool
// ─────────────────────────────────────────────

/// Adapter exposing a `LookupService` to the orchestrator.
pub struct RegistrationCodeTool {
    service: Arc<dyn LookupService>,
}

impl RegistrationCodeTool {
    pub fn new(service: Arc<dyn LookupService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for RegistrationCodeTool {
    fn name(&self) -> &str {
        "validate_registration_code"
    }

    fn description(&self) -> &str {
        "Validate a player registration code against the club's records."
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "code",
            ParamKind::String,
            "The registration code supplied by the parent or player",
        )]
    }

    async fn execute(&self, args: ToolArgs) -> anyhow::Result<ToolResult> {
        let code = require_string(&args, "code")?;

        let result = match self.service.validate(&code).await {
            Ok(validation) => {
                let mut map = validation.details;
                map.insert("code".into(), Value::String(validation.code));
                map.insert("valid".into(), Value::Bool(validation.valid));
                ToolResult::Value(map)
            }
            Err(e) => {
                debug!(error = %e, "registration lookup failed");
                ToolResult::error(e.headline(), e.to_string())
            }
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_base: &str) -> LookupConfig {
        LookupConfig {
            api_key: "pat-test".into(),
            api_base: api_base.into(),
            base_id: "appClub".into(),
            table: "Registrations".into(),
            ..Default::default()
        }
    }

    fn code_args(code: &str) -> ToolArgs {
        let mut args = ToolArgs::new();
        args.insert("code".into(), json!(code));
        args
    }

    /// Scripted lookup service.
    struct FixedLookup(Result<CodeValidation, LookupError>);

    #[async_trait]
    impl LookupService for FixedLookup {
        async fn validate(&self, _code: &str) -> Result<CodeValidation, LookupError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  utj-2024-a1 ").unwrap(), "UTJ-2024-A1");
        assert!(normalize_code("abc").is_err());
        assert!(normalize_code("UTJ 2024").is_err());
        assert!(normalize_code("X'); DROP").is_err());
        assert!(normalize_code(&"A".repeat(33)).is_err());
    }

    #[tokio::test]
    async fn test_adapter_success_merges_details() {
        let mut details = Map::new();
        details.insert("player".into(), json!("Sam"));
        let tool = RegistrationCodeTool::new(Arc::new(FixedLookup(Ok(CodeValidation {
            code: "UTJ-1".into(),
            valid: true,
            details,
        }))));

        let result = tool.execute(code_args("utj-1")).await.unwrap();
        assert_eq!(result.get("code"), Some(&json!("UTJ-1")));
        assert_eq!(result.get("valid"), Some(&json!(true)));
        assert_eq!(result.get("player"), Some(&json!("Sam")));
    }

    #[tokio::test]
    async fn test_adapter_converts_every_lookup_error() {
        let errors = vec![
            LookupError::Unreachable("connection refused".into()),
            LookupError::NotFound("UTJ-9".into()),
            LookupError::InvalidFormat("??".into()),
            LookupError::Timeout(Duration::from_secs(10)),
            LookupError::Unexpected("HTTP 500".into()),
        ];
        for err in errors {
            let tool = RegistrationCodeTool::new(Arc::new(FixedLookup(Err(err.clone()))));
            let result = tool.execute(code_args("UTJ-9")).await.unwrap();
            assert_eq!(result, ToolResult::error(err.headline(), err.to_string()));
        }
    }

    #[tokio::test]
    async fn test_airtable_active_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appClub/Registrations"))
            .and(header("Authorization", "Bearer pat-test"))
            .and(query_param("filterByFormula", "{registration_code}='UTJ-2024'"))
            .and(query_param("maxRecords", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{
                    "id": "rec1",
                    "fields": { "registration_code": "UTJ-2024", "player": "Alex", "status": "Active" }
                }]
            })))
            .mount(&server)
            .await;

        let service = AirtableLookupService::new(&config(&server.uri())).unwrap();
        let validation = service.validate("utj-2024").await.unwrap();
        assert!(validation.valid);
        assert_eq!(validation.code, "UTJ-2024");
        assert_eq!(validation.details["player"], "Alex");
    }

    #[tokio::test]
    async fn test_airtable_inactive_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appClub/Registrations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{ "id": "rec2", "fields": { "status": "Lapsed" } }]
            })))
            .mount(&server)
            .await;

        let service = AirtableLookupService::new(&config(&server.uri())).unwrap();
        assert!(!service.validate("UTJ-2023").await.unwrap().valid);
    }

    #[tokio::test]
    async fn test_airtable_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appClub/Registrations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
            .mount(&server)
            .await;

        let service = AirtableLookupService::new(&config(&server.uri())).unwrap();
        assert_eq!(
            service.validate("UTJ-0000").await.unwrap_err(),
            LookupError::NotFound("UTJ-0000".into())
        );
    }

    #[tokio::test]
    async fn test_airtable_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let service = AirtableLookupService::new(&config(&server.uri())).unwrap();
        assert!(matches!(
            service.validate("UTJ-0001").await,
            Err(LookupError::Unexpected(_))
        ));
    }

    #[tokio::test]
    async fn test_airtable_unreachable() {
        let service = AirtableLookupService::new(&config("http://127.0.0.1:1")).unwrap();
        assert!(matches!(
            service.validate("UTJ-0001").await,
            Err(LookupError::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn test_airtable_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "records": [] }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut cfg = config(&server.uri());
        cfg.timeout_secs = 1;
        let service = AirtableLookupService::new(&cfg).unwrap();
        assert!(matches!(
            service.validate("UTJ-0001").await,
            Err(LookupError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_airtable_not_configured() {
        let service = AirtableLookupService::new(&LookupConfig::default()).unwrap();
        assert!(matches!(
            service.validate("UTJ-0001").await,
            Err(LookupError::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn test_airtable_rejects_bad_format_locally() {
        let service = AirtableLookupService::new(&LookupConfig::default()).unwrap();
        assert!(matches!(
            service.validate("no").await,
            Err(LookupError::InvalidFormat(_))
        ));
    }
}
