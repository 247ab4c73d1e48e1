//! `touchline serve` — agent card discovery and the skill endpoint.
//!
//! Routes:
//! - `GET /.well-known/agent.json` — the static agent card
//! - `GET /health` — liveness probe
//! - `POST /skills/check_team_spaces` — only when a provider is configured

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use touchline_agent::skills::{check_team_spaces, CHECK_TEAM_SPACES};
use touchline_agent::Orchestrator;
use touchline_core::config::ServerConfig;

/// Card shipped with the binary; `touchline init` writes it out.
pub const DEFAULT_AGENT_CARD: &str = include_str!("../../../agent.json");

/// State shared across handlers.
pub struct AppState {
    card: Value,
    orchestrator: Option<Arc<Orchestrator>>,
}

impl AppState {
    pub fn new(card: Value, orchestrator: Option<Arc<Orchestrator>>) -> Self {
        Self { card, orchestrator }
    }
}

type SharedState = Arc<AppState>;

/// Read the agent card. A missing file or invalid JSON is fatal.
pub fn load_agent_card(path: &Path) -> Result<Value> {
    if !path.exists() {
        bail!(
            "agent card not found at {}. Run `touchline init` or set server.agentCardPath",
            path.display()
        );
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read agent card {}", path.display()))?;
    let card: Value = serde_json::from_str(&content)
        .with_context(|| format!("agent card {} is not valid JSON", path.display()))?;
    if !card.is_object() {
        bail!("agent card {} must be a JSON object", path.display());
    }
    Ok(card)
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/.well-known/agent.json", get(agent_card))
        .route("/health", get(health));

    if state.orchestrator.is_some() {
        app = app.route(
            &format!("/skills/{CHECK_TEAM_SPACES}"),
            post(check_team_spaces_skill),
        );
    }

    app.with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until interrupted.
pub async fn run(config: &ServerConfig, card: Value, orchestrator: Option<Arc<Orchestrator>>) -> Result<()> {
    if orchestrator.is_none() {
        warn!("no provider configured, skill endpoint disabled");
    }

    let app = router(AppState::new(card, orchestrator));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);
    println!("  Listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

// ─────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────

async fn agent_card(State(state): State<SharedState>) -> Json<Value> {
    Json(state.card.clone())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn check_team_spaces_skill(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Json<Value> {
    let Some(orchestrator) = state.orchestrator.as_ref() else {
        return Json(json!({
            "error": "Skill unavailable",
            "details": "no completion provider is configured",
        }));
    };

    // Malformed bodies still get a JSON reply.
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected skill request body");
            return Json(json!({
                "error": "Invalid skill input",
                "details": rejection.body_text(),
            }));
        }
    };

    let team_name = body.get("team_name").and_then(Value::as_str).unwrap_or_default();
    Json(check_team_spaces(orchestrator, team_name).await)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
