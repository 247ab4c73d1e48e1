//! Touchline CLI — entry point.
//!
//! # Commands
//!
//! - `touchline chat` — interactive session
//! - `touchline ask -m MESSAGE` — single question
//! - `touchline skill --team-name NAME` — run the `check_team_spaces` skill
//! - `touchline serve` — agent card + skill HTTP server
//! - `touchline init` — write default config and agent card
//! - `touchline status` — show configuration state

mod helpers;
mod init;
mod repl;
mod server;
mod status;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use touchline_agent::skills::check_team_spaces;
use touchline_agent::tools::{club_registry, AirtableLookupService, TeamRoster};
use touchline_agent::{AgentProfile, Orchestrator, OrchestratorConfig};
use touchline_core::config::{load_config, Config};
use touchline_core::Conversation;
use touchline_providers::create_provider;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// ⚽ Touchline — front-door assistant for Urmston Town Juniors FC
#[derive(Parser)]
#[command(name = "touchline", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.touchline/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the orchestrator interactively
    Chat {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question
        #[arg(short, long)]
        message: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Run the check_team_spaces skill and print its JSON
    Skill {
        /// Team to check, e.g. "U10 Tigers"
        #[arg(long)]
        team_name: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Serve the agent card and skill endpoint over HTTP
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,

        /// Override server.port
        #[arg(long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write the default config and agent card
    Init,

    /// Show configuration state
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Chat { logs } => {
            init_logging(logs);
            let orchestrator = build_orchestrator(&load_config(config_path))?;
            repl::run(orchestrator).await
        }
        Commands::Ask { message, logs } => {
            init_logging(logs);
            run_ask(&load_config(config_path), &message).await
        }
        Commands::Skill { team_name, logs } => {
            init_logging(logs);
            let orchestrator = build_orchestrator(&load_config(config_path))?;
            helpers::print_json(&check_team_spaces(&orchestrator, &team_name).await);
            Ok(())
        }
        Commands::Serve { host, port, logs } => {
            init_logging(logs);
            run_serve(load_config(config_path), host, port).await
        }
        Commands::Init => init::run(config_path),
        Commands::Status => status::run(config_path),
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_ask(config: &Config, message: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let mut conversation = Conversation::new();

    info!("processing single message");
    let answer = orchestrator.run_turn(&mut conversation, message).await;
    helpers::print_response(&orchestrator.profile().name, &answer);
    Ok(())
}

async fn run_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let card_path = helpers::expand_tilde(&config.server.agent_card_path);
    let card = server::load_agent_card(&card_path)?;

    let orchestrator = if config.provider.is_configured() {
        Some(build_orchestrator(&config)?)
    } else {
        None
    };

    helpers::print_banner(&config.agent.name);
    server::run(&config.server, card, orchestrator).await
}

/// Build the orchestrator, its provider and the club tools from config.
pub fn build_orchestrator(config: &Config) -> Result<Arc<Orchestrator>> {
    let provider = create_provider(
        &config.provider,
        Duration::from_secs(config.agent.provider_timeout_secs),
    )?;

    let roster = load_roster(config.teams.roster_path.as_deref())?;
    let lookup = AirtableLookupService::new(&config.lookup)?;
    let registry = club_registry(
        Arc::new(roster),
        Arc::new(lookup),
        Duration::from_secs(config.agent.tool_timeout_secs),
    )?;

    let orchestrator = Orchestrator::new(
        Arc::new(provider),
        Arc::new(registry),
        AgentProfile::from(&config.agent),
        OrchestratorConfig::from(&config.agent),
    )?;

    Ok(Arc::new(orchestrator))
}

fn load_roster(path: Option<&str>) -> Result<TeamRoster> {
    match path {
        Some(path) => {
            let path = helpers::expand_tilde(path);
            TeamRoster::from_json_file(&path)
                .with_context(|| format!("failed to load roster {}", path.display()))
        }
        None => Ok(TeamRoster::builtin()),
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("touchline=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
