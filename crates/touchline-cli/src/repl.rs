//! Interactive REPL — drives an `InteractiveSession` with `rustyline`.

use std::sync::Arc;

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use touchline_agent::session::is_exit_command;
use touchline_agent::{InteractiveSession, LineOutcome, Orchestrator};
use touchline_core::utils::get_history_path;

use crate::helpers;

/// Run the interactive REPL loop until quit, Ctrl-C or Ctrl-D.
pub async fn run(orchestrator: Arc<Orchestrator>) -> Result<()> {
    let agent_name = orchestrator.profile().name.clone();
    helpers::print_banner(&agent_name);

    let mut session = InteractiveSession::new(orchestrator);
    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let busy = !input.trim().is_empty() && !is_exit_command(&input);
        if busy {
            helpers::print_thinking();
        }
        let outcome = session.handle_line(&input).await;
        if busy {
            helpers::clear_thinking();
        }

        match outcome {
            LineOutcome::Quit => {
                println!("\nSee you on the touchline! 👋");
                break;
            }
            LineOutcome::Skip => continue,
            LineOutcome::Answered(answer) => {
                let _ = editor.add_history_entry(input.trim());
                helpers::print_response(&agent_name, &answer);
            }
        }
    }

    debug!(turns = session.conversation().len(), "session ended");
    save_history(&mut editor);
    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    get_history_path().join("cli_history")
}
