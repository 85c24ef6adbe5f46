//! Drives a session from the command line arguments.

use crate::cli::Cli;
use crate::error::{CliError, CliResult};
use crate::repl::{execute_interruptible, run_repl};
use crate::terminal::TerminalHistory;
use orchestrator::{parse_history, ExecutionOutcome, Session};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Everything submitted completed
    Success,
    /// The one-shot submission failed or was cancelled
    Failure,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::Failure => ExitCode::FAILURE,
        }
    }
}

/// Loads a session printing to `terminal` and does what `cli` asks:
/// recover a saved history, then run `--eval`, `--file` or the interactive
/// REPL, then save the history.
///
/// Must run on a current-thread runtime.
pub async fn run(cli: &Cli, terminal: Arc<TerminalHistory>) -> CliResult<Status> {
    let mut session = Session::new(cli.session_config(), terminal.clone());
    session.load().await?;

    if let Some(path) = &cli.recover {
        let history = parse_history(&read(path)?)?;
        terminal.set_echo(true);
        let report = session.recover(&history).await;
        terminal.set_echo(false);
        let report = report?;
        info!(reexecuted = report.reexecuted, replayed = report.replayed, "recovered {}", path.display());
    }

    let status = if let Some(code) = &cli.eval {
        submit(&mut session, code).await
    } else if let Some(path) = &cli.file {
        let code = read(path)?;
        submit(&mut session, &code).await
    } else {
        run_repl(&mut session).await?;
        Status::Success
    };

    if !cli.is_interactive() {
        drain_timers(&mut session).await;
    }

    if let Some(path) = &cli.save {
        std::fs::write(path, terminal.to_json()?).map_err(|e| CliError::io(path, e))?;
        debug!("history saved to {}", path.display());
    }

    Ok(status)
}

fn read(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))
}

async fn submit(session: &mut Session, code: &str) -> Status {
    match execute_interruptible(session, code).await {
        ExecutionOutcome::Failed(_) | ExecutionOutcome::Cancelled => Status::Failure,
        _ => Status::Success,
    }
}

/// Keeps firing timers until none are left or Ctrl-C is pressed.
async fn drain_timers(session: &mut Session) {
    while let Some(deadline) = session.next_timer_deadline() {
        let deadline = tokio::time::Instant::from_std(deadline);
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                session.pump();
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
}
