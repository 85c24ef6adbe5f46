//! REPL (Read-Eval-Print Loop) implementation

use crate::error::CliResult;
use orchestrator::{ExecutionOutcome, Session};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

/// Inputs that leave the REPL instead of being submitted.
const QUIT_COMMANDS: [&str; 2] = [":quit", ":exit"];

/// Runs one submission, aborting it on Ctrl-C.
pub async fn execute_interruptible(session: &mut Session, code: &str) -> ExecutionOutcome {
    let controller = session.controller();
    let execution = session.execute(code);
    tokio::pin!(execution);
    loop {
        tokio::select! {
            outcome = &mut execution => return outcome,
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => controller.abort(),
                Err(error) => {
                    warn!(%error, "cannot listen for Ctrl-C");
                    return execution.await;
                }
            },
        }
    }
}

/// Run the interactive REPL
///
/// Lines accumulate until they form a complete submission; an empty line
/// submits whatever has been typed. Ctrl-C discards a partial submission,
/// Ctrl-D or `:quit` exits. Timers are pumped before every prompt.
pub async fn run_repl(session: &mut Session) -> CliResult<()> {
    let mut editor = DefaultEditor::new()?;

    println!("sandbox-repl {}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for commands, :quit or Ctrl-D to exit.");

    let mut buffer = String::new();
    loop {
        session.pump();
        let prompt = if buffer.is_empty() { "> " } else { "... " };

        match editor.readline(prompt) {
            Ok(line) => {
                if buffer.is_empty() && QUIT_COMMANDS.contains(&line.trim()) {
                    break;
                }
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if !parser::is_complete(&buffer) && !line.trim().is_empty() {
                    continue;
                }
                let code = std::mem::take(&mut buffer);
                if code.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(code.as_str());
                execute_interruptible(session, &code).await;
            }
            Err(ReadlineError::Interrupted) => {
                if buffer.is_empty() {
                    println!("(To exit, press Ctrl-D or type :quit)");
                } else {
                    buffer.clear();
                }
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
