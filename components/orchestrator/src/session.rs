//! The REPL session: loading, executing, aborting and recovering.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::meta::{MetaCommand, HELP};
use crate::recovery::{plan_recovery, RecoveryStep};
use crate::state::{SessionController, SessionState};
use builtins::ConsoleCapture;
use core_types::{ErrorInfo, HistoryEntry, HistorySink, OutputVariant, Value};
use interpreter::{ExecutionEngine, ExecutionError, Sandbox, SandboxOptions};
use module_resolver::{select_host, ModuleSource};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What became of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// Blank input, a session that is not loaded, or one already executing
    Ignored,
    /// Handled as a meta-command
    Command,
    /// Ran to completion, with the trailing expression's value if any
    Completed(Option<Value>),
    /// Threw; the error was appended to the history
    Failed(ErrorInfo),
    /// Aborted before it finished
    Cancelled,
}

/// Summary of a [`Session::recover`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Submissions run again
    pub reexecuted: usize,
    /// Entries appended as recorded
    pub replayed: usize,
}

/// One REPL instance.
///
/// The session owns the engine and is bound to the thread that runs it
/// (drive it from a current-thread `tokio` runtime). Use
/// [`Session::controller`] to abort or observe it from elsewhere.
///
/// # Examples
///
/// ```
/// use core_types::{HistoryEntry, MemoryHistory, OutputVariant};
/// use orchestrator::{Session, SessionConfig};
/// use std::sync::Arc;
///
/// let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
/// let history = MemoryHistory::new();
/// let mut config = SessionConfig::default();
/// config.cdn.probe = false;
/// let mut session = Session::new(config, Arc::new(history.clone()));
///
/// runtime.block_on(async {
///     session.load().await.unwrap();
///     session.execute("const a = 10;").await;
///     session.execute("a * 2").await;
/// });
///
/// assert_eq!(
///     history.entries(),
///     vec![
///         HistoryEntry::input("const a = 10;"),
///         HistoryEntry::input("a * 2"),
///         HistoryEntry::output(OutputVariant::Info, "20"),
///     ]
/// );
/// ```
pub struct Session {
    config: SessionConfig,
    history: Arc<dyn HistorySink>,
    console: Rc<ConsoleCapture>,
    controller: SessionController,
    engine: Option<ExecutionEngine>,
}

impl Session {
    /// Creates an unloaded session writing to `history`.
    pub fn new(config: SessionConfig, history: Arc<dyn HistorySink>) -> Self {
        Self {
            console: Rc::new(ConsoleCapture::new(history.clone())),
            controller: SessionController::new(history.clone()),
            config,
            history,
            engine: None,
        }
    }

    /// A thread-safe handle for aborting and observing the session.
    pub fn controller(&self) -> SessionController {
        self.controller.clone()
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.controller.state()
    }

    /// Whether the engine context exists.
    pub fn is_loaded(&self) -> bool {
        self.engine.is_some()
    }

    /// The configuration the session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Names currently bound, in declaration order.
    pub fn binding_names(&self) -> Vec<String> {
        self.engine
            .as_ref()
            .map(|engine| engine.bindings().names())
            .unwrap_or_default()
    }

    /// Creates the engine context, probing the CDN first.
    ///
    /// Does nothing if the session is already loaded.
    pub async fn load(&mut self) -> Result<(), SessionError> {
        if self.engine.is_some() || self.state() != SessionState::Idle {
            return Ok(());
        }
        self.controller.set_state(SessionState::Loading);
        let host = select_host(&self.config.cdn).await;
        info!(%host, "loading sandbox");
        let options = self.sandbox_options(host);
        let sandbox = Sandbox::new(&options);
        self.install(sandbox, &options.cdn_host)
    }

    /// Creates the engine context with modules served by `source`.
    ///
    /// No probe is made; imports resolve against the primary host.
    pub fn load_with_source<S: ModuleSource + 'static>(&mut self, source: S) -> Result<(), SessionError> {
        if self.engine.is_some() || self.state() != SessionState::Idle {
            return Ok(());
        }
        self.controller.set_state(SessionState::Loading);
        let options = self.sandbox_options(self.config.cdn.primary_host.clone());
        let sandbox = Sandbox::with_source(&options, source);
        self.install(sandbox, &options.cdn_host)
    }

    fn sandbox_options(&self, cdn_host: String) -> SandboxOptions {
        SandboxOptions {
            cdn_host,
            inspect_depth: self.config.inspect_depth,
        }
    }

    fn install(&mut self, sandbox: Result<Sandbox, ExecutionError>, cdn_host: &str) -> Result<(), SessionError> {
        let sandbox = match sandbox {
            Ok(sandbox) => sandbox,
            Err(error) => {
                warn!(%error, "sandbox creation failed");
                self.controller.set_state(SessionState::Idle);
                return Err(SessionError::Load(error));
            }
        };
        sandbox.set_listener(self.console.clone());
        let engine = ExecutionEngine::new(sandbox, cdn_host).with_poll_interval(self.config.poll_interval);
        self.engine = Some(engine);
        self.controller.set_state(SessionState::Idle);
        debug!("session loaded");
        Ok(())
    }

    /// Runs one submission and records it in the history.
    ///
    /// Blank input, an unloaded session or one already executing make this
    /// a no-op. Inputs starting with `:` are meta-commands.
    pub async fn execute(&mut self, code: &str) -> ExecutionOutcome {
        if code.trim().is_empty() {
            return ExecutionOutcome::Ignored;
        }
        let Some(engine) = self.engine.as_mut() else {
            debug!("execute before load ignored");
            return ExecutionOutcome::Ignored;
        };
        let Some(token) = self.controller.begin_execution() else {
            debug!("execute while busy ignored");
            return ExecutionOutcome::Ignored;
        };
        self.history.append_input(code);

        if let Some(command) = MetaCommand::parse(code) {
            self.controller.end_execution();
            self.run_command(command);
            return ExecutionOutcome::Command;
        }

        let result = {
            let run = engine.execute_abortable(code, &token);
            tokio::pin!(run);
            let grace = tokio::time::sleep(self.config.grace_period);
            tokio::pin!(grace);
            let mut grace_pending = true;
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break Err(ExecutionError::Cancelled),
                    result = &mut run => break result,
                    _ = &mut grace, if grace_pending => {
                        grace_pending = false;
                        self.controller.grace_elapsed(&token);
                    }
                }
            }
        };
        self.controller.end_execution();

        // An abort that landed while synchronous code ran wins over its outcome.
        let result = if token.is_aborted() {
            Err(ExecutionError::Cancelled)
        } else {
            result
        };

        match result {
            Ok(value) => {
                if let Some(value) = &value {
                    self.history
                        .append_output(OutputVariant::Info, &value.to_string());
                }
                ExecutionOutcome::Completed(value)
            }
            Err(error) if error.is_cancellation() => {
                debug!("execution cancelled");
                ExecutionOutcome::Cancelled
            }
            Err(error) => {
                let info = error.error_info();
                debug!(%info, "execution failed");
                self.history.append_error(&info);
                ExecutionOutcome::Failed(info)
            }
        }
    }

    fn run_command(&mut self, command: MetaCommand) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        match command {
            MetaCommand::Help => self.history.append_output(OutputVariant::Info, HELP),
            MetaCommand::Clear => {
                self.history.clear();
            }
            MetaCommand::Bindings => {
                let names = engine.bindings().names();
                let text = if names.is_empty() {
                    "(no bindings)".to_string()
                } else {
                    names.join(", ")
                };
                self.history.append_output(OutputVariant::Info, &text);
            }
            MetaCommand::Type(name) => match engine.describe_binding(&name) {
                Some(value) => {
                    let text = format!("{}: {}", name, value.describe_type());
                    self.history.append_output(OutputVariant::Info, &text);
                }
                None => self
                    .history
                    .append_error(&ErrorInfo::new("ReferenceError", format!("{} is not defined", name))),
            },
            MetaCommand::Reset => {
                engine.reset();
                self.console.reset();
                self.history
                    .append_output(OutputVariant::Info, "Bindings cleared");
            }
            MetaCommand::Unknown(command) => self.history.append_error(&ErrorInfo::new(
                "Error",
                format!("Unknown command :{}. Type :help for a list of commands", command),
            )),
        }
    }

    /// Aborts the submission in flight. Same as the controller's abort.
    pub fn abort(&self) {
        self.controller.abort();
    }

    /// Restores a saved history.
    ///
    /// Successful submissions run again one after the other; failed or
    /// cancelled ones and meta-commands are appended as recorded. A
    /// recovered mark closes the restored history.
    pub async fn recover(&mut self, history: &[HistoryEntry]) -> Result<RecoveryReport, SessionError> {
        if self.engine.is_none() {
            return Err(SessionError::NotLoaded);
        }
        let mut report = RecoveryReport::default();
        for step in plan_recovery(history) {
            match step {
                RecoveryStep::Reexecute(code) => {
                    debug!(%code, "re-executing");
                    self.execute(&code).await;
                    report.reexecuted += 1;
                }
                RecoveryStep::Replay(entries) => {
                    report.replayed += entries.len();
                    for entry in entries {
                        self.history.append(entry);
                    }
                }
            }
        }
        self.history.append(HistoryEntry::RecoveredMark);
        info!(reexecuted = report.reexecuted, replayed = report.replayed, "history recovered");
        Ok(report)
    }

    /// Runs due timers and pending jobs between submissions.
    ///
    /// Returns the number of timer callbacks fired.
    pub fn pump(&mut self) -> usize {
        if self.state() != SessionState::Idle {
            return 0;
        }
        self.engine.as_mut().map_or(0, ExecutionEngine::pump)
    }

    /// Earliest pending timer deadline, for front-ends that sleep between pumps.
    pub fn next_timer_deadline(&mut self) -> Option<std::time::Instant> {
        self.engine
            .as_mut()
            .and_then(|engine| engine.sandbox().next_timer_deadline())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("controller", &self.controller)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
