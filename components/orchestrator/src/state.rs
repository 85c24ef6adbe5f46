//! Session state shared with other threads.

use async_runtime::AbortToken;
use core_types::{HistorySink, OutputVariant, EXECUTION_CANCELLED};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Ready for a submission (or not loaded yet)
    Idle,
    /// Creating the engine context and probing the CDN
    Loading,
    /// A submission is running
    Executing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::Executing => "executing",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct Shared {
    state: SessionState,
    show_executing: bool,
    token: Option<AbortToken>,
}

/// Thread-safe handle to a session: state inspection and abort.
///
/// The session itself is bound to the thread running its engine; the
/// controller can be cloned into signal handlers or UI threads.
///
/// # Examples
///
/// ```
/// use core_types::MemoryHistory;
/// use orchestrator::{SessionController, SessionState};
/// use std::sync::Arc;
///
/// let history = MemoryHistory::new();
/// let controller = SessionController::new(Arc::new(history.clone()));
/// assert_eq!(controller.state(), SessionState::Idle);
///
/// // Nothing in flight: aborting does nothing.
/// controller.abort();
/// assert!(history.is_empty());
/// ```
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Mutex<Shared>>,
    history: Arc<dyn HistorySink>,
}

impl SessionController {
    /// Creates a controller reporting aborts to `history`.
    pub fn new(history: Arc<dyn HistorySink>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state: SessionState::Idle,
                show_executing: false,
                token: None,
            })),
            history,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.shared.lock().state
    }

    /// Whether the executing indicator should be shown.
    pub fn show_executing(&self) -> bool {
        self.shared.lock().show_executing
    }

    /// Aborts the submission in flight, if any.
    ///
    /// Emits one info `Execution cancelled` entry per aborted submission.
    /// Further calls do nothing until the next submission starts.
    pub fn abort(&self) {
        let token = self.shared.lock().token.take();
        if let Some(token) = token {
            if token.abort() {
                info!(token = token.id(), "execution aborted");
                self.history
                    .append_output(OutputVariant::Info, EXECUTION_CANCELLED);
            }
        }
    }

    pub(crate) fn set_state(&self, state: SessionState) {
        self.shared.lock().state = state;
    }

    /// Enters `Executing` with a fresh token, unless not idle.
    pub(crate) fn begin_execution(&self) -> Option<AbortToken> {
        let mut shared = self.shared.lock();
        if shared.state != SessionState::Idle {
            return None;
        }
        let token = AbortToken::new();
        shared.state = SessionState::Executing;
        shared.show_executing = false;
        shared.token = Some(token.clone());
        Some(token)
    }

    pub(crate) fn grace_elapsed(&self, token: &AbortToken) {
        let mut shared = self.shared.lock();
        if shared.token.as_ref().is_some_and(|current| current.same_as(token)) {
            shared.show_executing = true;
        }
    }

    pub(crate) fn end_execution(&self) {
        let mut shared = self.shared.lock();
        shared.state = SessionState::Idle;
        shared.show_executing = false;
        shared.token = None;
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("shared", &*self.shared.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{HistoryEntry, MemoryHistory};

    fn controller() -> (SessionController, MemoryHistory) {
        let history = MemoryHistory::new();
        (SessionController::new(Arc::new(history.clone())), history)
    }

    #[test]
    fn test_abort_emits_once_per_execution() {
        let (controller, history) = controller();
        let token = controller.begin_execution().unwrap();

        controller.abort();
        controller.abort();

        assert!(token.is_aborted());
        assert_eq!(
            history.entries(),
            vec![HistoryEntry::output(OutputVariant::Info, EXECUTION_CANCELLED)]
        );
    }

    #[test]
    fn test_old_token_is_not_reused() {
        let (controller, _) = controller();
        let first = controller.begin_execution().unwrap();
        controller.end_execution();
        let second = controller.begin_execution().unwrap();

        controller.abort();

        assert!(!first.is_aborted());
        assert!(second.is_aborted());
    }

    #[test]
    fn test_begin_requires_idle() {
        let (controller, _) = controller();
        assert!(controller.begin_execution().is_some());
        assert!(controller.begin_execution().is_none());
        controller.end_execution();
        controller.set_state(SessionState::Loading);
        assert!(controller.begin_execution().is_none());
    }

    #[test]
    fn test_grace_latch_ignores_stale_tokens() {
        let (controller, _) = controller();
        let stale = controller.begin_execution().unwrap();
        controller.end_execution();
        let _current = controller.begin_execution().unwrap();

        controller.grace_elapsed(&stale);
        assert!(!controller.show_executing());

        controller.end_execution();
        assert!(!controller.show_executing());
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[test]
    fn test_controller_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SessionController>();
    }
}
