//! Session errors.

use interpreter::ExecutionError;
use thiserror::Error;

/// Errors of session operations that are not submissions.
///
/// Submission failures never surface here; they become history entries.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The engine context could not be created
    #[error("failed to create the sandbox: {0}")]
    Load(#[from] ExecutionError),
    /// The operation needs a loaded session
    #[error("session is not loaded")]
    NotLoaded,
    /// A saved history could not be decoded
    #[error("invalid history: {0}")]
    History(#[from] serde_json::Error),
}
