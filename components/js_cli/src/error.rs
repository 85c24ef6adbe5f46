//! Error types for the CLI

use orchestrator::SessionError;
use rustyline::error::ReadlineError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read or written
    #[error("could not access '{path}': {source}")]
    Io {
        /// The file in question
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Session loading or recovery failed
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The history could not be written
    #[error("could not encode history: {0}")]
    Encode(#[from] serde_json::Error),

    /// The line editor failed
    #[error("readline error: {0}")]
    Readline(#[from] ReadlineError),
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
