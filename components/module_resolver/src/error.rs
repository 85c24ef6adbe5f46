//! Error types for module rewriting and loading.

use parser::ParseError;
use thiserror::Error;

/// Failure to rewrite a submission's module syntax.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RewriteError {
    /// The submission could not be tokenized
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failure to fetch a module's source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The specifier could not be turned into a URL
    #[error("cannot resolve '{specifier}'")]
    Unresolvable {
        /// The specifier as written
        specifier: String,
    },
    /// Transport-level failure
    #[error("{url}: {source}")]
    Http {
        /// The requested URL
        url: String,
        /// The underlying client error
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status
    #[error("{url}: HTTP {status}")]
    Status {
        /// The requested URL
        url: String,
        /// The response status code
        status: u16,
    },
    /// The fetch thread did not report back
    #[error("{url}: fetch interrupted")]
    Interrupted {
        /// The requested URL
        url: String,
    },
}

impl FetchError {
    /// The message surfaced to user code as a `TypeError`.
    pub fn js_message(&self) -> String {
        format!("Failed to fetch module {}", self)
    }
}
