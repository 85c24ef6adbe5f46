//! Parser error types

use core_types::{ErrorInfo, SourcePosition};
use thiserror::Error;

/// A syntax error found while tokenizing a submission.
///
/// Only errors the statement analysis cannot work around are reported here;
/// everything else is left for the engine to diagnose.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A string literal reached a line break or the end of input
    #[error("Unterminated string literal ({position})")]
    UnterminatedString {
        /// Position of the opening quote
        position: SourcePosition,
    },
    /// A template literal reached the end of input
    #[error("Unterminated template literal ({position})")]
    UnterminatedTemplate {
        /// Position of the opening backtick
        position: SourcePosition,
    },
    /// A block comment reached the end of input
    #[error("Unterminated comment ({position})")]
    UnterminatedComment {
        /// Position of the opening `/*`
        position: SourcePosition,
    },
    /// A regular expression literal reached a line break or the end of input
    #[error("Invalid regular expression: missing / ({position})")]
    UnterminatedRegExp {
        /// Position of the opening slash
        position: SourcePosition,
    },
}

impl ParseError {
    /// Where the offending literal starts.
    pub fn position(&self) -> SourcePosition {
        match self {
            ParseError::UnterminatedString { position }
            | ParseError::UnterminatedTemplate { position }
            | ParseError::UnterminatedComment { position }
            | ParseError::UnterminatedRegExp { position } => *position,
        }
    }

    /// Returns true if more input could complete the source.
    ///
    /// Templates and block comments may span lines; strings and regular
    /// expressions may not.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            ParseError::UnterminatedTemplate { .. } | ParseError::UnterminatedComment { .. }
        )
    }

    /// Converts the error into the `SyntaxError` shown to the user.
    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo::new("SyntaxError", self.to_string())
    }
}
