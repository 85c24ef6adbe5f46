//! Execution errors.

use core_types::{ErrorInfo, EXECUTION_CANCELLED};
use module_resolver::RewriteError;
use parser::ParseError;
use thiserror::Error;

/// Why a submission produced no result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// The submission threw (or failed to compile in the engine)
    #[error("{0}")]
    Thrown(ErrorInfo),
    /// The submission could not be tokenized
    #[error("SyntaxError: {0}")]
    Syntax(#[from] ParseError),
    /// The submission was aborted before it finished
    #[error("{}", EXECUTION_CANCELLED)]
    Cancelled,
}

impl ExecutionError {
    /// The error as shown in the history.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::ErrorInfo;
    /// use interpreter::ExecutionError;
    ///
    /// let error = ExecutionError::Thrown(ErrorInfo::new("RangeError", "bad"));
    /// assert_eq!(error.error_info().to_string(), "RangeError: bad");
    /// assert_eq!(ExecutionError::Cancelled.error_info().message, "Execution cancelled");
    /// ```
    pub fn error_info(&self) -> ErrorInfo {
        match self {
            ExecutionError::Thrown(info) => info.clone(),
            ExecutionError::Syntax(error) => error.to_error_info(),
            ExecutionError::Cancelled => ErrorInfo::new("Error", EXECUTION_CANCELLED),
        }
    }

    /// Returns true for the cancellation sentinel.
    pub fn is_cancellation(&self) -> bool {
        match self {
            ExecutionError::Cancelled => true,
            ExecutionError::Thrown(info) => info.message == EXECUTION_CANCELLED,
            ExecutionError::Syntax(_) => false,
        }
    }

    /// Returns true if this is a `SyntaxError` of either origin.
    pub fn is_syntax(&self) -> bool {
        match self {
            ExecutionError::Thrown(info) => info.is_syntax(),
            ExecutionError::Syntax(_) => true,
            ExecutionError::Cancelled => false,
        }
    }
}

impl From<RewriteError> for ExecutionError {
    fn from(error: RewriteError) -> Self {
        match error {
            RewriteError::Parse(error) => ExecutionError::Syntax(error),
        }
    }
}

impl From<ErrorInfo> for ExecutionError {
    fn from(info: ErrorInfo) -> Self {
        ExecutionError::Thrown(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::SourcePosition;

    #[test]
    fn test_parse_errors_are_syntax_errors() {
        let error = ExecutionError::from(ParseError::UnterminatedString {
            position: SourcePosition::start(),
        });
        assert!(error.is_syntax());
        assert_eq!(error.error_info().name, "SyntaxError");
    }

    #[test]
    fn test_cancellation_sentinel() {
        assert!(ExecutionError::Cancelled.is_cancellation());
        assert!(ExecutionError::Thrown(ErrorInfo::new("Error", EXECUTION_CANCELLED)).is_cancellation());
        assert!(!ExecutionError::Thrown(ErrorInfo::new("Error", "other")).is_cancellation());
    }
}
