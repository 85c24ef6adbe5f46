//! JavaScript error descriptions.
//!
//! Errors thrown by user code are captured as an [`ErrorInfo`]: the
//! constructor name and the message, which is all the REPL displays.

use std::fmt;

/// The kind of JavaScript error.
///
/// These correspond to JavaScript's built-in error constructors; anything
/// else (user-defined subclasses, thrown non-errors) is [`ErrorKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Syntax error in JavaScript code
    SyntaxError,
    /// Type error (e.g., calling a non-function)
    TypeError,
    /// Reference to an undefined variable
    ReferenceError,
    /// Value out of allowed range
    RangeError,
    /// Error in eval() function
    EvalError,
    /// Error in URI handling functions
    URIError,
    /// Plain `Error`
    Error,
    /// Any other error name
    Other,
}

impl ErrorKind {
    /// Maps an error constructor name to its kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::from_name("TypeError"), ErrorKind::TypeError);
    /// assert_eq!(ErrorKind::from_name("HttpError"), ErrorKind::Other);
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name {
            "SyntaxError" => ErrorKind::SyntaxError,
            "TypeError" => ErrorKind::TypeError,
            "ReferenceError" => ErrorKind::ReferenceError,
            "RangeError" => ErrorKind::RangeError,
            "EvalError" => ErrorKind::EvalError,
            "URIError" => ErrorKind::URIError,
            "Error" => ErrorKind::Error,
            _ => ErrorKind::Other,
        }
    }
}

/// A JavaScript error as shown to the user: `Name: message`.
///
/// # Examples
///
/// ```
/// use core_types::ErrorInfo;
///
/// let error = ErrorInfo::new("TypeError", "x is not a function");
/// assert_eq!(error.to_string(), "TypeError: x is not a function");
/// assert!(!error.is_syntax());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error constructor name, e.g. `TypeError`
    pub name: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorInfo {
    /// Creates an error description from a name and message.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns the kind matching this error's name.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_name(&self.name)
    }

    /// Returns true if this is a `SyntaxError`.
    pub fn is_syntax(&self) -> bool {
        self.kind() == ErrorKind::SyntaxError
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

impl std::error::Error for ErrorInfo {}
