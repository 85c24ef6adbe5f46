//! Unit tests for ErrorInfo and ErrorKind

use core_types::{ErrorInfo, ErrorKind};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_builtin_names_map_to_kinds() {
        assert_eq!(ErrorKind::from_name("SyntaxError"), ErrorKind::SyntaxError);
        assert_eq!(ErrorKind::from_name("TypeError"), ErrorKind::TypeError);
        assert_eq!(ErrorKind::from_name("ReferenceError"), ErrorKind::ReferenceError);
        assert_eq!(ErrorKind::from_name("RangeError"), ErrorKind::RangeError);
        assert_eq!(ErrorKind::from_name("Error"), ErrorKind::Error);
    }

    #[test]
    fn test_custom_names_are_other() {
        assert_eq!(ErrorKind::from_name("ValidationError"), ErrorKind::Other);
        assert_eq!(ErrorKind::from_name("Uncaught"), ErrorKind::Other);
        assert_eq!(ErrorKind::from_name(""), ErrorKind::Other);
    }
}

#[cfg(test)]
mod error_info_tests {
    use super::*;

    #[test]
    fn test_display_name_and_message() {
        let error = ErrorInfo::new("ReferenceError", "y is not defined");
        assert_eq!(error.to_string(), "ReferenceError: y is not defined");
    }

    #[test]
    fn test_uncaught_non_error() {
        let error = ErrorInfo::new("Uncaught", "'boom'");
        assert_eq!(error.to_string(), "Uncaught: 'boom'");
        assert_eq!(error.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_is_syntax() {
        assert!(ErrorInfo::new("SyntaxError", "unexpected token").is_syntax());
        assert!(!ErrorInfo::new("TypeError", "unexpected token").is_syntax());
    }

    #[test]
    fn test_clone_and_eq() {
        let error = ErrorInfo::new("RangeError", "Invalid array length");
        assert_eq!(error.clone(), error);
    }
}
