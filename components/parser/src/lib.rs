//! JavaScript/TypeScript statement analysis for the REPL sandbox
//!
//! Turns a submission into classified top-level statements without building
//! a full AST: a spanned tokenizer, a statement splitter that understands
//! automatic semicolon insertion, binding-pattern analysis, and a pure
//! classifier over statement shapes.
//!
//! # Overview
//!
//! - [`Lexer`] - Tokenizes source code into spanned [`Token`]s
//! - [`split_statements`] - Splits tokens into top-level statements
//! - [`analyze_shape`] - Recognizes a statement's [`StatementShape`]
//! - [`classify`] - Maps a shape to a [`StatementKind`]
//! - [`analyze`] - The whole pipeline, producing [`Statement`]s
//!
//! # Example
//!
//! ```
//! use parser::{analyze, StatementKind};
//!
//! let statements = analyze("const x: number = 40\nx + 2").unwrap();
//! assert_eq!(statements.len(), 2);
//! assert_eq!(statements[0].text, "const x = 40");
//! assert_eq!(statements[1].kind, StatementKind::Expression);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod error;
pub mod lexer;
pub mod pattern;
pub mod shape;
pub mod splitter;

pub use classifier::{analyze, classify, Statement, StatementKind};
pub use error::ParseError;
pub use lexer::{Keyword, Lexer, Punctuator, Token, TokenKind};
pub use pattern::bound_names;
pub use shape::{analyze_shape, DeclarationKeyword, ShapeAnalysis, StatementShape};
pub use splitter::split_statements;

/// Returns false when the source is an unfinished prefix of a submission:
/// an open bracket, template literal or block comment.
///
/// Other syntax errors count as complete so that they get reported.
///
/// # Examples
///
/// ```
/// assert!(parser::is_complete("const a = 1"));
/// assert!(!parser::is_complete("function f() {"));
/// assert!(!parser::is_complete("`line one"));
/// assert!(parser::is_complete("'unterminated"));
/// ```
pub fn is_complete(source: &str) -> bool {
    let mut lexer = Lexer::new(source);
    let mut depth = 0;
    loop {
        match lexer.next_token() {
            Ok(Some(token)) => depth += splitter::nesting(&token),
            Ok(None) => return depth <= 0,
            Err(err) => return !err.is_incomplete(),
        }
    }
}
