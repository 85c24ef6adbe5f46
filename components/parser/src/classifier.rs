//! Statement classification and whole-submission analysis.

use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::shape::{analyze_shape, StatementShape};
use crate::splitter::split_statements;
use std::ops::Range;

/// How the execution engine treats a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// A variable declaration or global assignment; binds its names
    Binding,
    /// A named function or class declaration; binds its name
    Declaration,
    /// Executed for effect only; never produces a result
    ControlFlow,
    /// A bare expression; produces the result when it comes last
    Expression,
}

/// Maps a statement shape to its kind.
///
/// # Examples
///
/// ```
/// use parser::{classify, StatementKind, StatementShape};
///
/// assert_eq!(classify(&StatementShape::ConsoleCall), StatementKind::ControlFlow);
/// assert_eq!(
///     classify(&StatementShape::GlobalAssignment { name: "x".to_string() }),
///     StatementKind::Binding
/// );
/// ```
pub fn classify(shape: &StatementShape) -> StatementKind {
    match shape {
        StatementShape::VariableDeclaration { .. } | StatementShape::GlobalAssignment { .. } => {
            StatementKind::Binding
        }
        StatementShape::FunctionDeclaration { .. } | StatementShape::ClassDeclaration { .. } => {
            StatementKind::Declaration
        }
        StatementShape::TypeOnly | StatementShape::Control | StatementShape::ConsoleCall => {
            StatementKind::ControlFlow
        }
        StatementShape::Expression => StatementKind::Expression,
    }
}

/// A classified top-level statement of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// How the statement is executed
    pub kind: StatementKind,
    /// Executable source text, with type annotations removed
    pub text: String,
    /// Identifiers the statement binds
    pub names: Vec<String>,
    /// True for type-only statements, which are not executed at all
    pub erased: bool,
}

impl Statement {
    /// Returns true if this statement binds `name`.
    pub fn binds(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Splits and classifies a submission.
///
/// # Examples
///
/// ```
/// use parser::{analyze, StatementKind};
///
/// let statements = analyze("const { a, ...rest } = obj\nfunction f() {}\nf(a)").unwrap();
/// assert_eq!(statements[0].kind, StatementKind::Binding);
/// assert_eq!(statements[0].names, vec!["a", "rest"]);
/// assert_eq!(statements[1].kind, StatementKind::Declaration);
/// assert_eq!(statements[2].kind, StatementKind::Expression);
/// ```
pub fn analyze(source: &str) -> Result<Vec<Statement>, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    let statements = split_statements(&tokens)
        .into_iter()
        .map(|range| {
            let tokens = &tokens[range];
            let analysis = analyze_shape(tokens);
            let kind = classify(&analysis.shape);
            let erased = analysis.shape == StatementShape::TypeOnly;
            let names = match analysis.shape {
                StatementShape::VariableDeclaration { names, .. } => names,
                StatementShape::FunctionDeclaration { name }
                | StatementShape::ClassDeclaration { name }
                | StatementShape::GlobalAssignment { name } => vec![name],
                _ => Vec::new(),
            };
            let text = if erased {
                String::new()
            } else {
                let start = tokens.first().map_or(0, |t| t.start);
                let end = tokens.last().map_or(0, |t| t.end);
                erase(source, start..end, &analysis.erasures)
            };
            Statement {
                kind,
                text,
                names,
                erased,
            }
        })
        .collect();
    Ok(statements)
}

fn erase(source: &str, span: Range<usize>, erasures: &[Range<usize>]) -> String {
    let mut text = String::with_capacity(span.len());
    let mut cursor = span.start;
    for range in erasures {
        text.push_str(&source[cursor..range.start]);
        cursor = range.end;
    }
    text.push_str(&source[cursor..span.end]);
    text
}
