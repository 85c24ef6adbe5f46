//! Syntactic shape recognition for a single top-level statement.

use crate::lexer::{Keyword, Punctuator, Token, TokenKind};
use crate::pattern::{bound_names, target_end};
use crate::splitter::{matching_close, nesting};
use std::ops::Range;

/// Declaration keyword of a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKeyword {
    /// `const`
    Const,
    /// `let`
    Let,
    /// `var`
    Var,
}

/// The syntactic shape of a statement, independent of token details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementShape {
    /// `const`/`let`/`var` with the leaf names of all declarators
    VariableDeclaration {
        /// The declaration keyword
        keyword: DeclarationKeyword,
        /// Every identifier the declaration binds, in source order
        names: Vec<String>,
    },
    /// Named function declaration (including async and generator forms)
    FunctionDeclaration {
        /// The function's name
        name: String,
    },
    /// Named class declaration
    ClassDeclaration {
        /// The class's name
        name: String,
    },
    /// `window.x = ...` or `globalThis.x = ...`
    GlobalAssignment {
        /// The assigned property
        name: String,
    },
    /// A TypeScript construct with no runtime effect
    TypeOnly,
    /// A control statement, block, or labelled statement
    Control,
    /// A bare call to the console surface (`console.log(...)`, `clear()`)
    ConsoleCall,
    /// Anything else
    Expression,
}

/// A recognized shape plus the source byte ranges to erase before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeAnalysis {
    /// The statement's shape
    pub shape: StatementShape,
    /// Type annotations to remove from the executable text
    pub erasures: Vec<Range<usize>>,
}

/// Recognizes the shape of one statement's tokens.
pub fn analyze_shape(tokens: &[Token]) -> ShapeAnalysis {
    let plain = |shape| ShapeAnalysis {
        shape,
        erasures: Vec::new(),
    };
    let Some(first) = tokens.first() else {
        return plain(StatementShape::Control);
    };

    if let Some(keyword) = declaration_keyword(tokens) {
        let (names, erasures) = declarators(tokens);
        return ShapeAnalysis {
            shape: StatementShape::VariableDeclaration { keyword, names },
            erasures,
        };
    }
    if is_type_only(tokens) {
        return plain(StatementShape::TypeOnly);
    }
    if let Some(shape) = declaration(tokens) {
        return plain(shape);
    }

    match &first.kind {
        TokenKind::Keyword(
            Keyword::If
            | Keyword::For
            | Keyword::While
            | Keyword::Do
            | Keyword::Try
            | Keyword::Throw
            | Keyword::Return
            | Keyword::Break
            | Keyword::Continue
            | Keyword::Switch
            | Keyword::With
            | Keyword::Debugger,
        )
        | TokenKind::Punctuator(Punctuator::LBrace) => return plain(StatementShape::Control),
        TokenKind::Identifier(_)
            if tokens.get(1).is_some_and(|t| t.is_punct(Punctuator::Colon)) =>
        {
            return plain(StatementShape::Control)
        }
        _ => {}
    }

    if let Some(name) = global_assignment(tokens) {
        return plain(StatementShape::GlobalAssignment { name });
    }
    if is_console_call(tokens) {
        return plain(StatementShape::ConsoleCall);
    }
    plain(StatementShape::Expression)
}

fn declaration_keyword(tokens: &[Token]) -> Option<DeclarationKeyword> {
    let keyword = match tokens.first()?.kind {
        TokenKind::Keyword(Keyword::Const) => DeclarationKeyword::Const,
        TokenKind::Keyword(Keyword::Var) => DeclarationKeyword::Var,
        TokenKind::Keyword(Keyword::Let) => DeclarationKeyword::Let,
        _ => return None,
    };
    // `let` is only a declaration when a binding target follows.
    let target = tokens.get(1)?;
    let starts_target = matches!(
        target.kind,
        TokenKind::Identifier(_)
            | TokenKind::Punctuator(Punctuator::LBrace | Punctuator::LBracket)
    );
    starts_target.then_some(keyword)
}

/// Walks the declarators after the keyword, collecting bound names and the
/// spans of type annotations on their targets.
fn declarators(tokens: &[Token]) -> (Vec<String>, Vec<Range<usize>>) {
    let mut names = Vec::new();
    let mut erasures = Vec::new();
    let mut i = 1;

    while i < tokens.len() {
        let end = target_end(tokens, i);
        names.extend(bound_names(&tokens[i..end]));
        i = end;

        let annotation_start = i;
        if tokens.get(i).is_some_and(|t| t.is_punct(Punctuator::Not))
            && tokens.get(i + 1).is_some_and(|t| t.is_punct(Punctuator::Colon))
        {
            i += 1;
        }
        if tokens.get(i).is_some_and(|t| t.is_punct(Punctuator::Colon)) {
            i = annotation_end(tokens, i + 1);
            if end > 0 && i > annotation_start {
                erasures.push(tokens[end - 1].end..tokens[i - 1].end);
            }
        }

        // Skip the initializer.
        let mut depth = 0;
        while i < tokens.len() && !(depth == 0 && tokens[i].is_punct(Punctuator::Comma)) {
            depth += nesting(&tokens[i]);
            i += 1;
        }
        i += 1;
    }

    (names, erasures)
}

/// Returns the index after a type annotation starting at `start`.
fn annotation_end(tokens: &[Token], start: usize) -> usize {
    let mut depth = 0;
    let mut angle = 0;
    let mut i = start;
    while let Some(token) = tokens.get(i) {
        if depth == 0
            && angle <= 0
            && (token.is_punct(Punctuator::Assign) || token.is_punct(Punctuator::Comma))
        {
            break;
        }
        match token.kind {
            TokenKind::Punctuator(Punctuator::Lt) => angle += 1,
            TokenKind::Punctuator(Punctuator::Gt) => angle -= 1,
            TokenKind::Punctuator(Punctuator::GtGt) => angle -= 2,
            TokenKind::Punctuator(Punctuator::GtGtGt) => angle -= 3,
            _ => depth += nesting(token),
        }
        i += 1;
    }
    i
}

fn is_type_only(tokens: &[Token]) -> bool {
    let (Some(first), Some(second)) = (tokens.first(), tokens.get(1)) else {
        return false;
    };
    let same_line_word = !second.newline_before
        && matches!(second.kind, TokenKind::Identifier(_) | TokenKind::Keyword(_));

    match &first.kind {
        TokenKind::Identifier(word) => match word.as_str() {
            "declare" | "interface" => same_line_word,
            "type" => {
                second.ident().is_some()
                    && !second.newline_before
                    && tokens.get(2).is_some_and(|t| {
                        t.is_punct(Punctuator::Assign) || t.is_punct(Punctuator::Lt)
                    })
            }
            _ => false,
        },
        TokenKind::Keyword(Keyword::Import | Keyword::Export) => {
            second.is_ident("type")
                && tokens.get(2).is_some_and(|t| {
                    t.ident().is_some()
                        || t.is_punct(Punctuator::LBrace)
                        || t.kind == TokenKind::Punctuator(Punctuator::Operator("*"))
                })
        }
        _ => false,
    }
}

fn declaration(tokens: &[Token]) -> Option<StatementShape> {
    let mut i = 0;
    if tokens.first()?.is_ident("async") {
        i = 1;
    }
    match tokens.get(i)?.kind {
        TokenKind::Keyword(Keyword::Function) => {
            i += 1;
            if tokens.get(i)?.kind == TokenKind::Punctuator(Punctuator::Operator("*")) {
                i += 1;
            }
            let name = tokens.get(i)?.ident()?.to_string();
            Some(StatementShape::FunctionDeclaration { name })
        }
        TokenKind::Keyword(Keyword::Class) if i == 0 => {
            let name = tokens.get(1)?.ident()?.to_string();
            Some(StatementShape::ClassDeclaration { name })
        }
        _ => None,
    }
}

fn global_assignment(tokens: &[Token]) -> Option<String> {
    let is_global = tokens.first()?.is_ident("window") || tokens.first()?.is_ident("globalThis");
    if is_global
        && tokens.get(1)?.is_punct(Punctuator::Dot)
        && tokens.get(3)?.is_punct(Punctuator::Assign)
    {
        return tokens.get(2)?.ident().map(str::to_string);
    }
    None
}

fn is_console_call(tokens: &[Token]) -> bool {
    let Some(first) = tokens.first() else {
        return false;
    };
    let call_open = if first.is_ident("console") {
        let member = tokens.get(1).is_some_and(|t| t.is_punct(Punctuator::Dot))
            && tokens.get(2).is_some_and(|t| t.ident().is_some());
        if !member {
            return false;
        }
        3
    } else if first.is_ident("clear") {
        1
    } else {
        return false;
    };
    tokens.get(call_open).is_some_and(|t| t.is_punct(Punctuator::LParen))
        && matching_close(tokens, call_open) == Some(tokens.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn shape(source: &str) -> StatementShape {
        analyze_shape(&Lexer::new(source).tokenize().unwrap()).shape
    }

    #[test]
    fn test_variable_declarations() {
        assert_eq!(
            shape("let a = 1, { b, c: [d] } = obj"),
            StatementShape::VariableDeclaration {
                keyword: DeclarationKeyword::Let,
                names: vec!["a".to_string(), "b".to_string(), "d".to_string()],
            }
        );
    }

    #[test]
    fn test_let_as_identifier_is_not_a_declaration() {
        assert_eq!(shape("let = 5"), StatementShape::Expression);
    }

    #[test]
    fn test_function_and_class() {
        assert_eq!(
            shape("async function* gen() {}"),
            StatementShape::FunctionDeclaration {
                name: "gen".to_string()
            }
        );
        assert_eq!(
            shape("class Point extends Base {}"),
            StatementShape::ClassDeclaration {
                name: "Point".to_string()
            }
        );
        assert_eq!(shape("function () {}"), StatementShape::Expression);
    }

    #[test]
    fn test_type_only_constructs() {
        assert_eq!(shape("interface User { id: number }"), StatementShape::TypeOnly);
        assert_eq!(shape("type Id = string | number"), StatementShape::TypeOnly);
        assert_eq!(shape("declare const VERSION: string"), StatementShape::TypeOnly);
        assert_eq!(shape("import type { A } from 'a'"), StatementShape::TypeOnly);
        assert_eq!(shape("type = 3"), StatementShape::Expression);
    }

    #[test]
    fn test_global_assignment() {
        assert_eq!(
            shape("window.answer = 42"),
            StatementShape::GlobalAssignment {
                name: "answer".to_string()
            }
        );
        assert_eq!(shape("window.answer += 1"), StatementShape::Expression);
    }

    #[test]
    fn test_console_calls() {
        assert_eq!(shape("console.log('a', b)"), StatementShape::ConsoleCall);
        assert_eq!(shape("clear()"), StatementShape::ConsoleCall);
        assert_eq!(shape("console.log('a').x"), StatementShape::Expression);
    }

    #[test]
    fn test_annotation_erasure_spans() {
        let source = "const m: Map<string, number[]> = new Map(), n!: number";
        let analysis = analyze_shape(&Lexer::new(source).tokenize().unwrap());
        let erased: Vec<&str> = analysis.erasures.iter().map(|r| &source[r.clone()]).collect();
        assert_eq!(erased, vec![": Map<string, number[]>", "!: number"]);
    }
}
