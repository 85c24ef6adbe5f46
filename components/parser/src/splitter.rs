//! Splits a token stream into top-level statements.
//!
//! Statements end at depth-0 semicolons, at automatic semicolon insertion
//! points, and after the closing brace of a statement-level body
//! (function/class declarations, control statements, blocks). Continuations
//! such as `else`, `catch`, `finally` and the `while` of a `do` loop stay in
//! the statement they belong to.

use crate::lexer::{Keyword, Punctuator, Token, TokenKind};
use std::ops::Range;

/// Net change in bracket nesting caused by a token.
pub(crate) fn nesting(token: &Token) -> i32 {
    match &token.kind {
        TokenKind::Punctuator(Punctuator::LParen | Punctuator::LBracket | Punctuator::LBrace)
        | TokenKind::TemplateHead => 1,
        TokenKind::Punctuator(Punctuator::RParen | Punctuator::RBracket | Punctuator::RBrace)
        | TokenKind::TemplateTail => -1,
        _ => 0,
    }
}

/// Returns the index of the token closing the bracket opened at `open`.
pub(crate) fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        depth += nesting(token);
        if depth == 0 {
            return Some(i);
        }
    }
    None
}

/// What a statement starts with, as far as splitting is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lead {
    Function,
    Class,
    If,
    Try,
    Do,
    Control,
    Block,
    Other,
}

impl Lead {
    fn of(tokens: &[Token], start: usize) -> Self {
        let mut i = start;
        // Labels: `outer: for (...)`
        while tokens.get(i).is_some_and(|t| t.ident().is_some())
            && tokens.get(i + 1).is_some_and(|t| t.is_punct(Punctuator::Colon))
        {
            i += 2;
        }
        let Some(token) = tokens.get(i) else {
            return Lead::Other;
        };
        match &token.kind {
            TokenKind::Keyword(Keyword::Function) => Lead::Function,
            TokenKind::Identifier(name)
                if name == "async"
                    && tokens
                        .get(i + 1)
                        .is_some_and(|t| t.is_keyword(Keyword::Function) && !t.newline_before) =>
            {
                Lead::Function
            }
            TokenKind::Keyword(Keyword::Class) => Lead::Class,
            TokenKind::Keyword(Keyword::If) => Lead::If,
            TokenKind::Keyword(Keyword::Try) => Lead::Try,
            TokenKind::Keyword(Keyword::Do) => Lead::Do,
            TokenKind::Keyword(
                Keyword::For | Keyword::While | Keyword::With | Keyword::Switch,
            ) => Lead::Control,
            TokenKind::Punctuator(Punctuator::LBrace) => Lead::Block,
            _ => Lead::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener {
    Nested,
    Head,
    Body,
}

#[derive(Debug)]
struct Current {
    start: usize,
    lead: Lead,
    /// Inside a function/class header, before its body brace.
    in_header: bool,
    /// The next depth-0 `(` is a control head.
    head_pending: bool,
    /// The next token is the body of a control statement.
    expect_body: bool,
    saw_if: bool,
    do_while_seen: bool,
}

impl Current {
    fn new(tokens: &[Token], start: usize) -> Self {
        let lead = Lead::of(tokens, start);
        Self {
            start,
            lead,
            in_header: matches!(lead, Lead::Function | Lead::Class),
            head_pending: false,
            expect_body: lead == Lead::Block,
            saw_if: false,
            do_while_seen: false,
        }
    }
}

struct Splitter<'t> {
    tokens: &'t [Token],
    stack: Vec<Opener>,
    current: Option<Current>,
    statements: Vec<Range<usize>>,
}

/// Splits tokens into top-level statements, returned as token index ranges.
///
/// Empty statements (a lone `;`) produce no range; a statement's range never
/// includes its terminating semicolon.
///
/// # Examples
///
/// ```
/// use parser::{split_statements, Lexer};
///
/// let tokens = Lexer::new("const a = 1\nif (a) { a++ } else a--\na").tokenize().unwrap();
/// assert_eq!(split_statements(&tokens).len(), 3);
/// ```
pub fn split_statements(tokens: &[Token]) -> Vec<Range<usize>> {
    let mut splitter = Splitter {
        tokens,
        stack: Vec::new(),
        current: None,
        statements: Vec::new(),
    };
    for i in 0..tokens.len() {
        splitter.step(i);
    }
    splitter.finish(tokens.len());
    splitter.statements
}

impl<'t> Splitter<'t> {
    fn step(&mut self, i: usize) {
        let tokens = self.tokens;
        let token = &tokens[i];

        if self.stack.is_empty() && self.asi_before(i) {
            self.finish(i);
        }
        if self.current.is_none() {
            if token.is_punct(Punctuator::Semicolon) {
                return;
            }
            self.current = Some(Current::new(self.tokens, i));
        }

        let depth0 = self.stack.is_empty();
        let mut end_after = false;
        let mut end_before = false;
        {
            let Some(current) = self.current.as_mut() else {
                return;
            };

            if depth0 && current.expect_body && !token.is_punct(Punctuator::LBrace) {
                current.expect_body = false;
            }

            match &token.kind {
                TokenKind::Punctuator(Punctuator::Semicolon) if depth0 => end_before = true,
                TokenKind::Punctuator(Punctuator::LParen) => {
                    if depth0 && current.head_pending {
                        current.head_pending = false;
                        self.stack.push(Opener::Head);
                    } else {
                        self.stack.push(Opener::Nested);
                    }
                }
                TokenKind::Punctuator(Punctuator::LBrace) => {
                    if depth0 && (current.expect_body || current.in_header) {
                        current.expect_body = false;
                        current.in_header = false;
                        current.head_pending = false;
                        self.stack.push(Opener::Body);
                    } else {
                        self.stack.push(Opener::Nested);
                    }
                }
                TokenKind::Punctuator(Punctuator::LBracket) | TokenKind::TemplateHead => {
                    self.stack.push(Opener::Nested);
                }
                TokenKind::Punctuator(
                    Punctuator::RParen | Punctuator::RBracket | Punctuator::RBrace,
                )
                | TokenKind::TemplateTail => match self.stack.pop() {
                    Some(Opener::Head) if self.stack.is_empty() => {
                        if current.lead == Lead::Do && current.do_while_seen {
                            end_after = true;
                        } else {
                            current.expect_body = true;
                        }
                    }
                    Some(Opener::Body) if self.stack.is_empty() => end_after = true,
                    _ => {}
                },
                TokenKind::Keyword(keyword) if depth0 => match keyword {
                    Keyword::If => {
                        current.saw_if = true;
                        current.head_pending = true;
                    }
                    Keyword::While if current.lead == Lead::Do && !current.do_while_seen => {
                        current.do_while_seen = true;
                        current.head_pending = true;
                    }
                    Keyword::For | Keyword::While | Keyword::With | Keyword::Switch => {
                        current.head_pending = true;
                    }
                    Keyword::Catch => {
                        current.head_pending = true;
                        current.expect_body = true;
                    }
                    Keyword::Else | Keyword::Do | Keyword::Try | Keyword::Finally => {
                        current.expect_body = true;
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        if end_before && !self.continues_with(i + 1) {
            self.finish(i);
        } else if end_after && !self.continues_with(i + 1) {
            self.finish(i + 1);
        }
    }

    /// Whether automatic semicolon insertion ends the current statement before token `i`.
    fn asi_before(&self, i: usize) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        let token = &self.tokens[i];
        if i <= current.start || !token.newline_before || current.in_header || current.expect_body {
            return false;
        }
        let prev = &self.tokens[i - 1];
        if !prev.can_end_statement() {
            return false;
        }
        let restricted = matches!(
            prev.kind,
            TokenKind::Keyword(Keyword::Return | Keyword::Break | Keyword::Continue)
        ) || token.is_punct(Punctuator::PlusPlus)
            || token.is_punct(Punctuator::MinusMinus);
        restricted || !(continues_expression(token) || self.continues_with(i))
    }

    /// Whether the token at `next` continues the current statement after a
    /// point where it could otherwise end.
    fn continues_with(&self, next: usize) -> bool {
        let (Some(current), Some(token)) = (&self.current, self.tokens.get(next)) else {
            return false;
        };
        match token.kind {
            TokenKind::Keyword(Keyword::Else) => current.saw_if,
            TokenKind::Keyword(Keyword::Catch | Keyword::Finally) => current.lead == Lead::Try,
            TokenKind::Keyword(Keyword::While) => {
                current.lead == Lead::Do && !current.do_while_seen
            }
            _ => false,
        }
    }

    fn finish(&mut self, end: usize) {
        if let Some(current) = self.current.take() {
            if current.start < end {
                self.statements.push(current.start..end);
            }
        }
        self.stack.clear();
    }
}

/// Whether a token on a new line can continue the preceding expression.
fn continues_expression(token: &Token) -> bool {
    match &token.kind {
        TokenKind::Punctuator(p) => !matches!(
            p,
            Punctuator::LBrace
                | Punctuator::Not
                | Punctuator::Tilde
                | Punctuator::PlusPlus
                | Punctuator::MinusMinus
        ),
        TokenKind::Template | TokenKind::TemplateHead => true,
        TokenKind::Keyword(Keyword::In | Keyword::Instanceof) => true,
        _ => false,
    }
}
