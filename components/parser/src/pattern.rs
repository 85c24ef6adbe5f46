//! Binding-pattern analysis: which identifiers a declaration target binds.

use crate::lexer::{Punctuator, Token, TokenKind};
use crate::splitter::{matching_close, nesting};

/// Collects the leaf identifiers bound by a declaration target.
///
/// Handles simple identifiers and object/array destructuring, including
/// nesting, rest elements, default initializers, renamed and computed keys,
/// and omitted array slots.
///
/// # Examples
///
/// ```
/// use parser::{bound_names, Lexer};
///
/// let tokens = Lexer::new("{ a, b: [c, , ...d], e = 1, ...rest }").tokenize().unwrap();
/// assert_eq!(bound_names(&tokens), vec!["a", "c", "d", "e", "rest"]);
/// ```
pub fn bound_names(target: &[Token]) -> Vec<String> {
    let mut names = Vec::new();
    collect(target, &mut names);
    names
}

/// Returns the index one past the end of the target starting at `start`.
pub(crate) fn target_end(tokens: &[Token], start: usize) -> usize {
    match tokens.get(start).map(|t| &t.kind) {
        Some(TokenKind::Punctuator(Punctuator::LBrace | Punctuator::LBracket)) => {
            matching_close(tokens, start).map_or(tokens.len(), |close| close + 1)
        }
        Some(_) => start + 1,
        None => start,
    }
}

fn collect(target: &[Token], names: &mut Vec<String>) {
    let Some(first) = target.first() else {
        return;
    };
    match &first.kind {
        TokenKind::Identifier(name) => names.push(name.clone()),
        TokenKind::Punctuator(Punctuator::LBrace) => {
            for property in split_commas(inner(target)) {
                object_property(property, names);
            }
        }
        TokenKind::Punctuator(Punctuator::LBracket) => {
            for element in split_commas(inner(target)) {
                array_element(element, names);
            }
        }
        _ => {}
    }
}

fn object_property(property: &[Token], names: &mut Vec<String>) {
    let Some(first) = property.first() else {
        return;
    };
    if first.is_punct(Punctuator::Spread) {
        collect(without_default(&property[1..]), names);
        return;
    }
    match find_top_level(property, Punctuator::Colon) {
        Some(colon) => collect(without_default(&property[colon + 1..]), names),
        // Shorthand `{ a }` or `{ a = 1 }`
        None => {
            if let Some(name) = first.ident() {
                names.push(name.to_string());
            }
        }
    }
}

fn array_element(element: &[Token], names: &mut Vec<String>) {
    match element.first() {
        None => {}
        Some(first) if first.is_punct(Punctuator::Spread) => {
            collect(without_default(&element[1..]), names)
        }
        Some(_) => collect(without_default(element), names),
    }
}

/// The tokens between a bracket and its matching close.
fn inner(target: &[Token]) -> &[Token] {
    match matching_close(target, 0) {
        Some(close) => &target[1..close],
        None => &target[1..],
    }
}

fn without_default(element: &[Token]) -> &[Token] {
    match find_top_level(element, Punctuator::Assign) {
        Some(assign) => &element[..assign],
        None => element,
    }
}

fn find_top_level(tokens: &[Token], punct: Punctuator) -> Option<usize> {
    let mut depth = 0;
    for (i, token) in tokens.iter().enumerate() {
        if depth == 0 && token.is_punct(punct) {
            return Some(i);
        }
        depth += nesting(token);
    }
    None
}

/// Splits at depth-0 commas; empty pieces are kept so array holes survive.
fn split_commas(tokens: &[Token]) -> Vec<&[Token]> {
    let mut pieces = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if depth == 0 && token.is_punct(Punctuator::Comma) {
            pieces.push(&tokens[start..i]);
            start = i + 1;
        }
        depth += nesting(token);
    }
    if start < tokens.len() {
        pieces.push(&tokens[start..]);
    }
    pieces
}
