//! Import rewriting: turns module syntax into code a function body can run.
//!
//! In execution mode every import declaration becomes an `await import(...)`
//! with destructuring, bare package specifiers become CDN URLs, and `export`
//! modifiers are dropped. In analysis mode only the specifiers change: the
//! version is stripped and carried in a trailing `// types: <version>` comment.

use crate::error::RewriteError;
use crate::specifier::PackageSpecifier;
use parser::{Keyword, Lexer, Punctuator, Token, TokenKind};
use std::ops::Range;
use tracing::debug;

/// What the rewritten code is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteMode {
    /// Code to be executed; packages load from `cdn_host`
    Execution {
        /// Host serving `/npm/<package>/+esm`
        cdn_host: String,
    },
    /// Code handed to type acquisition
    Analysis,
}

/// Rewrites imports, `require` calls and exports in a submission.
///
/// # Examples
///
/// ```
/// use module_resolver::ImportRewriter;
///
/// let rewriter = ImportRewriter::execution("cdn.jsdelivr.net");
/// assert_eq!(
///     rewriter.rewrite("import _ from 'lodash@4.17.21'").unwrap(),
///     r#"const { default: _ } = await import("https://cdn.jsdelivr.net/npm/lodash@4.17.21/+esm");"#
/// );
///
/// let analysis = ImportRewriter::analysis();
/// assert_eq!(
///     analysis.rewrite("import _ from 'lodash@4.17.21'").unwrap(),
///     r#"import _ from "lodash" // types: 4.17.21"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ImportRewriter {
    mode: RewriteMode,
}

#[derive(Debug)]
struct Edit {
    range: Range<usize>,
    text: String,
}

#[derive(Debug, Default)]
struct ImportDeclaration {
    /// Index of the last token belonging to the declaration
    end: usize,
    specifier: usize,
    default: Option<String>,
    namespace: Option<String>,
    named: Vec<(String, String)>,
    type_only: bool,
    braces: bool,
    dropped_types: bool,
}

impl ImportRewriter {
    /// Creates a rewriter with the given mode.
    pub fn new(mode: RewriteMode) -> Self {
        Self { mode }
    }

    /// Creates an execution-mode rewriter for a CDN host.
    pub fn execution(cdn_host: impl Into<String>) -> Self {
        Self::new(RewriteMode::Execution {
            cdn_host: cdn_host.into(),
        })
    }

    /// Creates an analysis-mode rewriter.
    pub fn analysis() -> Self {
        Self::new(RewriteMode::Analysis)
    }

    /// Returns the rewriter's mode.
    pub fn mode(&self) -> &RewriteMode {
        &self.mode
    }

    /// Rewrites a submission.
    pub fn rewrite(&self, source: &str) -> Result<String, RewriteError> {
        let tokens = Lexer::new(source).tokenize()?;
        let mut edits = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            let after_dot = i > 0
                && (tokens[i - 1].is_punct(Punctuator::Dot)
                    || tokens[i - 1].is_punct(Punctuator::OptionalChain));
            let next_is = |punct| tokens.get(i + 1).is_some_and(|t: &Token| t.is_punct(punct));

            match &token.kind {
                TokenKind::Keyword(Keyword::Import) if next_is(Punctuator::LParen) => {
                    if let Some(index) = call_argument(&tokens, i) {
                        self.rewrite_specifier(source, &tokens[index], &mut edits);
                    }
                }
                TokenKind::Keyword(Keyword::Import) if !next_is(Punctuator::Dot) => {
                    if let Some(declaration) = parse_import(source, &tokens, i) {
                        self.rewrite_import(source, &tokens, i, &declaration, &mut edits);
                        i = declaration.end;
                    }
                }
                TokenKind::Keyword(Keyword::Export) if self.is_execution() => {
                    if let Some(edit) = strip_export(&tokens, i) {
                        edits.push(edit);
                    }
                }
                TokenKind::Keyword(Keyword::Export) => {
                    if let Some(index) = reexport_source(&tokens, i) {
                        self.rewrite_specifier(source, &tokens[index], &mut edits);
                        i = index;
                    }
                }
                TokenKind::Identifier(name) if name == "require" && !after_dot => {
                    if let Some(index) = call_argument(&tokens, i) {
                        let closes = tokens.get(index + 1).is_some_and(|t| t.is_punct(Punctuator::RParen));
                        match (&self.mode, closes, &tokens[index].kind) {
                            (RewriteMode::Execution { .. }, true, TokenKind::String(specifier)) => {
                                edits.push(Edit {
                                    range: token.start..tokens[index + 1].end,
                                    text: format!("(await import({}))", js_quote(&self.resolve(specifier))),
                                });
                                i = index + 1;
                            }
                            _ => self.rewrite_specifier(source, &tokens[index], &mut edits),
                        }
                    }
                }
                _ => {}
            }
            i += 1;
        }

        if !edits.is_empty() {
            debug!(edits = edits.len(), mode = ?self.mode, "rewrote module syntax");
        }
        Ok(apply(source, edits))
    }

    fn is_execution(&self) -> bool {
        matches!(self.mode, RewriteMode::Execution { .. })
    }

    /// The URL (execution) or specifier (analysis) a source specifier maps to.
    fn resolve(&self, specifier: &str) -> String {
        match (&self.mode, PackageSpecifier::parse(specifier)) {
            (RewriteMode::Execution { cdn_host }, Some(package)) => package.cdn_url(cdn_host),
            (RewriteMode::Analysis, Some(package)) => package.bare(),
            (_, None) => specifier.to_string(),
        }
    }

    /// Rewrites a specifier string token in place.
    fn rewrite_specifier(&self, source: &str, token: &Token, edits: &mut Vec<Edit>) {
        let TokenKind::String(specifier) = &token.kind else {
            return;
        };
        let Some(package) = PackageSpecifier::parse(specifier) else {
            return;
        };
        edits.push(Edit {
            range: token.start..token.end,
            text: js_quote(&self.resolve(specifier)),
        });
        if let (RewriteMode::Analysis, Some(version)) = (&self.mode, &package.version) {
            let line_end = source[token.end..]
                .find('\n')
                .map_or(source.len(), |offset| token.end + offset);
            edits.push(Edit {
                range: line_end..line_end,
                text: format!(" // types: {}", version),
            });
        }
    }

    fn rewrite_import(
        &self,
        source: &str,
        tokens: &[Token],
        start: usize,
        declaration: &ImportDeclaration,
        edits: &mut Vec<Edit>,
    ) {
        let specifier_token = &tokens[declaration.specifier];
        if !self.is_execution() {
            self.rewrite_specifier(source, specifier_token, edits);
            return;
        }
        let TokenKind::String(specifier) = &specifier_token.kind else {
            return;
        };

        let import = format!("await import({})", js_quote(&self.resolve(specifier)));
        let text = if declaration.type_only {
            String::new()
        } else if let Some(namespace) = &declaration.namespace {
            let mut text = format!("const {} = {};", namespace, import);
            if let Some(default) = &declaration.default {
                text.push_str(&format!(" const {{ default: {} }} = {};", default, namespace));
            }
            text
        } else {
            let mut parts = Vec::new();
            if let Some(default) = &declaration.default {
                parts.push(format!("default: {}", default));
            }
            for (imported, local) in &declaration.named {
                if imported == local {
                    parts.push(local.clone());
                } else {
                    parts.push(format!("{}: {}", imported, local));
                }
            }
            if !parts.is_empty() {
                format!("const {{ {} }} = {};", parts.join(", "), import)
            } else if declaration.braces && declaration.dropped_types {
                String::new()
            } else {
                format!("{};", import)
            }
        };

        edits.push(Edit {
            range: tokens[start].start..tokens[declaration.end].end,
            text,
        });
    }
}

/// For `callee(` followed by a literal, returns the literal's index.
fn call_argument(tokens: &[Token], callee: usize) -> Option<usize> {
    let argument = callee + 2;
    let token = tokens.get(argument)?;
    let is_literal = matches!(token.kind, TokenKind::String(_));
    let followed = tokens
        .get(argument + 1)
        .is_some_and(|t| t.is_punct(Punctuator::RParen) || t.is_punct(Punctuator::Comma));
    (is_literal && followed).then_some(argument)
}

fn parse_import(source: &str, tokens: &[Token], start: usize) -> Option<ImportDeclaration> {
    let mut declaration = ImportDeclaration::default();
    let mut j = start + 1;
    let text = |token: &Token| source[token.start..token.end].to_string();

    if matches!(tokens.get(j)?.kind, TokenKind::String(_)) {
        declaration.specifier = j;
        declaration.end = finish_import(tokens, j);
        return Some(declaration);
    }

    if tokens[j].is_ident("type") {
        let next = tokens.get(j + 1)?;
        let starts_clause = (next.ident().is_some() && !next.is_ident("from"))
            || next.is_punct(Punctuator::LBrace)
            || next.kind == TokenKind::Punctuator(Punctuator::Operator("*"));
        if starts_clause {
            declaration.type_only = true;
            j += 1;
        }
    }

    if let Some(name) = tokens[j].ident() {
        let next = tokens.get(j + 1)?;
        if next.is_punct(Punctuator::Comma) || next.is_ident("from") {
            declaration.default = Some(name.to_string());
            j += 1;
            if next.is_punct(Punctuator::Comma) {
                j += 1;
            }
        }
    }

    let token = tokens.get(j)?;
    if token.kind == TokenKind::Punctuator(Punctuator::Operator("*")) {
        if !tokens.get(j + 1)?.is_ident("as") {
            return None;
        }
        declaration.namespace = Some(tokens.get(j + 2)?.ident()?.to_string());
        j += 3;
    } else if token.is_punct(Punctuator::LBrace) {
        declaration.braces = true;
        let close = (j..tokens.len()).find(|&k| tokens[k].is_punct(Punctuator::RBrace))?;
        for piece in tokens[j + 1..close].split(|t| t.is_punct(Punctuator::Comma)) {
            match piece {
                [] => {}
                [first, second, ..] if first.is_ident("type") && !second.is_ident("as") => {
                    declaration.dropped_types = true;
                }
                [single] => declaration.named.push((text(single), text(single))),
                [imported, as_kw, local] if as_kw.is_ident("as") => {
                    let imported = match &imported.kind {
                        TokenKind::String(value) => js_quote(value),
                        _ => text(imported),
                    };
                    declaration.named.push((imported, text(local)));
                }
                _ => return None,
            }
        }
        j = close + 1;
    }

    if !tokens.get(j)?.is_ident("from") || !matches!(tokens.get(j + 1)?.kind, TokenKind::String(_)) {
        return None;
    }
    declaration.specifier = j + 1;
    declaration.end = finish_import(tokens, j + 1);
    Some(declaration)
}

/// Extends a declaration past import attributes and a trailing semicolon.
fn finish_import(tokens: &[Token], specifier: usize) -> usize {
    let mut end = specifier;
    let attributes = tokens
        .get(end + 1)
        .is_some_and(|t| (t.is_keyword(Keyword::With) || t.is_ident("assert")) && !t.newline_before);
    if attributes && tokens.get(end + 2).is_some_and(|t| t.is_punct(Punctuator::LBrace)) {
        if let Some(close) = (end + 2..tokens.len()).find(|&k| tokens[k].is_punct(Punctuator::RBrace)) {
            end = close;
        }
    }
    if tokens.get(end + 1).is_some_and(|t| t.is_punct(Punctuator::Semicolon)) {
        end += 1;
    }
    end
}

/// The specifier token of `export ... from "x"`, if this is a re-export.
fn reexport_source(tokens: &[Token], start: usize) -> Option<usize> {
    let next = tokens.get(start + 1)?;
    let is_list = next.is_punct(Punctuator::LBrace)
        || next.kind == TokenKind::Punctuator(Punctuator::Operator("*"))
        || next.is_ident("type");
    if !is_list {
        return None;
    }
    let from = (start + 1..tokens.len())
        .take_while(|&k| !tokens[k].is_punct(Punctuator::Semicolon))
        .find(|&k| tokens[k].is_ident("from"))?;
    matches!(tokens.get(from + 1)?.kind, TokenKind::String(_)).then_some(from + 1)
}

/// Removes an `export` modifier, or a whole re-export / export list.
fn strip_export(tokens: &[Token], start: usize) -> Option<Edit> {
    let export = &tokens[start];
    let next = tokens.get(start + 1)?;

    let is_list = next.is_punct(Punctuator::LBrace)
        || next.kind == TokenKind::Punctuator(Punctuator::Operator("*"))
        || (next.is_ident("type")
            && tokens.get(start + 2).is_some_and(|t| t.is_punct(Punctuator::LBrace)));
    if is_list {
        let mut end = start + 1;
        while end + 1 < tokens.len() && !tokens[end].is_ident("from") && !tokens[end].is_punct(Punctuator::RBrace) {
            end += 1;
        }
        if tokens[end].is_punct(Punctuator::RBrace) && tokens.get(end + 1).is_some_and(|t| t.is_ident("from")) {
            end += 1;
        }
        if tokens[end].is_ident("from") && tokens.get(end + 1).is_some() {
            end += 1;
        }
        if tokens.get(end + 1).is_some_and(|t| t.is_punct(Punctuator::Semicolon)) {
            end += 1;
        }
        return Some(Edit {
            range: export.start..tokens[end].end,
            text: String::new(),
        });
    }

    let body = if next.is_keyword(Keyword::Default) {
        tokens.get(start + 2)
    } else {
        Some(next)
    };
    Some(Edit {
        range: export.start..body.map_or(next.end, |t| t.start),
        text: String::new(),
    })
}

fn apply(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|edit| (edit.range.start, edit.range.end));
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in edits {
        if edit.range.start < cursor {
            continue;
        }
        out.push_str(&source[cursor..edit.range.start]);
        out.push_str(&edit.text);
        cursor = edit.range.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Quotes a string as a double-quoted JavaScript literal.
fn js_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
