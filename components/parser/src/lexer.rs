//! JavaScript Lexer - tokenizes source code into spanned tokens
//!
//! The lexer only needs to be precise about token boundaries: every token
//! records its byte span in the source, its starting position, and whether a
//! line terminator preceded it. Statement splitting and import rewriting work
//! on these spans and slice the original text back out.

use crate::error::ParseError;
use core_types::SourcePosition;

/// Reserved words the statement analysis cares about.
///
/// Contextual words (`async`, `await`, `of`, `type`, `declare`, ...) are
/// lexed as identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// break keyword
    Break,
    /// case keyword
    Case,
    /// catch keyword
    Catch,
    /// class keyword
    Class,
    /// const keyword
    Const,
    /// continue keyword
    Continue,
    /// debugger keyword
    Debugger,
    /// default keyword
    Default,
    /// delete keyword
    Delete,
    /// do keyword
    Do,
    /// else keyword
    Else,
    /// export keyword
    Export,
    /// extends keyword
    Extends,
    /// false keyword
    False,
    /// finally keyword
    Finally,
    /// for keyword
    For,
    /// function keyword
    Function,
    /// if keyword
    If,
    /// import keyword
    Import,
    /// in keyword
    In,
    /// instanceof keyword
    Instanceof,
    /// let keyword
    Let,
    /// new keyword
    New,
    /// null keyword
    Null,
    /// return keyword
    Return,
    /// super keyword
    Super,
    /// switch keyword
    Switch,
    /// this keyword
    This,
    /// throw keyword
    Throw,
    /// true keyword
    True,
    /// try keyword
    Try,
    /// typeof keyword
    Typeof,
    /// var keyword
    Var,
    /// void keyword
    Void,
    /// while keyword
    While,
    /// with keyword
    With,
}

impl Keyword {
    /// Looks up a reserved word.
    pub fn lookup(word: &str) -> Option<Self> {
        let keyword = match word {
            "break" => Keyword::Break,
            "case" => Keyword::Case,
            "catch" => Keyword::Catch,
            "class" => Keyword::Class,
            "const" => Keyword::Const,
            "continue" => Keyword::Continue,
            "debugger" => Keyword::Debugger,
            "default" => Keyword::Default,
            "delete" => Keyword::Delete,
            "do" => Keyword::Do,
            "else" => Keyword::Else,
            "export" => Keyword::Export,
            "extends" => Keyword::Extends,
            "false" => Keyword::False,
            "finally" => Keyword::Finally,
            "for" => Keyword::For,
            "function" => Keyword::Function,
            "if" => Keyword::If,
            "import" => Keyword::Import,
            "in" => Keyword::In,
            "instanceof" => Keyword::Instanceof,
            "let" => Keyword::Let,
            "new" => Keyword::New,
            "null" => Keyword::Null,
            "return" => Keyword::Return,
            "super" => Keyword::Super,
            "switch" => Keyword::Switch,
            "this" => Keyword::This,
            "throw" => Keyword::Throw,
            "true" => Keyword::True,
            "try" => Keyword::Try,
            "typeof" => Keyword::Typeof,
            "var" => Keyword::Var,
            "void" => Keyword::Void,
            "while" => Keyword::While,
            "with" => Keyword::With,
            _ => return None,
        };
        Some(keyword)
    }

    /// Keywords after which a `/` starts a regular expression.
    fn precedes_expression(self) -> bool {
        matches!(
            self,
            Keyword::Case
                | Keyword::Delete
                | Keyword::Do
                | Keyword::Else
                | Keyword::In
                | Keyword::Instanceof
                | Keyword::New
                | Keyword::Return
                | Keyword::Throw
                | Keyword::Typeof
                | Keyword::Void
        )
    }
}

/// JavaScript punctuators (operators and delimiters)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuator {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `...`
    Spread,
    /// `?.`
    OptionalChain,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `=`
    Assign,
    /// `=>`
    Arrow,
    /// `!`
    Not,
    /// `~`
    Tilde,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `>>`
    GtGt,
    /// `>>>`
    GtGtGt,
    /// `/` (division)
    Slash,
    /// Any other operator, e.g. `+`, `===`, `??=`
    Operator(&'static str),
}

/// Longest-first table for maximal munch.
const OPERATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-",
    "*", "/", "%", "&", "|", "^", "!", "~", "?", ":", "=", ".",
];

impl Punctuator {
    fn from_operator(op: &'static str) -> Self {
        match op {
            "(" => Punctuator::LParen,
            ")" => Punctuator::RParen,
            "{" => Punctuator::LBrace,
            "}" => Punctuator::RBrace,
            "[" => Punctuator::LBracket,
            "]" => Punctuator::RBracket,
            ";" => Punctuator::Semicolon,
            "," => Punctuator::Comma,
            "." => Punctuator::Dot,
            "..." => Punctuator::Spread,
            "?." => Punctuator::OptionalChain,
            ":" => Punctuator::Colon,
            "?" => Punctuator::Question,
            "=" => Punctuator::Assign,
            "=>" => Punctuator::Arrow,
            "!" => Punctuator::Not,
            "~" => Punctuator::Tilde,
            "++" => Punctuator::PlusPlus,
            "--" => Punctuator::MinusMinus,
            "<" => Punctuator::Lt,
            ">" => Punctuator::Gt,
            ">>" => Punctuator::GtGt,
            ">>>" => Punctuator::GtGtGt,
            "/" => Punctuator::Slash,
            other => Punctuator::Operator(other),
        }
    }
}

/// The kind of a token, with the payload the analysis needs.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier or contextual keyword
    Identifier(String),
    /// Reserved word
    Keyword(Keyword),
    /// Private name (`#field`)
    PrivateName(String),
    /// Numeric literal
    Number,
    /// BigInt literal (`10n`)
    BigInt,
    /// String literal, with its cooked value
    String(String),
    /// Template literal with no substitutions
    Template,
    /// Template head: from `` ` `` to the first `${`
    TemplateHead,
    /// Template middle: from `}` to the next `${`
    TemplateMiddle,
    /// Template tail: from `}` to the closing `` ` ``
    TemplateTail,
    /// Regular expression literal
    RegExp,
    /// Punctuator/operator
    Punctuator(Punctuator),
    /// A character JavaScript does not define here (e.g. decorator `@`)
    Other(char),
}

/// A token with its location in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What the token is
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// Line and column of the first character
    pub position: SourcePosition,
    /// Whether a line terminator appeared between the previous token and this one
    pub newline_before: bool,
}

impl Token {
    /// Returns true if the token is the given punctuator.
    pub fn is_punct(&self, punct: Punctuator) -> bool {
        self.kind == TokenKind::Punctuator(punct)
    }

    /// Returns true if the token is the given keyword.
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// Returns true if the token is an identifier spelled `name`.
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Identifier(id) if id == name)
    }

    /// Returns the identifier name, if this is an identifier.
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if a statement may end with this token.
    pub fn can_end_statement(&self) -> bool {
        match &self.kind {
            TokenKind::Identifier(_)
            | TokenKind::PrivateName(_)
            | TokenKind::Number
            | TokenKind::BigInt
            | TokenKind::String(_)
            | TokenKind::Template
            | TokenKind::TemplateTail
            | TokenKind::RegExp => true,
            TokenKind::Keyword(k) => matches!(
                k,
                Keyword::This
                    | Keyword::Super
                    | Keyword::Null
                    | Keyword::True
                    | Keyword::False
                    | Keyword::Return
                    | Keyword::Break
                    | Keyword::Continue
                    | Keyword::Debugger
            ),
            TokenKind::Punctuator(p) => matches!(
                p,
                Punctuator::RParen
                    | Punctuator::RBracket
                    | Punctuator::RBrace
                    | Punctuator::PlusPlus
                    | Punctuator::MinusMinus
            ),
            TokenKind::TemplateHead | TokenKind::TemplateMiddle | TokenKind::Other(_) => false,
        }
    }
}

/// Lexer for JavaScript source code
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    index: usize,
    position: SourcePosition,
    /// One entry per open `{` or `${`; `true` marks a template substitution
    brace_stack: Vec<bool>,
    regex_allowed: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Self {
            source,
            chars: source.chars().collect(),
            index: 0,
            position: SourcePosition::start(),
            brace_stack: Vec::new(),
            regex_allowed: true,
        };
        lexer.skip_hashbang();
        lexer
    }

    /// Tokenizes the whole source.
    ///
    /// # Examples
    ///
    /// ```
    /// use parser::{Lexer, TokenKind};
    ///
    /// let tokens = Lexer::new("let x = `a${b}c`").tokenize().unwrap();
    /// assert_eq!(tokens.len(), 6);
    /// assert_eq!(tokens[3].kind, TokenKind::TemplateHead);
    /// assert_eq!(tokens[5].kind, TokenKind::TemplateTail);
    /// ```
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Returns the number of `{`/`${` still open after the last token.
    pub fn open_braces(&self) -> usize {
        self.brace_stack.len()
    }

    /// Get the next token from the source, or `None` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        let newline_before = self.skip_whitespace_and_comments()?;
        if self.is_at_end() {
            return Ok(None);
        }

        let start = self.position;
        let kind = self.scan_token(start)?;
        self.regex_allowed = match &kind {
            TokenKind::Identifier(name) => matches!(name.as_str(), "await" | "yield" | "of"),
            TokenKind::Keyword(k) => k.precedes_expression(),
            TokenKind::Punctuator(p) => !matches!(
                p,
                Punctuator::RParen
                    | Punctuator::RBracket
                    | Punctuator::PlusPlus
                    | Punctuator::MinusMinus
            ),
            TokenKind::TemplateHead | TokenKind::TemplateMiddle | TokenKind::Other(_) => true,
            _ => false,
        };

        Ok(Some(Token {
            kind,
            start: start.offset,
            end: self.position.offset,
            position: start,
            newline_before,
        }))
    }

    fn scan_token(&mut self, start: SourcePosition) -> Result<TokenKind, ParseError> {
        let ch = self.peek();
        match ch {
            '`' => {
                self.advance();
                self.scan_template(start, true)
            }
            '}' if self.brace_stack.last() == Some(&true) => {
                self.brace_stack.pop();
                self.advance();
                self.scan_template(start, false)
            }
            '"' | '\'' => {
                self.advance();
                self.scan_string(ch, start)
            }
            '/' if self.regex_allowed => {
                self.advance();
                self.scan_regexp(start)
            }
            '.' if self.peek_next().is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number();
                Ok(TokenKind::Number)
            }
            _ if ch.is_ascii_digit() => {
                if self.scan_number() {
                    Ok(TokenKind::BigInt)
                } else {
                    Ok(TokenKind::Number)
                }
            }
            _ if is_id_start(ch) => {
                let word = self.scan_identifier_name();
                Ok(match Keyword::lookup(&word) {
                    Some(keyword) => TokenKind::Keyword(keyword),
                    None => TokenKind::Identifier(word),
                })
            }
            '#' if self.peek_next().is_some_and(is_id_start) => {
                self.advance();
                Ok(TokenKind::PrivateName(self.scan_identifier_name()))
            }
            _ => Ok(self.scan_punctuator()),
        }
    }

    fn scan_punctuator(&mut self) -> TokenKind {
        let rest = &self.source[self.position.offset..];
        // `?.` followed by a digit is a conditional, not optional chaining.
        let optional_digit = rest.starts_with("?.")
            && rest[2..].chars().next().is_some_and(|c| c.is_ascii_digit());

        for op in OPERATORS {
            if !rest.starts_with(op) || (*op == "?." && optional_digit) {
                continue;
            }
            for _ in 0..op.chars().count() {
                self.advance();
            }
            match *op {
                "{" => self.brace_stack.push(false),
                "}" => {
                    self.brace_stack.pop();
                }
                _ => {}
            }
            return TokenKind::Punctuator(Punctuator::from_operator(op));
        }

        TokenKind::Other(self.advance())
    }

    fn scan_identifier_name(&mut self) -> String {
        let mut word = String::new();
        while !self.is_at_end() {
            let c = self.peek();
            if is_id_part(c) {
                word.push(self.advance());
            } else if c == '\\' && self.peek_next() == Some('u') {
                // Escaped identifier characters are kept verbatim.
                word.push(self.advance());
            } else {
                break;
            }
        }
        word
    }

    /// Scans a numeric literal; returns true if it carries the BigInt suffix.
    fn scan_number(&mut self) -> bool {
        if self.peek() == '0' && matches!(self.peek_next(), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')) {
            self.advance();
            self.advance();
            while !self.is_at_end() && (self.peek().is_ascii_hexdigit() || self.peek() == '_') {
                self.advance();
            }
            return self.match_char('n');
        }

        let mut seen_dot = false;
        let mut seen_exponent = false;
        while !self.is_at_end() {
            let c = self.peek();
            if c.is_ascii_digit() || c == '_' {
                self.advance();
            } else if c == '.' && !seen_dot && !seen_exponent {
                seen_dot = true;
                self.advance();
            } else if (c == 'e' || c == 'E') && !seen_exponent {
                seen_exponent = true;
                self.advance();
                if matches!(self.peek_or_nul(), '+' | '-') {
                    self.advance();
                }
            } else {
                break;
            }
        }
        !seen_dot && !seen_exponent && self.match_char('n')
    }

    fn scan_string(&mut self, quote: char, start: SourcePosition) -> Result<TokenKind, ParseError> {
        let mut value = String::new();
        loop {
            if self.is_at_end() || is_line_terminator(self.peek()) {
                return Err(ParseError::UnterminatedString { position: start });
            }
            let c = self.advance();
            if c == quote {
                return Ok(TokenKind::String(value));
            }
            if c != '\\' {
                value.push(c);
                continue;
            }
            if self.is_at_end() {
                return Err(ParseError::UnterminatedString { position: start });
            }
            match self.advance() {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                'b' => value.push('\u{8}'),
                'f' => value.push('\u{c}'),
                'v' => value.push('\u{b}'),
                '0' => value.push('\0'),
                'x' => {
                    let code = self.scan_hex_digits(2);
                    value.extend(code.and_then(char::from_u32));
                }
                'u' => {
                    let code = if self.match_char('{') {
                        let mut digits = String::new();
                        while !self.is_at_end() && self.peek() != '}' {
                            digits.push(self.advance());
                        }
                        self.match_char('}');
                        u32::from_str_radix(&digits, 16).ok()
                    } else {
                        self.scan_hex_digits(4)
                    };
                    value.extend(code.and_then(char::from_u32));
                }
                '\r' => {
                    self.match_char('\n');
                }
                '\n' | '\u{2028}' | '\u{2029}' => {}
                other => value.push(other),
            }
        }
    }

    fn scan_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut digits = String::with_capacity(count);
        for _ in 0..count {
            if self.is_at_end() || !self.peek().is_ascii_hexdigit() {
                return None;
            }
            digits.push(self.advance());
        }
        u32::from_str_radix(&digits, 16).ok()
    }

    /// Scans template characters after `` ` `` (head) or `}` (continuation).
    fn scan_template(&mut self, start: SourcePosition, head: bool) -> Result<TokenKind, ParseError> {
        while !self.is_at_end() {
            match self.advance() {
                '`' => {
                    return Ok(if head {
                        TokenKind::Template
                    } else {
                        TokenKind::TemplateTail
                    });
                }
                '\\' => {
                    if !self.is_at_end() {
                        self.advance();
                    }
                }
                '$' if self.peek_or_nul() == '{' => {
                    self.advance();
                    self.brace_stack.push(true);
                    return Ok(if head {
                        TokenKind::TemplateHead
                    } else {
                        TokenKind::TemplateMiddle
                    });
                }
                _ => {}
            }
        }
        Err(ParseError::UnterminatedTemplate { position: start })
    }

    fn scan_regexp(&mut self, start: SourcePosition) -> Result<TokenKind, ParseError> {
        let mut in_class = false;
        loop {
            if self.is_at_end() || is_line_terminator(self.peek()) {
                return Err(ParseError::UnterminatedRegExp { position: start });
            }
            match self.advance() {
                '\\' => {
                    if self.is_at_end() || is_line_terminator(self.peek()) {
                        return Err(ParseError::UnterminatedRegExp { position: start });
                    }
                    self.advance();
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                _ => {}
            }
        }
        while !self.is_at_end() && is_id_part(self.peek()) {
            self.advance();
        }
        Ok(TokenKind::RegExp)
    }

    /// Skips whitespace and comments; returns whether a line terminator was crossed.
    fn skip_whitespace_and_comments(&mut self) -> Result<bool, ParseError> {
        let mut newline = false;
        while !self.is_at_end() {
            let c = self.peek();
            if is_line_terminator(c) {
                newline = true;
                self.advance();
            } else if c.is_whitespace() || c == '\u{FEFF}' {
                self.advance();
            } else if c == '/' && self.peek_next() == Some('/') {
                while !self.is_at_end() && !is_line_terminator(self.peek()) {
                    self.advance();
                }
            } else if c == '/' && self.peek_next() == Some('*') {
                let start = self.position;
                self.advance();
                self.advance();
                loop {
                    if self.is_at_end() {
                        return Err(ParseError::UnterminatedComment { position: start });
                    }
                    let c = self.advance();
                    if c == '*' && self.match_char('/') {
                        break;
                    }
                    if is_line_terminator(c) {
                        newline = true;
                    }
                }
            } else {
                break;
            }
        }
        Ok(newline)
    }

    /// Skip hashbang comment (#!) at the beginning of the source
    fn skip_hashbang(&mut self) {
        if self.peek_or_nul() == '#' && self.peek_next() == Some('!') {
            while !self.is_at_end() && !is_line_terminator(self.peek()) {
                self.advance();
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.index >= self.chars.len()
    }

    fn peek(&self) -> char {
        self.chars[self.index]
    }

    fn peek_or_nul(&self) -> char {
        self.chars.get(self.index).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.index + 1).copied()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.index];
        self.index += 1;
        self.position = self.position.advance(c);
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek_or_nul() == expected && !self.is_at_end() {
            self.advance();
            true
        } else {
            false
        }
    }
}

/// Check if character is a line terminator (per ECMAScript spec)
fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_id_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_id_part(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit() || c == '\u{200C}' || c == '\u{200D}' || c.is_numeric()
}
