//! Query tokenizer.
//!
//! Turns raw query text into a flat token stream. Whitespace separates atoms;
//! quoted strings and regex literals are single tokens, so a `:` inside them
//! never starts a field comparison.

use crate::ast::CompareOp;
use crate::error::{ParseError, ParseErrorKind};

/// Byte range of a token in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Word(String),
    QuotedString(String),
    Regex { pattern: String, flags: String },
    /// `field` immediately followed by an operator, e.g. `mv<=`.
    FieldOp { field: String, op: CompareOp },
    /// `!` before a word or quoted string: exact card name.
    Bang,
    LParen,
    RParen,
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            span: Span { start, end },
        }
    }

    /// Tokens that can begin an atom (and so continue an implicit AND).
    pub fn starts_atom(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Word(_)
                | TokenKind::QuotedString(_)
                | TokenKind::Regex { .. }
                | TokenKind::FieldOp { .. }
                | TokenKind::Bang
                | TokenKind::LParen
                | TokenKind::Not
        )
    }

    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Word(word) => format!("'{word}'"),
            TokenKind::QuotedString(text) => format!("\"{text}\""),
            TokenKind::Regex { pattern, flags } => format!("/{pattern}/{flags}"),
            TokenKind::FieldOp { field, op } => format!("'{field}{op}'"),
            TokenKind::Bang => "'!'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::And => "AND".to_string(),
            TokenKind::Or => "OR".to_string(),
            TokenKind::Not => "'-'".to_string(),
        }
    }
}

/// Splits query text into tokens.
///
/// Fails only on unterminated quoted strings and regex literals.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        input,
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

fn ends_word(ch: char) -> bool {
    ch.is_whitespace() || ch == '(' || ch == ')'
}

impl Lexer<'_> {
    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, start, self.pos));
    }

    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                _ if ch.is_whitespace() => self.pos += ch.len_utf8(),
                '(' => {
                    self.pos += 1;
                    self.push(TokenKind::LParen, start);
                }
                ')' => {
                    self.pos += 1;
                    self.push(TokenKind::RParen, start);
                }
                _ => self.lex_atom()?,
            }
        }
        Ok(())
    }

    fn lex_atom(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let next = self.peek_second();
        match self.peek() {
            // Negation only when `-` leads the atom and something follows it.
            Some('-') if next.is_some_and(|ch| !ch.is_whitespace() && ch != ')') => {
                self.pos += 1;
                self.push(TokenKind::Not, start);
                return Ok(());
            }
            Some('!')
                if next.is_some_and(|ch| !ch.is_whitespace() && !matches!(ch, ')' | '=')) =>
            {
                self.pos += 1;
                self.push(TokenKind::Bang, start);
                return Ok(());
            }
            Some('"') => return self.lex_quoted(),
            Some('/') => return self.lex_regex(),
            _ => {}
        }

        if let Some((field, op, len)) = self.field_prefix() {
            self.pos += len;
            self.push(TokenKind::FieldOp { field, op }, start);
            return self.lex_value();
        }

        let word = self.take_word();
        let kind = if word.eq_ignore_ascii_case("or") {
            TokenKind::Or
        } else if word.eq_ignore_ascii_case("and") {
            TokenKind::And
        } else {
            TokenKind::Word(word)
        };
        self.push(kind, start);
        Ok(())
    }

    /// The value right after a field operator. `-` here is a sign, not negation.
    fn lex_value(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Some('"') => self.lex_quoted(),
            Some('/') => self.lex_regex(),
            Some(ch) if !ends_word(ch) => {
                let start = self.pos;
                let word = self.take_word();
                self.push(TokenKind::Word(word), start);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Matches `identifier operator` at the cursor without consuming it.
    fn field_prefix(&self) -> Option<(String, CompareOp, usize)> {
        let rest = self.rest();
        if !rest.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            return None;
        }
        let ident_len = rest
            .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
            .unwrap_or(rest.len());
        let (op, op_len) = CompareOp::match_prefix(&rest[ident_len..])?;
        Some((rest[..ident_len].to_string(), op, ident_len + op_len))
    }

    fn take_word(&mut self) -> String {
        let rest = self.rest();
        let len = rest.find(ends_word).unwrap_or(rest.len());
        let word = rest[..len].to_string();
        self.pos += len;
        word
    }

    fn lex_quoted(&mut self) -> Result<(), ParseError> {
        let input = self.input;
        let start = self.pos;
        let mut text = String::new();
        let mut chars = input[start..].char_indices().skip(1);
        while let Some((idx, ch)) = chars.next() {
            match ch {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        text.push(escaped);
                    }
                }
                '"' => {
                    self.pos += idx + 1;
                    self.push(TokenKind::QuotedString(text), start);
                    return Ok(());
                }
                _ => text.push(ch),
            }
        }
        Err(ParseError::new(
            ParseErrorKind::UnterminatedString,
            start,
            "missing closing '\"'",
        ))
    }

    fn lex_regex(&mut self) -> Result<(), ParseError> {
        let input = self.input;
        let start = self.pos;
        let mut pattern = String::new();
        let mut chars = input[start..].char_indices().skip(1);
        while let Some((idx, ch)) = chars.next() {
            match ch {
                '\\' => match chars.next() {
                    Some((_, '/')) => pattern.push('/'),
                    Some((_, escaped)) => {
                        pattern.push('\\');
                        pattern.push(escaped);
                    }
                    None => pattern.push('\\'),
                },
                '/' => {
                    self.pos += idx + 1;
                    let rest = self.rest();
                    let flags_len = rest
                        .find(|ch: char| !ch.is_ascii_alphanumeric())
                        .unwrap_or(rest.len());
                    let flags = rest[..flags_len].to_string();
                    self.pos += flags_len;
                    self.push(TokenKind::Regex { pattern, flags }, start);
                    return Ok(());
                }
                _ => pattern.push(ch),
            }
        }
        Err(ParseError::new(
            ParseErrorKind::UnterminatedRegex,
            start,
            "missing closing '/' for regex",
        ))
    }
}
