//! Recursive-descent query parser.
//!
//! Precedence, loosest first: `OR`, then `AND` (explicit or by juxtaposition),
//! then unary `-`. Parentheses group.
//!
//! ```text
//! query      := or_expr
//! or_expr    := and_expr (OR and_expr)*
//! and_expr   := atom ([AND] atom)*
//! atom       := '-' atom | '(' or_expr ')' | comparison | '!' name | bare_term
//! ```

use crate::ast::{CompareOp, Query, RegexLiteral, STACK_GROWTH, STACK_RED_ZONE, Value};
use crate::card::{CARD_FLAGS, FORMATS, Rarity};
use crate::color::parse_colors;
use crate::config::{ParserSettings, parser_trace_enabled};
use crate::error::{ParseError, ParseErrorKind};
use crate::field::{FieldId, FieldKind, dispatch};
use crate::token::{Span, Token, TokenKind, tokenize};

type PResult<T> = Result<T, ParseError>;

/// Result of a parse that may have collected several errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    /// Best-effort query built from the clauses that parsed.
    pub query: Option<Query>,
    pub errors: Vec<ParseError>,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty() && self.query.is_some()
    }

    /// First error wins; a partial query is never returned alongside errors.
    pub fn into_result(self) -> Result<Query, ParseError> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }
        self.query
            .ok_or_else(|| ParseError::new(ParseErrorKind::EmptyQuery, 0, "enter a search term"))
    }
}

/// Parses a query, stopping at the first error.
pub fn parse(input: &str) -> Result<Query, ParseError> {
    let settings = ParserSettings {
        trace: parser_trace_enabled(),
        recover: false,
    };
    parse_with(input, &settings).into_result()
}

/// Parses a query, skipping malformed clauses and reporting every error.
pub fn parse_recovering(input: &str) -> ParseOutcome {
    parse_with(input, &ParserSettings::from_env().recovering())
}

pub fn parse_with(input: &str, settings: &ParserSettings) -> ParseOutcome {
    let tokens = match tokenize(input) {
        Ok(tokens) => tokens,
        Err(error) => {
            return ParseOutcome {
                query: None,
                errors: vec![error],
            };
        }
    };
    if settings.trace {
        log::trace!("tokens for {input:?}: {tokens:?}");
    }

    let mut parser = Parser {
        input,
        tokens,
        index: 0,
        recover: settings.recover,
        trace: settings.trace,
        errors: Vec::new(),
    };
    match parser.parse_query() {
        Ok(query) => {
            if settings.trace
                && let Some(query) = &query
            {
                log::trace!("parsed {input:?} as {query:?}");
            }
            ParseOutcome {
                query,
                errors: parser.errors,
            }
        }
        Err(error) => ParseOutcome {
            query: None,
            errors: vec![error],
        },
    }
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    index: usize,
    recover: bool,
    trace: bool,
    errors: Vec<ParseError>,
}

fn join(
    left: Option<Query>,
    right: Option<Query>,
    combine: fn(Query, Query) -> Query,
) -> Option<Query> {
    match (left, right) {
        (Some(left), Some(right)) => Some(combine(left, right)),
        (left, right) => left.or(right),
    }
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek().is_some_and(|token| &token.kind == kind)
    }

    fn at_atom(&self) -> bool {
        self.peek().is_some_and(Token::starts_atom)
    }

    fn offset(&self) -> usize {
        self.peek()
            .map_or(self.input.len(), |token| token.span.start)
    }

    /// Strict mode returns the error; recovering mode keeps it and goes on.
    fn record(
        &mut self,
        kind: ParseErrorKind,
        offset: usize,
        message: impl Into<String>,
    ) -> PResult<()> {
        let error = ParseError::new(kind, offset, message);
        if !self.recover {
            return Err(error);
        }
        if self.trace {
            log::trace!("recovering from {error}");
        }
        self.errors.push(error);
        Ok(())
    }

    /// Records an error for the atom that began at `start` and drops it.
    fn fail(
        &mut self,
        kind: ParseErrorKind,
        offset: usize,
        message: impl Into<String>,
        start: usize,
    ) -> PResult<Option<Query>> {
        self.record(kind, offset, message)?;
        if self.index == start && self.peek().is_some() {
            self.index += 1;
        }
        Ok(None)
    }

    fn parse_query(&mut self) -> PResult<Option<Query>> {
        if self.tokens.is_empty() {
            self.record(ParseErrorKind::EmptyQuery, 0, "enter a search term")?;
            return Ok(None);
        }

        let mut query = self.parse_or(0)?;
        // Only an unmatched ')' stops a top-level or_expr early.
        while let Some(token) = self.peek() {
            let offset = token.span.start;
            self.index += 1;
            self.record(ParseErrorKind::UnbalancedParens, offset, "unmatched ')'")?;
            if self.peek().is_some() {
                let rest = self.parse_or(0)?;
                query = join(query, rest, Query::and);
            }
        }
        Ok(query)
    }

    fn parse_or(&mut self, depth: usize) -> PResult<Option<Query>> {
        let mut leading_or = false;
        while self.at(&TokenKind::Or) {
            let offset = self.offset();
            self.index += 1;
            leading_or = true;
            self.record(
                ParseErrorKind::UnexpectedToken,
                offset,
                "OR needs a search term on both sides",
            )?;
        }
        if leading_or && !self.at_atom() && !self.at(&TokenKind::And) {
            return Ok(None);
        }

        let mut query = self.parse_and(depth)?;
        while self.at(&TokenKind::Or) {
            let offset = self.offset();
            self.index += 1;
            if !self.at_atom() && !self.at(&TokenKind::And) {
                self.record(
                    ParseErrorKind::UnexpectedToken,
                    offset,
                    "OR needs a search term on both sides",
                )?;
                continue;
            }
            let right = self.parse_and(depth)?;
            query = join(query, right, Query::or);
        }
        Ok(query)
    }

    fn parse_and(&mut self, depth: usize) -> PResult<Option<Query>> {
        let mut query = None;
        let mut first = true;
        loop {
            if self.at(&TokenKind::And) {
                let offset = self.offset();
                self.index += 1;
                if first || !self.at_atom() {
                    self.record(
                        ParseErrorKind::UnexpectedToken,
                        offset,
                        "AND needs a search term on both sides",
                    )?;
                }
                continue;
            }
            if !first && !self.at_atom() {
                break;
            }
            first = false;

            let clause = self.parse_atom(depth)?;
            if self.trace
                && let Some(clause) = &clause
            {
                log::trace!("clause: {clause}");
            }
            query = join(query, clause, Query::and);
        }
        Ok(query)
    }

    fn parse_atom(&mut self, depth: usize) -> PResult<Option<Query>> {
        let start = self.index;
        let Some(token) = self.peek().cloned() else {
            return self.fail(
                ParseErrorKind::UnexpectedToken,
                self.input.len(),
                "expected a search term at end of query",
                start,
            );
        };

        match token.kind {
            TokenKind::RParen if depth > 0 => {
                // Leave it for the enclosing group to close on.
                self.record(
                    ParseErrorKind::UnexpectedToken,
                    token.span.start,
                    "expected a search term before ')'",
                )?;
                Ok(None)
            }
            TokenKind::RParen => self.fail(
                ParseErrorKind::UnbalancedParens,
                token.span.start,
                "unmatched ')'",
                start,
            ),
            TokenKind::Or | TokenKind::And => self.fail(
                ParseErrorKind::UnexpectedToken,
                token.span.start,
                format!("expected a search term, found {}", token.describe()),
                start,
            ),
            TokenKind::LParen => {
                self.index += 1;
                self.parse_group(token.span, depth)
            }
            TokenKind::Word(text) | TokenKind::QuotedString(text) => {
                self.index += 1;
                Ok(Some(Query::bare(text)))
            }
            TokenKind::Regex { pattern, flags } => {
                self.index += 1;
                match RegexLiteral::new(pattern, flags) {
                    Ok(regex) => Ok(Some(Query::BareRegex { regex })),
                    Err(message) => {
                        self.fail(ParseErrorKind::InvalidRegex, token.span.start, message, start)
                    }
                }
            }
            TokenKind::Bang => {
                self.index += 1;
                self.parse_exact_name(token.span, start)
            }
            TokenKind::FieldOp { field, op } => {
                self.index += 1;
                self.parse_comparison(&field, op, token.span, start)
            }
            TokenKind::Not => {
                self.index += 1;
                let inner =
                    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || self.parse_atom(depth))?;
                Ok(inner.map(Query::negate))
            }
        }
    }

    fn parse_group(&mut self, open: Span, depth: usize) -> PResult<Option<Query>> {
        if self.at(&TokenKind::RParen) {
            let offset = self.offset();
            self.index += 1;
            self.record(ParseErrorKind::UnexpectedToken, offset, "empty parentheses")?;
            return Ok(None);
        }
        if self.peek().is_none() {
            self.record(ParseErrorKind::UnbalancedParens, open.start, "unclosed '('")?;
            return Ok(None);
        }

        let inner =
            stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || self.parse_or(depth + 1))?;
        if self.at(&TokenKind::RParen) {
            self.index += 1;
        } else {
            self.record(ParseErrorKind::UnbalancedParens, open.start, "unclosed '('")?;
        }
        Ok(inner)
    }

    fn parse_exact_name(&mut self, bang: Span, start: usize) -> PResult<Option<Query>> {
        let name = match self.peek() {
            Some(Token {
                kind: TokenKind::Word(text) | TokenKind::QuotedString(text),
                span,
            }) if span.start == bang.end => Some(text.clone()),
            _ => None,
        };
        let Some(name) = name else {
            return self.fail(
                ParseErrorKind::UnexpectedToken,
                bang.end,
                "expected a card name after '!'",
                start,
            );
        };
        self.index += 1;
        Ok(Some(Query::comparison(
            FieldId::Name,
            CompareOp::Eq,
            Value::Text(name),
        )))
    }

    fn parse_comparison(
        &mut self,
        name: &str,
        op: CompareOp,
        span: Span,
        start: usize,
    ) -> PResult<Option<Query>> {
        // Take the value first so a rejected clause is dropped whole.
        let value_token = self
            .peek()
            .filter(|token| {
                token.span.start == span.end
                    && matches!(
                        token.kind,
                        TokenKind::Word(_) | TokenKind::QuotedString(_) | TokenKind::Regex { .. }
                    )
            })
            .cloned();
        if value_token.is_some() {
            self.index += 1;
        }

        let Some(field) = FieldId::resolve(name) else {
            return self.fail(
                ParseErrorKind::UnknownField,
                span.start,
                format!("unknown field '{name}'"),
                start,
            );
        };
        if dispatch(field, op).is_none() {
            return self.fail(
                ParseErrorKind::UnsupportedOperator,
                span.start,
                format!("'{op}' cannot be used with {name}"),
                start,
            );
        }
        let Some(value_token) = value_token else {
            return self.fail(
                ParseErrorKind::InvalidComparisonValue,
                span.end,
                format!("missing value after '{name}{op}'"),
                start,
            );
        };

        match comparison_value(field, name, &value_token) {
            Ok(value) => Ok(Some(Query::comparison(field, op, value))),
            Err(error) => {
                self.record(error.kind, error.offset, error.message)?;
                Ok(None)
            }
        }
    }
}

/// Types a comparison value according to the field it is compared against.
fn comparison_value(field: FieldId, name: &str, token: &Token) -> PResult<Value> {
    let offset = token.span.start;
    let invalid = |message: String| {
        ParseError::new(ParseErrorKind::InvalidComparisonValue, offset, message)
    };

    let text = match &token.kind {
        TokenKind::Regex { pattern, flags } => {
            return match field.kind() {
                FieldKind::Text | FieldKind::Code => {
                    RegexLiteral::new(pattern.as_str(), flags.as_str())
                        .map(Value::Regex)
                        .map_err(|message| {
                            ParseError::new(ParseErrorKind::InvalidRegex, offset, message)
                        })
                }
                _ => Err(invalid(format!("{name} does not accept a regex"))),
            };
        }
        TokenKind::Word(text) | TokenKind::QuotedString(text) => text,
        _ => return Err(invalid(format!("missing value after '{name}'"))),
    };

    match field.kind() {
        FieldKind::Text | FieldKind::Code => Ok(Value::Text(text.clone())),
        FieldKind::Color => Ok(Value::ColorSetLiteral(parse_colors(text))),
        FieldKind::Numeric => match text.parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(Value::Number(number)),
            _ => Err(invalid(format!("{name} expects a number, found '{text}'"))),
        },
        FieldKind::Rarity => Rarity::parse(text)
            .map(|rarity| Value::Keyword(rarity.as_str().to_string()))
            .ok_or_else(|| invalid(format!("unknown rarity '{text}'"))),
        FieldKind::Predicate => predicate_keyword(field, name, text)
            .ok_or_else(|| invalid(format!("unknown {name}: keyword '{text}'"))),
    }
}

fn predicate_keyword(field: FieldId, name: &str, text: &str) -> Option<Value> {
    let keyword = text.to_ascii_lowercase();
    let known = match field {
        FieldId::Is => CARD_FLAGS.contains(&keyword.as_str()),
        FieldId::Format => FORMATS.contains(&keyword.as_str()),
        FieldId::Has => {
            return FieldId::resolve(&keyword)
                .filter(|target| target.is_optional())
                .map(|target| Value::Keyword(target.code().to_string()));
        }
        _ => {
            log::debug!("{name}: is not a predicate field");
            false
        }
    };
    known.then_some(Value::Keyword(keyword))
}
