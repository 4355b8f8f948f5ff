//! The query AST.
//!
//! A parsed [`Query`] owns all of its data: nothing borrows from the input
//! text or the token stream, so one AST can be cached, shipped across threads
//! and evaluated against any number of cards.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::color::ColorSet;
use crate::field::FieldId;

/// Comparison operators. Their meaning depends on the field's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    /// `:`, the field's default comparison (contains, superset, or equals).
    Colon,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Operator spellings, longest first so prefixes never shadow `<=`/`>=`/`!=`.
    pub const SPELLINGS: [(&'static str, CompareOp); 7] = [
        ("!=", CompareOp::Ne),
        ("<=", CompareOp::Le),
        (">=", CompareOp::Ge),
        (":", CompareOp::Colon),
        ("=", CompareOp::Eq),
        ("<", CompareOp::Lt),
        (">", CompareOp::Gt),
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CompareOp::Colon => ":",
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Matches an operator at the start of `text`, returning it and its length.
    pub fn match_prefix(text: &str) -> Option<(CompareOp, usize)> {
        Self::SPELLINGS
            .iter()
            .find(|(spelling, _)| text.starts_with(spelling))
            .map(|(spelling, op)| (*op, spelling.len()))
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `/pattern/flags` literal, compiled once when it is built.
///
/// Supported flags: `i` (case-insensitive), `m` (multi-line), `s` (dot
/// matches newline), `x` (ignore whitespace).
#[derive(Clone)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RegexSource", into = "RegexSource")
)]
pub struct RegexLiteral {
    pattern: String,
    flags: String,
    compiled: Regex,
}

impl RegexLiteral {
    pub fn new(pattern: impl Into<String>, flags: impl Into<String>) -> Result<Self, String> {
        let pattern = pattern.into();
        let flags = flags.into();
        let mut builder = RegexBuilder::new(&pattern);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                other => return Err(format!("unknown regex flag '{other}'")),
            };
        }
        let compiled = builder.build().map_err(|err| err.to_string())?;
        Ok(Self {
            pattern,
            flags,
            compiled,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// True if the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.is_match(text)
    }
}

impl PartialEq for RegexLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.flags == other.flags
    }
}

impl fmt::Debug for RegexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegexLiteral({self})")
    }
}

impl fmt::Display for RegexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.pattern.replace('/', "\\/"), self.flags)
    }
}

#[cfg(feature = "serialization")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RegexSource {
    pattern: String,
    #[serde(default)]
    flags: String,
}

#[cfg(feature = "serialization")]
impl TryFrom<RegexSource> for RegexLiteral {
    type Error = String;

    fn try_from(source: RegexSource) -> Result<Self, Self::Error> {
        RegexLiteral::new(source.pattern, source.flags)
    }
}

#[cfg(feature = "serialization")]
impl From<RegexLiteral> for RegexSource {
    fn from(literal: RegexLiteral) -> Self {
        RegexSource {
            pattern: literal.pattern,
            flags: literal.flags,
        }
    }
}

/// The right-hand side of a comparison, already typed for its field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Text(String),
    Number(f64),
    ColorSetLiteral(ColorSet),
    Regex(RegexLiteral),
    /// A validated keyword for `is:`, `f:`, `has:` and `r:`.
    Keyword(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => write_text(f, text),
            Value::Number(number) => write!(f, "{number}"),
            Value::ColorSetLiteral(set) if set.is_empty() => f.write_str("c"),
            Value::ColorSetLiteral(set) => f.write_str(&set.symbols().to_ascii_lowercase()),
            Value::Regex(regex) => write!(f, "{regex}"),
            Value::Keyword(keyword) => f.write_str(keyword),
        }
    }
}

/// Stack headroom for recursion over query trees; below this, a fresh
/// segment of [`STACK_GROWTH`] bytes is allocated.
pub(crate) const STACK_RED_ZONE: usize = 32 * 1024;
pub(crate) const STACK_GROWTH: usize = 1024 * 1024;

/// A parsed query.
///
/// `And` and `Or` are n-ary: the constructors splice same-operator chains
/// into one clause list, so `a b c` is a single `And` of three clauses and
/// tree depth only grows with alternation, grouping and negation.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Query {
    /// Matches when any clause matches.
    Or(Vec<Query>),
    /// Matches when every clause matches.
    And(Vec<Query>),
    Not(Box<Query>),
    Comparison {
        field: FieldId,
        op: CompareOp,
        value: Value,
    },
    /// A term with no field, matched against the card name.
    BareTerm { text: String },
    /// A regex with no field, matched against the card name.
    BareRegex { regex: RegexLiteral },
}

impl Query {
    pub fn or(left: Query, right: Query) -> Self {
        let mut clauses = left.into_clauses(true);
        clauses.extend(right.into_clauses(true));
        Query::Or(clauses)
    }

    pub fn and(left: Query, right: Query) -> Self {
        let mut clauses = left.into_clauses(false);
        clauses.extend(right.into_clauses(false));
        Query::And(clauses)
    }

    pub fn negate(inner: Query) -> Self {
        Query::Not(Box::new(inner))
    }

    pub fn comparison(field: FieldId, op: CompareOp, value: Value) -> Self {
        Query::Comparison { field, op, value }
    }

    pub fn bare(text: impl Into<String>) -> Self {
        Query::BareTerm { text: text.into() }
    }

    /// Clause list of an `Or` (or `And`) node, or the node itself.
    fn into_clauses(mut self, or: bool) -> Vec<Query> {
        let splice = matches!((&self, or), (Query::Or(_), true) | (Query::And(_), false));
        if !splice {
            return vec![self];
        }
        match &mut self {
            Query::Or(clauses) | Query::And(clauses) => std::mem::take(clauses),
            _ => Vec::new(),
        }
    }

    /// Moves direct children onto `stack`, leaving `self` childless.
    fn detach_children(&mut self, stack: &mut Vec<Query>) {
        match self {
            Query::Or(clauses) | Query::And(clauses) => stack.append(clauses),
            Query::Not(inner) => stack.push(std::mem::replace(&mut **inner, Query::bare(""))),
            _ => {}
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Query::Or(..) => 1,
            Query::And(..) => 2,
            _ => 3,
        }
    }

    fn write_child(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }

    fn write_clauses(
        f: &mut fmt::Formatter<'_>,
        clauses: &[Query],
        separator: &str,
        min_precedence: u8,
    ) -> fmt::Result {
        for (index, clause) in clauses.iter().enumerate() {
            if index > 0 {
                f.write_str(separator)?;
            }
            clause.write_child(f, min_precedence)?;
        }
        Ok(())
    }
}

/// Tears the tree down with an explicit work list so deep queries cannot
/// overflow the stack.
impl Drop for Query {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.detach_children(&mut stack);
        while let Some(mut node) = stack.pop() {
            node.detach_children(&mut stack);
        }
    }
}

impl Clone for Query {
    fn clone(&self) -> Self {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || match self {
            Query::Or(clauses) => Query::Or(clauses.clone()),
            Query::And(clauses) => Query::And(clauses.clone()),
            Query::Not(inner) => Query::Not(inner.clone()),
            Query::Comparison { field, op, value } => Query::Comparison {
                field: *field,
                op: *op,
                value: value.clone(),
            },
            Query::BareTerm { text } => Query::BareTerm { text: text.clone() },
            Query::BareRegex { regex } => Query::BareRegex {
                regex: regex.clone(),
            },
        })
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || match (self, other) {
            (Query::Or(left), Query::Or(right)) | (Query::And(left), Query::And(right)) => {
                left == right
            }
            (Query::Not(left), Query::Not(right)) => left == right,
            (
                Query::Comparison { field, op, value },
                Query::Comparison {
                    field: other_field,
                    op: other_op,
                    value: other_value,
                },
            ) => field == other_field && op == other_op && value == other_value,
            (Query::BareTerm { text }, Query::BareTerm { text: other_text }) => text == other_text,
            (Query::BareRegex { regex }, Query::BareRegex { regex: other_regex }) => {
                regex == other_regex
            }
            _ => false,
        })
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || match self {
            Query::Or(clauses) => f.debug_tuple("Or").field(clauses).finish(),
            Query::And(clauses) => f.debug_tuple("And").field(clauses).finish(),
            Query::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Query::Comparison { field, op, value } => f
                .debug_struct("Comparison")
                .field("field", field)
                .field("op", op)
                .field("value", value)
                .finish(),
            Query::BareTerm { text } => f.debug_struct("BareTerm").field("text", text).finish(),
            Query::BareRegex { regex } => {
                f.debug_struct("BareRegex").field("regex", regex).finish()
            }
        })
    }
}

/// Renders query text that parses back to the same AST.
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || match self {
            Query::Or(clauses) => Query::write_clauses(f, clauses, " OR ", 2),
            Query::And(clauses) => Query::write_clauses(f, clauses, " ", 3),
            Query::Not(inner) => {
                f.write_str("-")?;
                inner.write_child(f, 3)
            }
            Query::Comparison { field, op, value } => {
                write!(f, "{}{op}{value}", field.code())
            }
            Query::BareTerm { text } => write_text(f, text),
            Query::BareRegex { regex } => write!(f, "{regex}"),
        })
    }
}

fn needs_quotes(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return true;
    };
    matches!(first, '-' | '!' | '/')
        || text.eq_ignore_ascii_case("or")
        || text.eq_ignore_ascii_case("and")
        || !text.chars().all(|ch| {
            ch.is_alphanumeric() || matches!(ch, '_' | '\'' | ',' | '.' | '-' | '+' | '*')
        })
}

fn write_text(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if !needs_quotes(text) {
        return f.write_str(text);
    }
    f.write_str("\"")?;
    for ch in text.chars() {
        if matches!(ch, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{ch}")?;
    }
    f.write_str("\"")
}
