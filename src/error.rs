//! Errors surfaced while parsing queries and loading card corpora.

use std::fmt;

use thiserror::Error;

/// What went wrong while turning query text into a [`crate::Query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ParseErrorKind {
    UnexpectedToken,
    UnknownField,
    InvalidComparisonValue,
    UnterminatedString,
    UnterminatedRegex,
    UnbalancedParens,
    /// The operator has no meaning for the field, e.g. `o<dragon`.
    UnsupportedOperator,
    /// A regex literal failed to compile or carried an unknown flag.
    InvalidRegex,
    /// The input held no search terms at all.
    EmptyQuery,
}

impl ParseErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnexpectedToken => "unexpected token",
            Self::UnknownField => "unknown field",
            Self::InvalidComparisonValue => "invalid comparison value",
            Self::UnterminatedString => "unterminated string",
            Self::UnterminatedRegex => "unterminated regex",
            Self::UnbalancedParens => "unbalanced parentheses",
            Self::UnsupportedOperator => "unsupported operator",
            Self::InvalidRegex => "invalid regex",
            Self::EmptyQuery => "empty query",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query parse failure, positioned at a byte offset into the input.
///
/// `message` is written for display directly under a search box.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[error("{message} (at byte {offset})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            message: message.into(),
        }
    }

    /// Renders the query with a caret under the failing position:
    ///
    /// ```text
    /// t:creature (o:flying
    ///            ^ unclosed '('
    /// ```
    pub fn caret(&self, input: &str) -> String {
        let mut offset = self.offset.min(input.len());
        while !input.is_char_boundary(offset) {
            offset -= 1;
        }
        let column = input[..offset].chars().count();
        format!("{input}\n{}^ {}", " ".repeat(column), self.message)
    }
}

/// Failure to read a card corpus from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read card corpus: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "serialization")]
    #[error("failed to parse card corpus: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offset() {
        let err = ParseError::new(ParseErrorKind::UnknownField, 4, "unknown field 'foo'");
        assert_eq!(err.to_string(), "unknown field 'foo' (at byte 4)");
    }

    #[test]
    fn caret_points_at_offset() {
        let err = ParseError::new(ParseErrorKind::UnbalancedParens, 2, "unclosed '('");
        assert_eq!(err.caret("a (b"), "a (b\n  ^ unclosed '('");
    }

    #[test]
    fn caret_counts_characters_not_bytes() {
        let err = ParseError::new(ParseErrorKind::UnexpectedToken, 7, "here");
        // "Æther " is 7 bytes but 6 characters.
        assert_eq!(err.caret("Æther x"), "Æther x\n      ^ here");
    }

    #[test]
    fn caret_clamps_past_end() {
        let err = ParseError::new(ParseErrorKind::UnexpectedToken, 99, "end");
        assert_eq!(err.caret("ab"), "ab\n  ^ end");
    }
}
