//! Runtime settings for parsing and searching.
//!
//! Parser switches come from the environment so tools and tests can flip them
//! without threading flags through every call:
//!
//! - `CARDQL_PARSER_TRACE=1` logs the token stream and each parsed clause.
//! - `CARDQL_PARSER_RECOVER=1` keeps parsing past errors and reports them all.

pub const PARSER_TRACE_VAR: &str = "CARDQL_PARSER_TRACE";
pub const PARSER_RECOVER_VAR: &str = "CARDQL_PARSER_RECOVER";

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}

pub fn parser_trace_enabled() -> bool {
    env_flag(PARSER_TRACE_VAR)
}

pub fn parser_recover_enabled() -> bool {
    env_flag(PARSER_RECOVER_VAR)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserSettings {
    /// Log tokens and parsed clauses at trace level.
    pub trace: bool,
    /// Collect every error instead of stopping at the first.
    pub recover: bool,
}

impl ParserSettings {
    pub fn from_env() -> Self {
        Self {
            trace: parser_trace_enabled(),
            recover: parser_recover_enabled(),
        }
    }

    pub fn recovering(mut self) -> Self {
        self.recover = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchSettings {
    /// Scan the corpus on the rayon thread pool.
    pub parallel: bool,
    /// Stop after this many matches.
    pub limit: Option<usize>,
}
