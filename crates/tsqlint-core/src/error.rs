//! Error types for parsing and configuration.
//!
//! # Error Handling Strategy
//!
//! Only the edges of the crate can fail:
//!
//! - [`ParseError`]: the T-SQL front-end could not build a syntax tree. Rules
//!   never see a partially parsed script.
//!
//! - [`ConfigError`]: a host supplied a lint configuration that could not be
//!   decoded.
//!
//! Rule analysis itself is infallible. Anything a rule cannot determine
//! (missing spans, names that cannot be canonicalized, expressions without an
//! identity key) resolves to "no violation" locally and is never surfaced as an
//! error.

use std::fmt;
use thiserror::Error;

/// Position information for a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Error encountered while turning T-SQL text into a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The tokenizer rejected the input (unterminated string, bad delimiter, ...).
    #[error("tokenizer error: {message}")]
    Tokenize {
        message: String,
        position: Option<Position>,
    },

    /// A token appeared where the grammar expected something else.
    #[error("expected {expected}, found `{found}` at {position}")]
    Unexpected {
        expected: String,
        found: String,
        position: Position,
    },

    /// Input ended in the middle of a construct.
    #[error("expected {expected}, found end of input")]
    UnexpectedEof { expected: String },

    /// The statement is valid T-SQL but outside the supported subset.
    #[error("unsupported statement `{keyword}` at {position}")]
    Unsupported { keyword: String, position: Position },

    /// Expressions or queries nested deeper than the parser allows.
    #[error("nesting depth limit of {limit} exceeded at {position}")]
    DepthLimit { limit: usize, position: Position },
}

impl ParseError {
    /// Returns the source position of the error, when known.
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Tokenize { position, .. } => *position,
            Self::Unexpected { position, .. }
            | Self::Unsupported { position, .. }
            | Self::DepthLimit { position, .. } => Some(*position),
            Self::UnexpectedEof { .. } => None,
        }
    }
}

impl From<sqlparser::tokenizer::TokenizerError> for ParseError {
    fn from(err: sqlparser::tokenizer::TokenizerError) -> Self {
        let position = (err.location.line > 0).then(|| {
            Position::new(err.location.line as usize, err.location.column as usize)
        });

        Self::Tokenize {
            message: err.message,
            position,
        }
    }
}

/// Error encountered while loading a lint configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid lint configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown rule id `{0}` in disabledRules")]
    UnknownRule(String),
}
