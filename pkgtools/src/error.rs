//! Error types shared by the parsers and comparators.

use thiserror::Error;

/// Result type for pkgtools operations.
pub type PkgResult<T> = Result<T, PkgError>;

/// Errors raised while parsing identifiers, records and command lines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PkgError {
    /// Input does not have the expected shape.
    #[error("{input}: {reason}")]
    Format { input: String, reason: String },

    /// The shell lexer reached end of input inside a quote or escape.
    #[error("unmatched {quote} in: {rest}")]
    UnterminatedQuote { quote: char, rest: String },

    /// The two operands cannot be ordered against each other.
    #[error("comparison between {left} and {right} is not supported")]
    UnsupportedComparison { left: String, right: String },

    /// A date expression could not be resolved to an instant.
    #[error("{input}: unrecognized date or package name")]
    InvalidDate { input: String },
}

impl PkgError {
    /// Shorthand for a [`PkgError::Format`].
    pub fn format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
