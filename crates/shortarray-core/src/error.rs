//! Errors raised while converting lexer output

use thiserror::Error;

/// Errors that can occur while normalizing or rewriting a token stream
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The lexer output could not be decoded as `{ "tokens": [...] }`
    #[error("input is not well-formed")]
    NotWellFormed(#[source] serde_json::Error),

    /// The `tokens` field is absent, null or empty
    #[error("input is missing required token data")]
    MissingTokens,

    /// A token record or a detected occurrence broke a stream invariant
    #[error("malformed token stream at index {index}: {reason}")]
    MalformedStream { index: usize, reason: String },
}

impl ConvertError {
    /// Whether this error comes from undecodable or incomplete input
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ConvertError::NotWellFormed(_) | ConvertError::MissingTokens)
    }

    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        ConvertError::MalformedStream {
            index,
            reason: reason.into(),
        }
    }
}
