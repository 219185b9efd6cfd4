//! shortarray-core: Token-level conversion of PHP `array()` to `[]`
//!
//! This crate provides:
//! - `Token` / `TokenKind`: the uniform token model
//! - `normalize()`: decoding of the PHP lexer's `{ "tokens": [...] }` output
//! - `rewrite()`: replacement of every `array(...)` construction by `[...]`
//! - `convert()`: both steps in sequence, from lexer JSON to source text
//!
//! The lexer output is produced by PHP's `token_get_all()`, with `T_OPEN_TAG`,
//! `T_ARRAY` and `T_WHITESPACE` mapped to their names. Lexing itself happens
//! outside this crate.

mod error;
pub mod normalize;
pub mod open_tag;
pub mod rewrite;
mod token;

pub use error::ConvertError;
pub use normalize::{normalize, normalize_value, RawToken, Strictness};
pub use open_tag::{OpenTag, OPEN_TAG};
pub use rewrite::{find_occurrences, rewrite, Occurrence, Replacement, ReplacementMap, Rewrite};
pub use token::{source_text, Location, Token, TokenKind};

/// Convert lexer JSON output to source text with short array syntax
pub fn convert(json: &str) -> Result<String, ConvertError> {
    convert_with(json, Strictness::default()).map(|conversion| conversion.rewrite.text)
}

/// Convert lexer JSON output, keeping the tokens and detected occurrences
pub fn convert_with(json: &str, strictness: Strictness) -> Result<Conversion, ConvertError> {
    let tokens = normalize(json, strictness)?;
    let rewritten = rewrite(&tokens)?;
    Ok(Conversion {
        tokens,
        rewrite: rewritten,
    })
}

/// Full result of converting one lexer output
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The normalized input tokens
    pub tokens: Vec<Token>,
    /// The rewritten text and occurrences
    pub rewrite: Rewrite,
}

impl Conversion {
    /// The source text before conversion
    pub fn original(&self) -> String {
        source_text(&self.tokens)
    }

    pub fn text(&self) -> &str {
        &self.rewrite.text
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.rewrite.occurrences
    }
}
