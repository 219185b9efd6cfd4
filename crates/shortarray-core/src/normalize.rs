//! Normalization of raw lexer output into a uniform token sequence
//!
//! The lexer emits `{ "tokens": [...] }` where each element is either a
//! classified record `[kind, text, line]` or a bare string for single
//! character tokens such as `,` or `(`. Both forms become a [`Token`].

use serde::de::Error as _;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ConvertError;
use crate::token::{Token, TokenKind};

/// How strictly token records are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Trust the lexer: ill-shaped records are filled in on a best-effort basis
    #[default]
    Lenient,
    /// Reject any record that is not exactly `[kind, text, line]`
    Strict,
}

/// One element of the lexer's `tokens` array, as decoded
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawToken {
    /// A bare string such as `;`
    Literal(String),
    /// A `[kind, text, line]` record
    Record(Vec<Value>),
}

impl RawToken {
    /// Convert to a token; `index` is only used for error reporting
    pub fn into_token(self, index: usize, strictness: Strictness) -> Result<Token, ConvertError> {
        match self {
            RawToken::Literal(text) => Ok(Token::literal(text)),
            RawToken::Record(fields) => match strictness {
                Strictness::Lenient => Ok(record_lenient(fields)),
                Strictness::Strict => record_strict(fields, index),
            },
        }
    }
}

/// Decode lexer output from JSON text
pub fn normalize(json: &str, strictness: Strictness) -> Result<Vec<Token>, ConvertError> {
    let value: Value = serde_json::from_str(json).map_err(ConvertError::NotWellFormed)?;
    normalize_value(value, strictness)
}

/// Normalize an already-decoded lexer output value
pub fn normalize_value(value: Value, strictness: Strictness) -> Result<Vec<Token>, ConvertError> {
    let Value::Object(mut object) = value else {
        return Err(ConvertError::NotWellFormed(serde_json::Error::custom(
            "expected an object with a `tokens` field",
        )));
    };

    let tokens = match object.remove("tokens") {
        Some(tokens) if !is_empty_value(&tokens) => tokens,
        _ => return Err(ConvertError::MissingTokens),
    };
    let raw: Vec<RawToken> = Vec::deserialize(tokens).map_err(ConvertError::NotWellFormed)?;

    raw.into_iter()
        .enumerate()
        .map(|(index, token)| token.into_token(index, strictness))
        .collect()
}

/// Null, `false`, zero and empty strings, arrays or objects carry no tokens
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn kind_of(value: &Value) -> Option<TokenKind> {
    match value {
        Value::String(name) => Some(TokenKind::from_name(name)),
        Value::Number(n) => n.as_i64().map(TokenKind::from_id),
        _ => None,
    }
}

fn line_of(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|n| u32::try_from(n).ok())
}

fn record_lenient(fields: Vec<Value>) -> Token {
    let mut fields = fields.into_iter();
    let kind = fields
        .next()
        .and_then(|v| kind_of(&v))
        .unwrap_or_else(|| TokenKind::Other(String::new()));
    let text = match fields.next() {
        Some(Value::String(text)) => text,
        _ => String::new(),
    };
    let line = fields.next().as_ref().and_then(line_of);

    Token::new(kind, text, line)
}

fn record_strict(fields: Vec<Value>, index: usize) -> Result<Token, ConvertError> {
    let [kind, text, line]: [Value; 3] = fields.try_into().map_err(|fields: Vec<Value>| {
        ConvertError::malformed(index, format!("record has {} elements, expected 3", fields.len()))
    })?;

    let kind = kind_of(&kind)
        .ok_or_else(|| ConvertError::malformed(index, format!("invalid token kind {kind}")))?;
    let Value::String(text) = text else {
        return Err(ConvertError::malformed(index, "token text is not a string"));
    };
    let line = line_of(&line)
        .ok_or_else(|| ConvertError::malformed(index, format!("invalid line number {line}")))?;

    Ok(Token::new(kind, text, Some(line)))
}
