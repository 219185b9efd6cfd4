//! Uniform token model shared by the normalizer and the rewriter

use std::fmt;

/// Classification of a lexical token
///
/// Only the kinds the rewriter looks at get their own variant. Every other
/// classification, including the raw integer ids the lexer emits for token
/// types it does not name, is carried as opaque `Other` data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `T_OPEN_TAG`, e.g. `<?php `
    OpenTag,
    /// `T_ARRAY`, the `array` construction keyword
    ArrayKeyword,
    /// `T_WHITESPACE`
    Whitespace,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// Any other classification
    Other(String),
}

impl TokenKind {
    /// Parse a kind from the name the lexer uses for it
    pub fn from_name(name: &str) -> Self {
        match name {
            "T_OPEN_TAG" => TokenKind::OpenTag,
            "T_ARRAY" => TokenKind::ArrayKeyword,
            "T_WHITESPACE" => TokenKind::Whitespace,
            "(" => TokenKind::OpenParen,
            ")" => TokenKind::CloseParen,
            other => TokenKind::Other(other.to_string()),
        }
    }

    /// Kind for a numeric token id the lexer did not map to a name
    pub fn from_id(id: i64) -> Self {
        TokenKind::Other(id.to_string())
    }

    /// The lexer name of this kind
    pub fn name(&self) -> &str {
        match self {
            TokenKind::OpenTag => "T_OPEN_TAG",
            TokenKind::ArrayKeyword => "T_ARRAY",
            TokenKind::Whitespace => "T_WHITESPACE",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::Other(name) => name,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single token: classification, exact source text and 1-based line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: Option<u32>,
}

impl Token {
    /// Create a classified token
    pub fn new(kind: TokenKind, text: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }

    /// Create a literal token whose kind is its own text
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind: TokenKind::from_name(&text),
            text,
            line: None,
        }
    }

    pub fn is(&self, kind: &TokenKind) -> bool {
        &self.kind == kind
    }
}

/// Concatenate the text of every token, reproducing the lexed source
pub fn source_text(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(|t| t.text.len()).sum());
    for token in tokens {
        out.push_str(&token.text);
    }
    out
}

/// Position of a token inside the lexed source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Byte offset from the start of the source
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Location {
    /// Locate the token at `index`
    ///
    /// Computed from the token texts rather than the lexer line numbers, which
    /// literal tokens do not carry.
    pub fn of(tokens: &[Token], index: usize) -> Self {
        let mut offset = 0;
        let mut line = 1;
        let mut column = 1;

        for token in tokens.iter().take(index) {
            offset += token.text.len();
            for ch in token.text.chars() {
                if ch == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }
        }

        Self {
            offset,
            line,
            column,
        }
    }
}
