//! Rewriting of `array(...)` constructions into `[...]`
//!
//! The rewrite is lexical. Each `T_ARRAY` keyword followed (after optional
//! whitespace) by `(` is matched against its closing `)` by counting every
//! parenthesis in between, whatever expression it belongs to. The keyword
//! becomes `[`, the keyword-to-`(` gap disappears, the matching `)` becomes
//! `]` and every other token is kept verbatim.
//!
//! Anything that does not match cleanly (a keyword used as a plain word, an
//! unclosed parenthesis) is left untouched rather than reported.
//!
//! Matching rescans from each keyword, so densely nested input costs
//! quadratic time. Inputs are single source files, which keeps this cheap in
//! practice.

use crate::error::ConvertError;
use crate::token::{Location, Token, TokenKind};

/// A detected `array(...)` construction, as token indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// The `array` keyword
    pub keyword: usize,
    /// The opening parenthesis
    pub open: usize,
    /// The matching closing parenthesis
    pub close: usize,
}

impl Occurrence {
    /// Where the keyword sits in the original source
    pub fn location(&self, tokens: &[Token]) -> Location {
        Location::of(tokens, self.keyword)
    }

    /// Line number reported by the lexer for the keyword, if any
    pub fn line(&self, tokens: &[Token]) -> Option<u32> {
        tokens.get(self.keyword).and_then(|t| t.line)
    }
}

/// What to emit for a single token slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Replacement {
    #[default]
    Keep,
    OpenBracket,
    CloseBracket,
    Delete,
}

impl Replacement {
    /// Text emitted for the slot, falling back to the original token text
    pub fn text<'t>(&self, original: &'t str) -> &'t str {
        match self {
            Replacement::Keep => original,
            Replacement::OpenBracket => "[",
            Replacement::CloseBracket => "]",
            Replacement::Delete => "",
        }
    }
}

/// One replacement slot per token of the stream
#[derive(Debug, Clone)]
pub struct ReplacementMap {
    slots: Vec<Replacement>,
}

impl ReplacementMap {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![Replacement::default(); len],
        }
    }

    /// Register the replacements for one occurrence
    pub fn register(&mut self, occurrence: &Occurrence) -> Result<(), ConvertError> {
        let Occurrence {
            keyword,
            open,
            close,
        } = *occurrence;

        if close >= self.slots.len() {
            return Err(ConvertError::malformed(
                close,
                format!("occurrence ends past the stream of {} tokens", self.slots.len()),
            ));
        }
        if !(keyword < open && open < close) {
            return Err(ConvertError::malformed(
                keyword,
                format!("occurrence indices out of order: {keyword}, {open}, {close}"),
            ));
        }

        self.slots[keyword] = Replacement::OpenBracket;
        for slot in &mut self.slots[keyword + 1..=open] {
            *slot = Replacement::Delete;
        }
        self.slots[close] = Replacement::CloseBracket;

        Ok(())
    }

    pub fn get(&self, index: usize) -> Replacement {
        self.slots.get(index).copied().unwrap_or_default()
    }

    /// Concatenate the token texts with replacements applied, in index order
    pub fn apply(&self, tokens: &[Token]) -> String {
        let mut out = String::with_capacity(tokens.iter().map(|t| t.text.len()).sum());
        for (index, token) in tokens.iter().enumerate() {
            out.push_str(self.get(index).text(&token.text));
        }
        out
    }
}

/// Result of a rewrite pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// The reassembled source
    pub text: String,
    /// Every construction that was rewritten, ordered by keyword index
    pub occurrences: Vec<Occurrence>,
}

impl Rewrite {
    pub fn has_changes(&self) -> bool {
        !self.occurrences.is_empty()
    }
}

/// Match the construction starting at keyword index `keyword`
///
/// Returns `None` when the keyword is not followed by `(` or when the
/// parenthesis is never closed.
pub fn match_occurrence(tokens: &[Token], keyword: usize) -> Option<Occurrence> {
    if !tokens.get(keyword)?.is(&TokenKind::ArrayKeyword) {
        return None;
    }

    let open = tokens
        .iter()
        .enumerate()
        .skip(keyword + 1)
        .find(|(_, t)| !t.is(&TokenKind::Whitespace))
        .filter(|(_, t)| t.is(&TokenKind::OpenParen))
        .map(|(i, _)| i)?;

    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::OpenParen => depth += 1,
            TokenKind::CloseParen => {
                // The scan starts at `open`, so depth is at least 1 here
                depth -= 1;
                if depth == 0 {
                    return Some(Occurrence {
                        keyword,
                        open,
                        close: i,
                    });
                }
            }
            _ => {}
        }
    }

    None
}

/// Find every construction in the stream, ordered by keyword index
pub fn find_occurrences(tokens: &[Token]) -> Vec<Occurrence> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is(&TokenKind::ArrayKeyword))
        .filter_map(|(i, _)| match_occurrence(tokens, i))
        .collect()
}

/// Rewrite every `array(...)` construction of the stream to `[...]`
pub fn rewrite(tokens: &[Token]) -> Result<Rewrite, ConvertError> {
    let occurrences = find_occurrences(tokens);

    let mut replacements = ReplacementMap::new(tokens.len());
    for occurrence in &occurrences {
        replacements.register(occurrence)?;
    }

    Ok(Rewrite {
        text: replacements.apply(tokens),
        occurrences,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::source_text;

    fn ws(text: &str) -> Token {
        Token::new(TokenKind::Whitespace, text, Some(1))
    }

    fn array() -> Token {
        Token::new(TokenKind::ArrayKeyword, "array", Some(1))
    }

    fn other(id: i64, text: &str) -> Token {
        Token::new(TokenKind::from_id(id), text, Some(1))
    }

    fn lit(text: &str) -> Token {
        Token::literal(text)
    }

    fn convert(tokens: &[Token]) -> String {
        rewrite(tokens).unwrap().text
    }

    #[test]
    fn test_pass_through_without_keyword() {
        let tokens = vec![
            other(320, "$a"),
            ws(" "),
            lit("="),
            ws(" "),
            lit("("),
            other(311, "1"),
            lit(")"),
            lit(";"),
        ];
        let result = rewrite(&tokens).unwrap();
        assert_eq!(result.text, source_text(&tokens));
        assert!(!result.has_changes());
    }

    #[test]
    fn test_empty_array() {
        // $a = array();
        let tokens = vec![
            other(320, "$a"),
            ws(" "),
            lit("="),
            ws(" "),
            array(),
            lit("("),
            lit(")"),
            lit(";"),
        ];
        let result = rewrite(&tokens).unwrap();
        assert_eq!(result.text, "$a = [];");
        assert_eq!(
            result.occurrences,
            vec![Occurrence {
                keyword: 4,
                open: 5,
                close: 6
            }]
        );
    }

    #[test]
    fn test_whitespace_before_paren_is_deleted() {
        // array (1, 2)
        let tokens = vec![
            array(),
            ws(" "),
            lit("("),
            other(311, "1"),
            lit(","),
            ws(" "),
            other(311, "2"),
            lit(")"),
        ];
        assert_eq!(convert(&tokens), "[1, 2]");
    }

    #[test]
    fn test_multiple_whitespace_tokens_before_paren() {
        let tokens = vec![array(), ws(" "), ws("\n\t"), lit("("), lit(")")];
        assert_eq!(convert(&tokens), "[]");
    }

    #[test]
    fn test_whitespace_inside_is_preserved() {
        let tokens = vec![array(), lit("("), ws("\n  "), other(311, "1"), ws("\n"), lit(")")];
        assert_eq!(convert(&tokens), "[\n  1\n]");
    }

    #[test]
    fn test_nested_arrays() {
        // array('a' => array(1, 2))
        let tokens = vec![
            array(),
            lit("("),
            other(323, "'a'"),
            ws(" "),
            other(268, "=>"),
            ws(" "),
            array(),
            lit("("),
            other(311, "1"),
            lit(","),
            ws(" "),
            other(311, "2"),
            lit(")"),
            lit(")"),
        ];
        let result = rewrite(&tokens).unwrap();
        assert_eq!(result.text, "['a' => [1, 2]]");
        assert_eq!(result.occurrences.len(), 2);
        assert_eq!(result.occurrences[0].close, 13);
        assert_eq!(result.occurrences[1].close, 12);
    }

    #[test]
    fn test_plain_parentheses_count_towards_depth() {
        // array((1 + 2) * 3)
        let tokens = vec![
            array(),
            lit("("),
            lit("("),
            other(311, "1"),
            lit("+"),
            other(311, "2"),
            lit(")"),
            lit("*"),
            other(311, "3"),
            lit(")"),
        ];
        assert_eq!(convert(&tokens), "[(1+2)*3]");
    }

    #[test]
    fn test_keyword_not_followed_by_paren() {
        // function f(array $x)
        let tokens = vec![
            other(346, "function"),
            ws(" "),
            other(319, "f"),
            lit("("),
            array(),
            ws(" "),
            other(320, "$x"),
            lit(")"),
        ];
        let result = rewrite(&tokens).unwrap();
        assert_eq!(result.text, "function f(array $x)");
        assert!(result.occurrences.is_empty());
    }

    #[test]
    fn test_keyword_at_end_of_stream() {
        let tokens = vec![ws(" "), array()];
        assert_eq!(convert(&tokens), " array");

        let tokens = vec![array(), ws(" ")];
        assert_eq!(convert(&tokens), "array ");
    }

    #[test]
    fn test_unclosed_construction() {
        let tokens = vec![array(), ws(" "), lit("("), other(311, "1"), lit("("), lit(")")];
        let result = rewrite(&tokens).unwrap();
        assert_eq!(result.text, "array (1()");
        assert!(!result.has_changes());
    }

    #[test]
    fn test_unclosed_outer_does_not_block_inner() {
        // array(array(1)
        let tokens = vec![array(), lit("("), array(), lit("("), other(311, "1"), lit(")")];
        assert_eq!(convert(&tokens), "array([1]");
    }

    #[test]
    fn test_sibling_arrays() {
        let tokens = vec![
            array(),
            lit("("),
            lit(")"),
            lit(","),
            array(),
            lit("("),
            other(311, "1"),
            lit(")"),
        ];
        assert_eq!(convert(&tokens), "[],[1]");
    }

    #[test]
    fn test_deeply_nested() {
        let depth = 50;
        let mut tokens = Vec::new();
        for _ in 0..depth {
            tokens.push(array());
            tokens.push(lit("("));
        }
        for _ in 0..depth {
            tokens.push(lit(")"));
        }
        let expected = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let result = rewrite(&tokens).unwrap();
        assert_eq!(result.text, expected);
        assert_eq!(result.occurrences.len(), depth);
    }

    #[test]
    fn test_match_occurrence_on_non_keyword() {
        let tokens = vec![lit("("), lit(")")];
        assert_eq!(match_occurrence(&tokens, 0), None);
        assert_eq!(match_occurrence(&tokens, 9), None);
    }

    #[test]
    fn test_register_rejects_out_of_bounds() {
        let mut map = ReplacementMap::new(2);
        let result = map.register(&Occurrence {
            keyword: 0,
            open: 1,
            close: 2,
        });
        assert!(matches!(
            result,
            Err(ConvertError::MalformedStream { index: 2, .. })
        ));
    }

    #[test]
    fn test_register_rejects_out_of_order() {
        let mut map = ReplacementMap::new(4);
        let result = map.register(&Occurrence {
            keyword: 2,
            open: 1,
            close: 3,
        });
        assert!(matches!(result, Err(ConvertError::MalformedStream { .. })));
    }

    #[test]
    fn test_occurrence_location() {
        let tokens = vec![
            Token::new(TokenKind::OpenTag, "<?php\n", Some(1)),
            other(320, "$a"),
            lit("="),
            Token::new(TokenKind::ArrayKeyword, "array", Some(2)),
            lit("("),
            lit(")"),
        ];
        let result = rewrite(&tokens).unwrap();
        let occurrence = result.occurrences[0];
        let location = occurrence.location(&tokens);
        assert_eq!((location.line, location.column), (2, 4));
        assert_eq!(occurrence.line(&tokens), Some(2));
    }
}
