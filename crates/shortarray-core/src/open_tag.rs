//! `<?php` handling for fragments lexed on their own
//!
//! PHP's tokenizer treats everything before an open tag as inline HTML, so a
//! selected fragment must be prefixed with `<?php` before lexing and the
//! prefix removed from the converted text afterwards.

/// Open tag prepended to fragments
pub const OPEN_TAG: &str = "<?php";

/// Prefix management for fragments without an open tag
///
/// # Example
///
/// ```
/// use shortarray_core::{convert, OpenTag};
///
/// let (source, prepended) = OpenTag::ensure(" $a = array(1);");
/// assert_eq!(source, "<?php $a = array(1);");
///
/// // `token_get_all()` output for `source`
/// let json = r#"{"tokens":[["T_OPEN_TAG","<?php ",1],[320,"$a",1],
///     ["T_WHITESPACE"," ",1],"=",["T_WHITESPACE"," ",1],
///     ["T_ARRAY","array",1],"(",[311,"1",1],")",";"]}"#;
/// let converted = convert(json).unwrap();
///
/// assert_eq!(OpenTag::strip(&converted, prepended), " $a = [1];");
/// ```
pub struct OpenTag;

impl OpenTag {
    /// Prepend the open tag when `text` does not already start with it
    ///
    /// Returns the text to lex and whether the tag was prepended.
    pub fn ensure(text: &str) -> (String, bool) {
        if text.starts_with(OPEN_TAG) {
            (text.to_string(), false)
        } else {
            (format!("{OPEN_TAG}{text}"), true)
        }
    }

    /// Remove a tag previously added by [`OpenTag::ensure`]
    pub fn strip(text: &str, prepended: bool) -> &str {
        if prepended {
            text.strip_prefix(OPEN_TAG).unwrap_or(text)
        } else {
            text
        }
    }
}
