//! Small text utilities shared across extraction and display.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("whitespace pattern compiles");
}

/// Trim and collapse every whitespace run to a single space.
pub fn norm_spaces(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}

/// Truncate a string to at most `max_chars` characters, respecting UTF-8
/// character boundaries. Returns a slice of the original string, so it never
/// panics on multi-byte characters (accented titles are common here).
#[inline]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}
