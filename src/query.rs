//! Query tokenization and the per-call query context.

use lazy_static::lazy_static;
use regex::Regex;

use crate::text::norm_spaces;

/// Portuguese function words that carry no search intent.
const STOPWORDS_PT: &[&str] = &[
    "de", "da", "do", "das", "dos", "para", "com", "sem", "e", "ou", "a", "o", "as", "os",
];

/// Tokens shorter than this are noise (stray digits, single letters).
const MIN_TOKEN_LEN: usize = 2;

const MAX_SLUG_LEN: usize = 80;

lazy_static! {
    static ref TOKEN_SPLIT: Regex = Regex::new(r"[\s\-_/]+").expect("token split pattern compiles");
}

/// Derive the significant keywords of a query.
///
/// Lower-cases, collapses whitespace, splits on whitespace/hyphen/underscore/
/// slash, then drops stopwords and undersized tokens. Deterministic: the same
/// query always yields the same token sequence.
pub fn keywords(query: &str) -> Vec<String> {
    let q = norm_spaces(query).to_lowercase();
    TOKEN_SPLIT
        .split(&q)
        .filter(|t| !t.is_empty())
        .filter(|t| !STOPWORDS_PT.contains(t))
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// Immutable query state for the duration of one search call.
#[derive(Debug, Clone)]
pub struct QueryContext {
    raw: String,
    keywords: Vec<String>,
}

impl QueryContext {
    pub fn new(query: &str) -> Self {
        let raw = norm_spaces(query);
        let keywords = keywords(&raw);
        Self { raw, keywords }
    }

    /// The whitespace-normalized query string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Filesystem-safe tag for debug artifacts derived from this query.
    pub fn slug(&self) -> String {
        let mut slug = sanitize_filename::sanitize(self.raw.replace(' ', "_"));
        slug.truncate(
            slug.char_indices()
                .nth(MAX_SLUG_LEN)
                .map(|(idx, _)| idx)
                .unwrap_or(slug.len()),
        );
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stopwords_and_splits_on_separators() {
        assert_eq!(keywords("controle - ps5 de luxo"), vec!["controle", "ps5", "luxo"]);
    }

    #[test]
    fn splits_on_underscore_and_slash() {
        assert_eq!(keywords("ssd_nvme/1tb"), vec!["ssd", "nvme", "1tb"]);
    }

    #[test]
    fn drops_single_char_tokens() {
        assert_eq!(keywords("playstation 5 x"), vec!["playstation"]);
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(keywords("Controle  PS5"), keywords("controle ps5"));
    }

    #[test]
    fn context_normalizes_raw_query() {
        let ctx = QueryContext::new("  controle   ps5 ");
        assert_eq!(ctx.raw(), "controle ps5");
        assert_eq!(ctx.keywords(), ["controle", "ps5"]);
        assert_eq!(ctx.slug(), "controle_ps5");
    }
}
