//! Run-wide identity tracking and the bounded, ordered result accumulator.

use std::collections::HashSet;

use url::Url;
use xxhash_rust::xxh3::xxh3_64;

use crate::product::ProductItem;

/// Reduce a URL to its identity string.
///
/// Parsing with the `url` crate lower-cases scheme and host; the fragment is
/// irrelevant to product identity and is stripped. Unparsable input falls
/// back to the trimmed, lower-cased raw string so the identity stays stable.
fn normalize(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.into()
        }
        Err(_) => raw.trim().to_lowercase(),
    }
}

/// Tracks the identities accepted over one whole search run.
///
/// Must be consulted before an item reaches the accumulator so that the
/// first occurrence wins and insertion order is preserved.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<u64>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time this identity is seen, false on every repeat.
    pub fn accept(&mut self, url: &str) -> bool {
        self.seen.insert(xxh3_64(normalize(url).as_bytes()))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Appends items in page/insertion order, refusing anything beyond the limit.
#[derive(Debug)]
pub struct ResultAccumulator {
    items: Vec<ProductItem>,
    limit: usize,
}

impl ResultAccumulator {
    pub fn new(limit: usize) -> Self {
        Self { items: Vec::new(), limit }
    }

    /// Append an item. Returns false once the limit is reached, in which
    /// case the item is dropped.
    pub fn push(&mut self, item: ProductItem) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.limit
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<ProductItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str) -> ProductItem {
        ProductItem {
            title: "Controle DualSense".to_string(),
            price: None,
            url: url.to_string(),
            image: None,
            source: "kabum".to_string(),
            page: 1,
        }
    }

    #[test]
    fn first_occurrence_wins() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.accept("https://www.kabum.com.br/produto/1"));
        assert!(!dedup.accept("https://www.kabum.com.br/produto/1"));
        assert!(dedup.accept("https://www.kabum.com.br/produto/2"));
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn normalization_ignores_host_casing_and_fragment() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.accept("https://WWW.Kabum.com.br/produto/1"));
        assert!(!dedup.accept("https://www.kabum.com.br/produto/1#galeria"));
    }

    #[test]
    fn query_strings_distinguish_identities() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.accept("https://shop.test/p?id=1"));
        assert!(dedup.accept("https://shop.test/p?id=2"));
    }

    #[test]
    fn accumulator_enforces_limit_and_order() {
        let mut acc = ResultAccumulator::new(2);
        assert!(acc.push(item("https://shop.test/1")));
        assert!(acc.push(item("https://shop.test/2")));
        assert!(acc.is_full());
        assert!(!acc.push(item("https://shop.test/3")));

        let urls: Vec<_> = acc.into_items().into_iter().map(|i| i.url).collect();
        assert_eq!(urls, ["https://shop.test/1", "https://shop.test/2"]);
    }

    #[test]
    fn zero_limit_accepts_nothing() {
        let mut acc = ResultAccumulator::new(0);
        assert!(acc.is_full());
        assert!(!acc.push(item("https://shop.test/1")));
        assert!(acc.is_empty());
    }
}
