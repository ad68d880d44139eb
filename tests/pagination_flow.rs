//! Traversal control tests over scripted page sources.
//!
//! These exercise the controller's run state (dedup, limit, zero-streak,
//! retry-on-empty) without a browser: the strategy replays a script of
//! per-page items and the page source records what was fetched.

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use vitrine::pagination::{PageSource, PaginationController, PagingPolicy};
use vitrine::sites::{ExtractOutcome, SiteStrategy};
use vitrine::{ProductItem, QueryContext};

/// Strategy whose "extraction" replays a script of per-page (url, title)
/// entries, bypassing markup parsing entirely.
struct ScriptedStrategy {
    pages: HashMap<u32, Vec<(&'static str, &'static str)>>,
}

impl SiteStrategy for ScriptedStrategy {
    fn site(&self) -> &'static str {
        "scripted"
    }

    fn result_selector(&self) -> &'static str {
        "div.item"
    }

    fn page_url(&self, _query: &QueryContext, page_index: u32) -> String {
        format!("https://shop.test/busca?p={page_index}")
    }

    fn extract(&self, _markup: &str, _query: &QueryContext, page_index: u32) -> ExtractOutcome {
        let entries = self.pages.get(&page_index).cloned().unwrap_or_default();
        let candidates_seen = entries.len();
        let items = entries
            .into_iter()
            .map(|(url, title)| ProductItem {
                title: title.to_string(),
                price: None,
                url: url.to_string(),
                image: None,
                source: "scripted".to_string(),
                page: page_index,
            })
            .collect();
        ExtractOutcome {
            items,
            candidates_seen,
            filtered_out: 0,
        }
    }
}

/// Records every fetch and debug dump; optionally refuses all navigation.
#[derive(Default)]
struct RecordingSource {
    fetched: Vec<String>,
    dumps: Vec<(u32, String)>,
    fail_all: bool,
}

impl PageSource for RecordingSource {
    async fn fetch_page(&mut self, url: &str, _selector: &str) -> Result<String> {
        self.fetched.push(url.to_string());
        if self.fail_all {
            return Err(anyhow!("navigation refused"));
        }
        Ok(String::new())
    }

    async fn dump_debug(&mut self, page_index: u32, tag: &str) {
        self.dumps.push((page_index, tag.to_string()));
    }
}

fn query() -> QueryContext {
    QueryContext::new("produto teste")
}

#[tokio::test]
async fn zero_streak_stops_traversal_early() {
    // Pages 3 and 4 only repeat earlier URLs; page 5 would add a new item
    // but must never be visited with a streak threshold of 2.
    let strategy = ScriptedStrategy {
        pages: HashMap::from([
            (1, vec![("https://shop.test/p/1", "Produto Um")]),
            (2, vec![("https://shop.test/p/2", "Produto Dois")]),
            (3, vec![("https://shop.test/p/1", "Produto Um")]),
            (4, vec![("https://shop.test/p/2", "Produto Dois")]),
            (5, vec![("https://shop.test/p/5", "Produto Cinco")]),
        ]),
    };
    let controller = PaginationController::new(
        &strategy,
        PagingPolicy {
            limit: 100,
            max_pages: 7,
            zero_streak_stop: 2,
            retry_if_empty: 0,
        },
    );
    let mut source = RecordingSource::default();

    let items = controller.run(&mut source, &query()).await;

    assert_eq!(items.len(), 2);
    assert_eq!(source.fetched.len(), 4);
    assert_eq!(source.fetched.last().unwrap(), "https://shop.test/busca?p=4");
}

#[tokio::test]
async fn zero_streak_resets_on_productive_pages() {
    let strategy = ScriptedStrategy {
        pages: HashMap::from([
            (1, vec![("https://shop.test/p/1", "Produto Um")]),
            (2, vec![("https://shop.test/p/1", "Produto Um")]),
            (3, vec![("https://shop.test/p/3", "Produto Tres")]),
            (4, vec![("https://shop.test/p/1", "Produto Um")]),
            (5, vec![("https://shop.test/p/3", "Produto Tres")]),
            (6, vec![("https://shop.test/p/6", "Produto Seis")]),
        ]),
    };
    let controller = PaginationController::new(
        &strategy,
        PagingPolicy {
            limit: 100,
            max_pages: 10,
            zero_streak_stop: 2,
            retry_if_empty: 0,
        },
    );
    let mut source = RecordingSource::default();

    let items = controller.run(&mut source, &query()).await;

    // Streak: page 2 -> 1, page 3 resets, page 4 -> 1, page 5 -> 2: stop.
    assert_eq!(source.fetched.len(), 5);
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn duplicates_across_pages_collapse_and_pages_are_tagged() {
    // Page 1 yields 5 unique items, page 2 yields 3 of which 2 duplicate
    // page 1 URLs: exactly 6 survive, tagged with the page they came from.
    let strategy = ScriptedStrategy {
        pages: HashMap::from([
            (
                1,
                vec![
                    ("https://shop.test/p/1", "Produto Um"),
                    ("https://shop.test/p/2", "Produto Dois"),
                    ("https://shop.test/p/3", "Produto Tres"),
                    ("https://shop.test/p/4", "Produto Quatro"),
                    ("https://shop.test/p/5", "Produto Cinco"),
                ],
            ),
            (
                2,
                vec![
                    ("https://shop.test/p/2", "Produto Dois"),
                    ("https://shop.test/p/6", "Produto Seis"),
                    ("https://shop.test/p/4", "Produto Quatro"),
                ],
            ),
        ]),
    };
    let controller = PaginationController::new(
        &strategy,
        PagingPolicy {
            limit: 10,
            max_pages: 2,
            zero_streak_stop: 2,
            retry_if_empty: 0,
        },
    );
    let mut source = RecordingSource::default();

    let items = controller.run(&mut source, &query()).await;

    assert_eq!(items.len(), 6);
    let urls: Vec<_> = items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://shop.test/p/1",
            "https://shop.test/p/2",
            "https://shop.test/p/3",
            "https://shop.test/p/4",
            "https://shop.test/p/5",
            "https://shop.test/p/6",
        ]
    );
    assert_eq!(items.iter().filter(|i| i.page == 1).count(), 5);
    assert_eq!(items.iter().filter(|i| i.page == 2).count(), 1);

    // No identity appears twice.
    let mut unique = urls.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), urls.len());
}

#[tokio::test]
async fn limit_truncates_in_insertion_order() {
    let entries: Vec<(&'static str, &'static str)> = vec![
        ("https://shop.test/p/1", "Produto 1"),
        ("https://shop.test/p/2", "Produto 2"),
        ("https://shop.test/p/3", "Produto 3"),
        ("https://shop.test/p/4", "Produto 4"),
        ("https://shop.test/p/5", "Produto 5"),
        ("https://shop.test/p/6", "Produto 6"),
        ("https://shop.test/p/7", "Produto 7"),
        ("https://shop.test/p/8", "Produto 8"),
        ("https://shop.test/p/9", "Produto 9"),
        ("https://shop.test/p/10", "Produto 10"),
    ];
    let strategy = ScriptedStrategy {
        pages: HashMap::from([(1, entries)]),
    };
    let controller = PaginationController::new(
        &strategy,
        PagingPolicy {
            limit: 3,
            max_pages: 5,
            zero_streak_stop: 2,
            retry_if_empty: 0,
        },
    );
    let mut source = RecordingSource::default();

    let items = controller.run(&mut source, &query()).await;

    let urls: Vec<_> = items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://shop.test/p/1",
            "https://shop.test/p/2",
            "https://shop.test/p/3",
        ]
    );
    // The limit stop fires before page 2 is ever visited.
    assert_eq!(source.fetched.len(), 1);
}

#[tokio::test]
async fn empty_pages_are_retried_then_dumped() {
    let strategy = ScriptedStrategy {
        pages: HashMap::new(),
    };
    let controller = PaginationController::new(
        &strategy,
        PagingPolicy {
            limit: 10,
            max_pages: 5,
            zero_streak_stop: 2,
            retry_if_empty: 1,
        },
    );
    let mut source = RecordingSource::default();

    let items = controller.run(&mut source, &query()).await;

    assert!(items.is_empty());
    // Two pages visited before the zero-streak stop, each fetched twice.
    assert_eq!(source.fetched.len(), 4);
    assert_eq!(
        source.dumps,
        [(1, "links0".to_string()), (2, "links0".to_string())]
    );
}

#[tokio::test]
async fn navigation_failure_degrades_to_empty_pages() {
    let strategy = ScriptedStrategy {
        pages: HashMap::from([(1, vec![("https://shop.test/p/1", "Produto Um")])]),
    };
    let controller = PaginationController::new(
        &strategy,
        PagingPolicy {
            limit: 10,
            max_pages: 6,
            zero_streak_stop: 2,
            retry_if_empty: 1,
        },
    );
    let mut source = RecordingSource {
        fail_all: true,
        ..Default::default()
    };

    let items = controller.run(&mut source, &query()).await;

    // Every fetch fails, so even the page with scripted content contributes
    // nothing and the zero-streak path terminates the run.
    assert!(items.is_empty());
    assert_eq!(source.fetched.len(), 4);
}
