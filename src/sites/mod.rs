//! Site strategies: per-site URL construction and DOM extraction.
//!
//! Each strategy supplies only what differs between storefronts: the page
//! URL shape, the structural selector that marks a usable result page, and
//! the extraction rules. Pagination control, relevance filtering, price
//! parsing and deduplication are shared and site-agnostic.

pub mod kabum;
pub mod pichau;

pub use kabum::{KabumClient, KabumStrategy};
pub use pichau::{PichauClient, PichauStrategy};

use anyhow::Result;
use scraper::{ElementRef, Selector};
use tracing::warn;

use crate::browser::page::{BrowserPageSource, PageGuard};
use crate::browser::{BrowserSession, stealth};
use crate::config::ClientConfig;
use crate::debug_sink::DebugSink;
use crate::pagination::{PaginationController, PagingPolicy};
use crate::product::ProductItem;
use crate::query::QueryContext;
use crate::text::norm_spaces;

/// One page's worth of extraction, plus diagnostic counters.
#[derive(Debug, Default)]
pub struct ExtractOutcome {
    /// Relevant, within-page-unique candidate items in page order.
    pub items: Vec<ProductItem>,
    /// Raw structural elements found on the page, before any filtering.
    pub candidates_seen: usize,
    /// Distinct candidates rejected by the relevance filter.
    pub filtered_out: usize,
}

impl ExtractOutcome {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Per-site extraction and URL construction.
pub trait SiteStrategy {
    /// Site tag stamped onto every extracted item.
    fn site(&self) -> &'static str;

    /// Structural selector whose presence marks a usable result page.
    fn result_selector(&self) -> &'static str;

    /// Result page URL for a 1-based page index.
    fn page_url(&self, query: &QueryContext, page_index: u32) -> String;

    /// Parse rendered markup into candidate items plus diagnostic counters.
    ///
    /// Must tolerate missing optional sub-elements: a failure on one
    /// candidate affects only that candidate.
    fn extract(&self, markup: &str, query: &QueryContext, page_index: u32) -> ExtractOutcome;
}

/// Wire one strategy, one live page and the shared controller together.
///
/// Used by every client after it has acquired its browser session; the page
/// is closed on every exit path by the guard.
pub(crate) async fn run_pipeline<S: SiteStrategy>(
    session: &BrowserSession,
    strategy: &S,
    config: &ClientConfig,
    query: &QueryContext,
    limit: usize,
    max_pages: u32,
) -> Result<Vec<ProductItem>> {
    let page = PageGuard::new(session.new_page().await?, strategy.site());

    if config.stealth() {
        if let Err(e) = stealth::inject(&page, config.user_agent()).await {
            warn!(error = %e, "stealth injection failed, continuing without it");
        }
    }

    let debug = DebugSink::from_config(config);
    let mut source = BrowserPageSource::new(&page, config, &debug, strategy.site(), query.slug());
    let controller = PaginationController::new(
        strategy,
        PagingPolicy {
            limit,
            max_pages,
            zero_streak_stop: config.zero_streak_stop(),
            retry_if_empty: config.retry_if_empty(),
        },
    );

    Ok(controller.run(&mut source, query).await)
}

/// First non-empty text for an ordered chain of sub-selectors.
///
/// Mirrors how result cards degrade in practice: the preferred heading may
/// be absent while a lower-priority node still carries the title. Only the
/// first match of each selector is considered.
pub(crate) fn select_first_text(
    scope: ElementRef<'_>,
    selectors: &[&str],
    min_chars: usize,
) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = scope.select(&selector).next() {
            let text = norm_spaces(&element.text().collect::<Vec<_>>().join(" "));
            if text.chars().count() >= min_chars {
                return Some(text);
            }
        }
    }
    None
}

/// Title fallback from element attributes.
pub(crate) fn attr_title(scope: ElementRef<'_>) -> Option<String> {
    for attr in ["title", "aria-label"] {
        if let Some(value) = scope.value().attr(attr) {
            let value = norm_spaces(value);
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// Nearest `article` or `div` ancestor, for card-scoped text lookups.
pub(crate) fn containing_card<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "article" | "div"))
}

/// Whitespace-normalized text of an element and its descendants.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    norm_spaces(&element.text().collect::<Vec<_>>().join(" "))
}

/// Best-effort image URL from the first `img` descendant.
pub(crate) fn first_image_src(scope: ElementRef<'_>) -> Option<String> {
    let selector = Selector::parse("img").ok()?;
    let img = scope.select(&selector).next()?;
    img.value()
        .attr("src")
        .or_else(|| img.value().attr("data-src"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
