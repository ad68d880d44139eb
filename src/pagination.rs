//! Page-by-page traversal control.
//!
//! The controller owns the run state of one search call: the ordered
//! accumulator, the dedup identity set, the zero-streak counter and the
//! current page index. Page fetching goes through the [`PageSource`] seam so
//! the traversal logic is independent of the live browser.

use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tracing::{info, warn};

use crate::dedup::{Deduplicator, ResultAccumulator};
use crate::product::ProductItem;
use crate::query::QueryContext;
use crate::sites::{ExtractOutcome, SiteStrategy};

/// Base delay before re-visiting a page that yielded zero candidates.
const EMPTY_RETRY_DELAY_MS: u64 = 600;
const EMPTY_RETRY_JITTER_MS: u64 = 400;

/// The page-fetch collaborator consumed by the controller.
///
/// `fetch_page` navigates to `url`, stabilizes the render against
/// `selector`, and returns the rendered markup. Errors are page-scoped: the
/// controller degrades them to an empty page, so one bad page never aborts a
/// multi-page run.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&mut self, url: &str, selector: &str) -> Result<String>;

    /// Best-effort diagnostic dump of the current page state.
    async fn dump_debug(&mut self, page_index: u32, tag: &str);
}

/// Per-call traversal bounds.
#[derive(Debug, Clone, Copy)]
pub struct PagingPolicy {
    /// Maximum items to return.
    pub limit: usize,
    /// Traversal ceiling, 1-based inclusive.
    pub max_pages: u32,
    /// Consecutive pages without new items before stopping early.
    pub zero_streak_stop: u32,
    /// Re-visits of a page that yielded zero raw candidates.
    pub retry_if_empty: u32,
}

/// Drives the visit/extract/accept/decide loop for one site strategy.
pub struct PaginationController<'a, S: SiteStrategy> {
    strategy: &'a S,
    policy: PagingPolicy,
}

impl<'a, S: SiteStrategy> PaginationController<'a, S> {
    pub fn new(strategy: &'a S, policy: PagingPolicy) -> Self {
        Self { strategy, policy }
    }

    /// Traverse result pages until a terminal condition is reached and
    /// return the accumulated items in page/insertion order.
    ///
    /// Terminal conditions: the limit is reached, `max_pages` is exhausted,
    /// or the zero-streak threshold trips. Navigation failures degrade to
    /// empty pages and therefore terminate through the zero-streak path.
    pub async fn run<P: PageSource>(
        &self,
        source: &mut P,
        query: &QueryContext,
    ) -> Vec<ProductItem> {
        let mut results = ResultAccumulator::new(self.policy.limit);
        let mut dedup = Deduplicator::new();
        let mut zero_streak = 0u32;

        for page_index in 1..=self.policy.max_pages {
            let url = self.strategy.page_url(query, page_index);
            info!(site = self.strategy.site(), page = page_index, %url, "visiting result page");

            let mut outcome = self.visit_and_extract(source, &url, query, page_index).await;

            let mut retries = 0;
            while outcome.candidates_seen == 0 && retries < self.policy.retry_if_empty {
                retries += 1;
                warn!(
                    page = page_index,
                    retry = retries,
                    max = self.policy.retry_if_empty,
                    "no candidates on page, retrying"
                );
                let jitter = rand::rng().random_range(0..EMPTY_RETRY_JITTER_MS);
                tokio::time::sleep(Duration::from_millis(EMPTY_RETRY_DELAY_MS + jitter)).await;
                outcome = self.visit_and_extract(source, &url, query, page_index).await;
            }

            if outcome.candidates_seen == 0 {
                source.dump_debug(page_index, "links0").await;
            }

            let captured = outcome.items.len();
            let mut added = 0usize;
            for item in outcome.items {
                if !dedup.accept(&item.url) {
                    continue;
                }
                if !results.push(item) {
                    break;
                }
                added += 1;
            }

            info!(
                page = page_index,
                candidates = outcome.candidates_seen,
                captured,
                new = added,
                filtered = outcome.filtered_out,
                total = results.len(),
                "page processed"
            );

            if results.is_full() {
                info!("stopping: result limit reached");
                break;
            }

            if added == 0 {
                zero_streak += 1;
                warn!(page = page_index, zero_streak, "page added no new items");
                if zero_streak >= self.policy.zero_streak_stop {
                    warn!("stopping: consecutive pages without new items");
                    break;
                }
            } else {
                zero_streak = 0;
            }
        }

        results.into_items()
    }

    /// One visit+extract attempt. Any fetch failure is consumed here and
    /// reported as an empty page.
    async fn visit_and_extract<P: PageSource>(
        &self,
        source: &mut P,
        url: &str,
        query: &QueryContext,
        page_index: u32,
    ) -> ExtractOutcome {
        match source
            .fetch_page(url, self.strategy.result_selector())
            .await
        {
            Ok(markup) => self.strategy.extract(&markup, query, page_index),
            Err(e) => {
                warn!(page = page_index, error = %e, "page fetch failed, treating page as empty");
                ExtractOutcome::empty()
            }
        }
    }
}
