//! Page navigation, render stabilization, and capture.
//!
//! Every operation here is bounded by an explicit timeout with a defined
//! fallback on expiry, so a stalled page can degrade a single visit but
//! never hang a traversal.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chromiumoxide::page::Page;
use tokio::time::Instant;
use tracing::debug;

use crate::config::ClientConfig;
use crate::debug_sink::DebugSink;
use crate::pagination::PageSource;

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Wrap an async page operation with an explicit timeout.
///
/// Distinguishes expiry from operation failure in the error message.
pub async fn with_op_timeout<F, T>(operation: F, timeout: Duration, name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!("{name} timed out after {timeout:?}")),
    }
}

/// Navigate to `url` and wait for the load to settle.
///
/// The post-navigation load wait is advisory: heavy storefronts keep
/// long-polling connections open, so its expiry is logged and ignored, the
/// same way the selector wait downstream tolerates a slow render.
pub async fn navigate(page: &Page, url: &str, config: &ClientConfig) -> Result<()> {
    with_op_timeout(
        async {
            page.goto(url).await.context("navigation failed")?;
            Ok(())
        },
        config.nav_timeout(),
        "navigation",
    )
    .await?;

    if let Err(e) = with_op_timeout(
        async {
            page.wait_for_navigation()
                .await
                .context("load wait failed")?;
            Ok(())
        },
        config.nav_timeout(),
        "load wait",
    )
    .await
    {
        debug!(error = %e, "load wait expired, continuing with current page state");
    }
    Ok(())
}

/// Poll the DOM until `selector` resolves or the timeout elapses.
pub async fn selector_appears(page: &Page, selector: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if page.find_element(selector).await.is_ok() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
    }
}

/// Bounded wait/scroll sequence that coaxes lazily loaded results into the
/// page: wait for the structural selector, and when it stays absent run a
/// fixed number of scroll-and-pause cycles before one final re-check.
///
/// Returns whether the selector ever appeared. Extraction proceeds either
/// way; a degraded candidate set is handled by the empty-page retry path.
pub async fn stabilize(page: &Page, selector: &str, config: &ClientConfig) -> bool {
    if selector_appears(page, selector, config.selector_timeout()).await {
        return true;
    }

    debug!(selector, "selector absent after load, scrolling to trigger lazy render");
    for _ in 0..config.scroll_rounds() {
        let scroll_js = format!("window.scrollBy(0, {})", config.scroll_step_px());
        if let Err(e) = page.evaluate(scroll_js.as_str()).await {
            debug!(error = %e, "scroll evaluation failed");
        }
        tokio::time::sleep(config.scroll_pause()).await;
    }

    selector_appears(page, selector, config.selector_timeout()).await
}

/// Capture the rendered markup of the current page.
pub async fn page_content(page: &Page, config: &ClientConfig) -> Result<String> {
    with_op_timeout(
        async { page.content().await.context("content capture failed") },
        config.nav_timeout(),
        "content capture",
    )
    .await
}

/// Owns a page for one search run and closes it on every exit path.
///
/// `Drop` spawns the async `page.close()`, so early returns and errors
/// cannot leak CDP targets.
pub struct PageGuard {
    page: Page,
    label: String,
}

impl PageGuard {
    pub fn new(page: Page, label: impl Into<String>) -> Self {
        Self {
            page,
            label: label.into(),
        }
    }
}

impl std::ops::Deref for PageGuard {
    type Target = Page;

    fn deref(&self) -> &Page {
        &self.page
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        let page = self.page.clone();
        let label = std::mem::take(&mut self.label);
        tokio::spawn(async move {
            if let Err(e) = page.close().await {
                debug!(label = %label, "page close error (ignored): {e}");
            }
        });
    }
}

/// Production [`PageSource`]: drives a live chromiumoxide page and routes
/// diagnostics to the debug sink.
pub struct BrowserPageSource<'a> {
    page: &'a Page,
    config: &'a ClientConfig,
    debug: &'a DebugSink,
    site: &'static str,
    query_slug: String,
}

impl<'a> BrowserPageSource<'a> {
    pub fn new(
        page: &'a Page,
        config: &'a ClientConfig,
        debug: &'a DebugSink,
        site: &'static str,
        query_slug: String,
    ) -> Self {
        Self {
            page,
            config,
            debug,
            site,
            query_slug,
        }
    }
}

impl PageSource for BrowserPageSource<'_> {
    async fn fetch_page(&mut self, url: &str, selector: &str) -> Result<String> {
        navigate(self.page, url, self.config).await?;
        if !stabilize(self.page, selector, self.config).await {
            debug!(selector, "structural selector never appeared, extracting degraded markup");
        }
        page_content(self.page, self.config).await
    }

    async fn dump_debug(&mut self, page_index: u32, tag: &str) {
        self.debug
            .dump(self.site, &self.query_slug, page_index, tag, self.page)
            .await;
    }
}
