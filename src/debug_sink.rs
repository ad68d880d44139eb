//! Best-effort debug artifact dumps.
//!
//! When a page yields zero candidates after retries, the markup and a
//! screenshot are saved for offline selector debugging. Every step is
//! best-effort: a failing dump never aborts a search.

use std::path::PathBuf;

use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::page::Page;
use tracing::warn;

use crate::config::ClientConfig;

pub struct DebugSink {
    enabled: bool,
    dir: PathBuf,
}

impl DebugSink {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            enabled: config.debug_enabled(),
            dir: config.debug_dir().to_path_buf(),
        }
    }

    /// Dump the current page state, tagged by site, query slug, page index
    /// and a short reason tag.
    pub async fn dump(&self, site: &str, query_slug: &str, page_index: u32, tag: &str, page: &Page) {
        if !self.enabled {
            return;
        }
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), "failed to create debug dir: {e}");
            return;
        }

        let stem = format!("{site}_{query_slug}_p{page_index}_{tag}");

        match page.content().await {
            Ok(markup) => {
                let path = self.dir.join(format!("{stem}.html"));
                match tokio::fs::write(&path, markup).await {
                    Ok(()) => warn!(path = %path.display(), "debug markup saved"),
                    Err(e) => warn!("failed to save debug markup: {e}"),
                }
            }
            Err(e) => warn!("failed to capture markup for debug dump: {e}"),
        }

        let params = CaptureScreenshotParams {
            format: Some(CaptureScreenshotFormat::Png),
            capture_beyond_viewport: Some(true),
            ..Default::default()
        };
        match page.screenshot(params).await {
            Ok(bytes) => {
                let path = self.dir.join(format!("{stem}.png"));
                match tokio::fs::write(&path, bytes).await {
                    Ok(()) => warn!(path = %path.display(), "debug screenshot saved"),
                    Err(e) => warn!("failed to save debug screenshot: {e}"),
                }
            }
            Err(e) => warn!("failed to capture screenshot for debug dump: {e}"),
        }
    }
}
