//! Browser lifecycle management.
//!
//! Owns the Chromium process and its CDP event-handler task, and guarantees
//! both are torn down on every exit path. A session is acquired once at the
//! start of a search call and released when the call returns; concurrent
//! searches use independent sessions.

pub mod page;
pub mod stealth;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::SearchError;

/// Default user agent presented when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Launch arguments that keep Chromium quiet and hide the automation flag.
const LAUNCH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-hang-monitor",
    "--disable-prompt-on-repost",
    "--metrics-recording-only",
    "--password-store=basic",
    "--use-mock-keychain",
    "--mute-audio",
    "--no-sandbox",
];

/// A running Chromium instance plus its CDP event-handler task.
///
/// The handler task MUST be aborted when the session ends, otherwise it runs
/// until process exit. `close()` handles the orderly path; `Drop` covers
/// panics and early returns.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    /// Throwaway profile directory, removed once the browser has shut down.
    /// `None` when running on a persistent profile.
    temp_profile: Option<TempDir>,
}

impl BrowserSession {
    /// Launch with a throwaway profile that is removed on close.
    pub async fn launch_ephemeral(config: &ClientConfig) -> Result<Self, SearchError> {
        let temp = tempfile::Builder::new()
            .prefix("vitrine-chrome-")
            .tempdir()
            .map_err(|e| SearchError::Browser(format!("failed to create temp profile dir: {e}")))?;
        let profile_dir = temp.path().to_path_buf();
        Self::launch(config, profile_dir, Some(temp)).await
    }

    /// Launch on an existing persistent profile directory.
    ///
    /// The caller is responsible for checking the profile exists; this only
    /// wires it into the launch configuration.
    pub async fn launch_persistent(
        config: &ClientConfig,
        profile_dir: &Path,
    ) -> Result<Self, SearchError> {
        Self::launch(config, profile_dir.to_path_buf(), None).await
    }

    async fn launch(
        config: &ClientConfig,
        profile_dir: PathBuf,
        temp_profile: Option<TempDir>,
    ) -> Result<Self, SearchError> {
        info!(
            profile = %profile_dir.display(),
            headless = config.headless(),
            "launching browser"
        );

        let user_agent = config.user_agent().unwrap_or(DEFAULT_USER_AGENT);
        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .user_data_dir(&profile_dir)
            .args(LAUNCH_ARGS.iter().copied())
            .arg(format!("--user-agent={user_agent}"));
        if let Some(chrome) = config.chrome_executable() {
            builder = builder.chrome_executable(chrome);
        }
        if !config.headless() {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(SearchError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SearchError::Browser(e.to_string()))?;

        // Keep the CDP event stream drained. Chrome regularly speaks newer
        // protocol dialects than chromiumoxide recognizes; those messages are
        // noise, not failures.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    let msg = e.to_string();
                    if msg.contains("data did not match any variant of untagged enum Message") {
                        continue;
                    }
                    if msg.contains("connection closed")
                        || msg.contains("websocket")
                        || msg.contains("io error")
                    {
                        warn!("browser connection lost, stopping handler: {msg}");
                        break;
                    }
                    debug!("browser handler event error: {msg}");
                }
            }
            debug!("browser event handler task completed");
        });

        Ok(Self {
            browser,
            handler: handler_task,
            temp_profile,
        })
    }

    /// Open a blank page on this session.
    pub async fn new_page(&self) -> Result<Page> {
        self.browser
            .new_page("about:blank")
            .await
            .context("failed to open a new page")
    }

    /// Orderly shutdown: close the browser, stop the handler, remove any
    /// throwaway profile. Safe to call once before drop; every step is
    /// idempotent with the `Drop` fallback.
    pub async fn close(&mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("browser close error (ignored): {e}");
        }
        self.handler.abort();
        // Give Chrome a moment to release its profile locks before the
        // TempDir removal runs.
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.temp_profile.take();
        debug!("browser session closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Browser::drop kills the Chrome process; the handler must not
        // outlive it. TempDir removes itself when dropped.
        self.handler.abort();
    }
}
