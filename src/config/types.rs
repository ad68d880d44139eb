//! The client configuration record.
//!
//! One explicit record with enumerated, defaulted fields. Built via
//! [`ClientConfig::builder`], validated once at build time, and never
//! mutated during a traversal.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one site client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Items requested per page, where the site URL supports it.
    pub(crate) page_size: u32,
    pub(crate) headless: bool,
    /// Inject fingerprint-evasion scripts before navigation.
    pub(crate) stealth: bool,
    /// Persistent browser profile directory. Sites that need a warmed-up
    /// identity (Pichau) refuse to run when it is missing.
    pub(crate) profile_dir: Option<PathBuf>,
    /// Explicit Chromium binary; discovered automatically when unset.
    pub(crate) chrome_executable: Option<PathBuf>,
    pub(crate) user_agent: Option<String>,

    pub(crate) debug_enabled: bool,
    pub(crate) debug_dir: PathBuf,

    /// Stop after this many consecutive pages without newly accepted items.
    pub(crate) zero_streak_stop: u32,
    /// Retries when a page yields zero raw candidates.
    pub(crate) retry_if_empty: u32,

    pub(crate) nav_timeout_secs: u64,
    pub(crate) selector_timeout_secs: u64,
    /// Scroll-and-wait cycles used to kick lazily loaded content.
    pub(crate) scroll_rounds: u32,
    pub(crate) scroll_step_px: i64,
    pub(crate) scroll_pause_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            headless: true,
            stealth: false,
            profile_dir: None,
            chrome_executable: None,
            user_agent: None,
            debug_enabled: true,
            debug_dir: PathBuf::from("logs/debug"),
            zero_streak_stop: 2,
            retry_if_empty: 1,
            nav_timeout_secs: 30,
            selector_timeout_secs: 12,
            scroll_rounds: 5,
            scroll_step_px: 2600,
            scroll_pause_ms: 900,
        }
    }
}

impl ClientConfig {
    /// Fluent builder with validation at `build()`.
    #[must_use]
    pub fn builder() -> super::ClientConfigBuilder {
        super::ClientConfigBuilder::default()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn headless(&self) -> bool {
        self.headless
    }

    pub fn stealth(&self) -> bool {
        self.stealth
    }

    pub fn profile_dir(&self) -> Option<&Path> {
        self.profile_dir.as_deref()
    }

    pub fn chrome_executable(&self) -> Option<&Path> {
        self.chrome_executable.as_deref()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    pub fn debug_dir(&self) -> &Path {
        &self.debug_dir
    }

    pub fn zero_streak_stop(&self) -> u32 {
        self.zero_streak_stop
    }

    pub fn retry_if_empty(&self) -> u32 {
        self.retry_if_empty
    }

    pub fn nav_timeout(&self) -> Duration {
        Duration::from_secs(self.nav_timeout_secs)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_secs(self.selector_timeout_secs)
    }

    pub fn scroll_rounds(&self) -> u32 {
        self.scroll_rounds
    }

    pub fn scroll_step_px(&self) -> i64 {
        self.scroll_step_px
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }
}
