//! Fluent builder for [`ClientConfig`].

use std::path::PathBuf;

use anyhow::{Result, bail};

use super::types::ClientConfig;

/// Builder with the same defaults as [`ClientConfig::default`].
///
/// Every field is optional; `build()` validates the combination once so the
/// traversal never has to re-check its knobs.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.config.page_size = page_size;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    #[must_use]
    pub fn stealth(mut self, stealth: bool) -> Self {
        self.config.stealth = stealth;
        self
    }

    #[must_use]
    pub fn profile_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.profile_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chrome_executable = Some(path.into());
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn debug_enabled(mut self, enabled: bool) -> Self {
        self.config.debug_enabled = enabled;
        self
    }

    #[must_use]
    pub fn debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.debug_dir = dir.into();
        self
    }

    #[must_use]
    pub fn zero_streak_stop(mut self, pages: u32) -> Self {
        self.config.zero_streak_stop = pages;
        self
    }

    #[must_use]
    pub fn retry_if_empty(mut self, retries: u32) -> Self {
        self.config.retry_if_empty = retries;
        self
    }

    #[must_use]
    pub fn nav_timeout_secs(mut self, secs: u64) -> Self {
        self.config.nav_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn selector_timeout_secs(mut self, secs: u64) -> Self {
        self.config.selector_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn scroll_rounds(mut self, rounds: u32) -> Self {
        self.config.scroll_rounds = rounds;
        self
    }

    #[must_use]
    pub fn scroll_step_px(mut self, pixels: i64) -> Self {
        self.config.scroll_step_px = pixels;
        self
    }

    #[must_use]
    pub fn scroll_pause_ms(mut self, millis: u64) -> Self {
        self.config.scroll_pause_ms = millis;
        self
    }

    /// Validate and produce the configuration record.
    pub fn build(self) -> Result<ClientConfig> {
        let config = self.config;
        if config.page_size == 0 {
            bail!("page_size must be greater than zero");
        }
        if config.zero_streak_stop == 0 {
            bail!("zero_streak_stop must be greater than zero");
        }
        if config.nav_timeout_secs == 0 || config.selector_timeout_secs == 0 {
            bail!("navigation and selector timeouts must be greater than zero");
        }
        if config.scroll_step_px <= 0 {
            bail!("scroll_step_px must be positive");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let config = ClientConfig::builder().build().expect("defaults are valid");
        assert_eq!(config.page_size(), 100);
        assert_eq!(config.zero_streak_stop(), 2);
        assert!(config.headless());
        assert!(!config.stealth());
    }

    #[test]
    fn rejects_zero_page_size() {
        assert!(ClientConfig::builder().page_size(0).build().is_err());
    }

    #[test]
    fn rejects_zero_streak_threshold() {
        assert!(ClientConfig::builder().zero_streak_stop(0).build().is_err());
    }

    #[test]
    fn overrides_apply() {
        let config = ClientConfig::builder()
            .page_size(36)
            .headless(false)
            .stealth(true)
            .profile_dir("./chrome-profile")
            .build()
            .expect("valid config");
        assert_eq!(config.page_size(), 36);
        assert!(!config.headless());
        assert!(config.stealth());
        assert_eq!(config.profile_dir().map(|p| p.to_string_lossy().into_owned()), Some("./chrome-profile".to_string()));
    }
}
