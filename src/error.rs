//! Public error type for the search entry points.
//!
//! Only prerequisites that make a run impossible surface here. Page-level
//! conditions (navigation timeouts, unreadable cards, unparsable prices)
//! degrade to fewer items and are visible in logs only.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of a `search` call.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The persistent browser profile this site requires does not exist.
    ///
    /// Running without it would hit a bot challenge page instead of real
    /// results, so the call refuses to start a degraded run.
    #[error("persistent browser profile not found at {}; run `vitrine profile-setup` first", .path.display())]
    ProfileMissing { path: PathBuf },

    /// Chromium could not be launched or connected to.
    #[error("failed to launch browser: {0}")]
    Browser(String),
}
