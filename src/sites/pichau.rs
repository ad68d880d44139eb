//! Pichau storefront strategy and client.
//!
//! Pichau fronts its catalog with a bot screen, so searches run on a warmed
//! up persistent browser profile (see `vitrine profile-setup`) with stealth
//! injection enabled. Result pages are MUI card grids; the product link may
//! sit inside the card or wrap it from outside.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{error, info, warn};
use url::Url;

use super::{
    ExtractOutcome, SiteStrategy, attr_title, element_text, first_image_src, run_pipeline,
    select_first_text,
};
use crate::browser::BrowserSession;
use crate::config::ClientConfig;
use crate::error::SearchError;
use crate::price;
use crate::product::ProductItem;
use crate::query::QueryContext;
use crate::relevance;
use crate::text::norm_spaces;

pub const BASE_URL: &str = "https://www.pichau.com.br";

/// Default location of the warmed-up persistent profile.
pub const DEFAULT_PROFILE_DIR: &str = "chrome-profile";

/// Product cards on Pichau result pages.
const CARD_SELECTOR: &str = "div.MuiCard-root";

/// Card text lines longer than this are product names, not badges.
const MIN_TITLE_LINE_CHARS: usize = 16;

/// URL construction and DOM extraction for Pichau result pages.
#[derive(Default)]
pub struct PichauStrategy;

impl PichauStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Product link for a card: an `a[href]` descendant when the card wraps
    /// its own link, otherwise an `a` ancestor wrapping the card.
    fn card_link(card: ElementRef<'_>) -> Option<String> {
        let selector = Selector::parse("a[href]").ok()?;
        if let Some(anchor) = card.select(&selector).next() {
            if let Some(href) = anchor.value().attr("href") {
                return Some(href.to_string());
            }
        }
        card.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "a")
            .and_then(|anchor| anchor.value().attr("href").map(str::to_string))
    }

    fn absolutize(href: &str) -> Option<String> {
        let base = Url::parse(BASE_URL).ok()?;
        let joined = base.join(href).ok()?;
        // Stay on the storefront; cards occasionally embed outbound links.
        if !joined
            .host_str()
            .is_some_and(|host| host.ends_with("pichau.com.br"))
        {
            return None;
        }
        Some(joined.into())
    }

    /// Title fallback chain: heading, then the first long card text line,
    /// then element attributes.
    fn card_title(card: ElementRef<'_>) -> Option<String> {
        if let Some(title) = select_first_text(card, &["h2"], 1) {
            return Some(title);
        }
        if let Some(line) = card
            .text()
            .map(str::trim)
            .find(|line| line.chars().count() >= MIN_TITLE_LINE_CHARS)
        {
            return Some(norm_spaces(line));
        }
        attr_title(card)
    }
}

impl SiteStrategy for PichauStrategy {
    fn site(&self) -> &'static str {
        "pichau"
    }

    fn result_selector(&self) -> &'static str {
        CARD_SELECTOR
    }

    fn page_url(&self, query: &QueryContext, page_index: u32) -> String {
        format!(
            "{BASE_URL}/search?q={}&p={page_index}",
            urlencoding::encode(query.raw())
        )
    }

    fn extract(&self, markup: &str, query: &QueryContext, page_index: u32) -> ExtractOutcome {
        let document = Html::parse_document(markup);
        let Ok(card_selector) = Selector::parse(CARD_SELECTOR) else {
            return ExtractOutcome::empty();
        };

        let cards: Vec<_> = document.select(&card_selector).collect();
        let candidates_seen = cards.len();

        let mut items = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut filtered_out = 0usize;

        for card in cards {
            let text = element_text(card);
            // Cards without a price are banners and category tiles, not
            // product listings.
            if !text.contains("R$") {
                continue;
            }

            let Some(href) = Self::card_link(card) else {
                continue;
            };
            let Some(url) = Self::absolutize(&href) else {
                continue;
            };
            if !seen_urls.insert(url.clone()) {
                continue;
            }

            let Some(title) = Self::card_title(card) else {
                continue;
            };

            if !relevance::is_relevant(&title, query.keywords()) {
                filtered_out += 1;
                continue;
            }

            let price = price::parse(&text);
            let image = first_image_src(card);

            items.push(ProductItem {
                title,
                price,
                url,
                image,
                source: self.site().to_string(),
                page: page_index,
            });
        }

        ExtractOutcome {
            items,
            candidates_seen,
            filtered_out,
        }
    }
}

/// Search client for pichau.com.br.
pub struct PichauClient {
    config: ClientConfig,
}

impl PichauClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    fn profile_dir(&self) -> PathBuf {
        self.config
            .profile_dir()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROFILE_DIR))
    }

    /// Search Pichau for `query`, visiting at most `max_pages` result pages
    /// and returning at most `limit` items.
    ///
    /// Requires the persistent profile to exist: without that identity the
    /// site serves a bot challenge instead of results, so a missing profile
    /// fails the call rather than starting a degraded run.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        max_pages: u32,
    ) -> Result<Vec<ProductItem>, SearchError> {
        let profile_dir = self.profile_dir();
        if !profile_dir.exists() {
            error!(
                profile = %profile_dir.display(),
                "persistent profile missing, refusing to run without it"
            );
            return Err(SearchError::ProfileMissing { path: profile_dir });
        }

        let query = QueryContext::new(query);
        info!(
            query = query.raw(),
            limit,
            max_pages,
            profile = %profile_dir.display(),
            stealth = self.config.stealth(),
            "pichau search starting on persistent profile"
        );

        let strategy = PichauStrategy::new();
        let mut session = BrowserSession::launch_persistent(&self.config, &profile_dir).await?;
        let outcome = run_pipeline(&session, &strategy, &self.config, &query, limit, max_pages).await;
        session.close().await;

        let items = match outcome {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "search degraded to an empty result");
                Vec::new()
            }
        };
        info!(extracted = items.len(), limit, "pichau search finished");
        Ok(items)
    }
}

impl Default for PichauClient {
    /// Pichau defaults differ from the shared ones: a visible window on the
    /// persistent profile with stealth enabled, 36 items per page.
    fn default() -> Self {
        let config = ClientConfig {
            page_size: 36,
            headless: false,
            stealth: true,
            ..ClientConfig::default()
        };
        Self::new(config)
    }
}
