//! Kabum storefront strategy and client.
//!
//! Kabum renders result pages as a grid of product anchors; the anchor href
//! carries the product URL and the card around it carries the price text.
//! Searches run on a throwaway headless browser.

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{info, warn};
use url::Url;

use super::{
    ExtractOutcome, SiteStrategy, attr_title, containing_card, element_text, first_image_src,
    run_pipeline, select_first_text,
};
use crate::browser::BrowserSession;
use crate::config::ClientConfig;
use crate::error::SearchError;
use crate::price;
use crate::product::ProductItem;
use crate::query::QueryContext;
use crate::relevance;
use crate::text::norm_spaces;

const BASE_URL: &str = "https://www.kabum.com.br";

/// Product listings are anchors whose href goes through /produto/.
const PRODUCT_ANCHOR: &str = "a[href*='/produto/']";

/// Hard cap on anchors inspected per page. Result pages top out well below
/// this; the cap bounds pathological markup.
const MAX_CANDIDATES_PER_PAGE: usize = 2500;

/// Ordered title lookup chain inside a product anchor.
const TITLE_SELECTORS: &[&str] = &["h2", "h3", "[data-testid='product-title']", "span"];

/// Structural titles shorter than this are badges, not product names.
const MIN_TITLE_CHARS: usize = 6;

lazy_static! {
    static ref BASE: Url = Url::parse(BASE_URL).expect("base URL parses");
}

/// URL construction and DOM extraction for Kabum result pages.
pub struct KabumStrategy {
    page_size: u32,
}

impl KabumStrategy {
    pub fn new(page_size: u32) -> Self {
        Self { page_size }
    }

    /// Kabum search slugs are upper-cased with dashes for spaces.
    fn search_slug(query: &str) -> String {
        let upper = norm_spaces(query).to_uppercase().replace(' ', "-");
        urlencoding::encode(&upper).into_owned()
    }

    fn absolutize(href: &str) -> Option<String> {
        BASE.join(href).ok().map(Into::into)
    }
}

impl SiteStrategy for KabumStrategy {
    fn site(&self) -> &'static str {
        "kabum"
    }

    fn result_selector(&self) -> &'static str {
        PRODUCT_ANCHOR
    }

    fn page_url(&self, query: &QueryContext, page_index: u32) -> String {
        format!(
            "{BASE_URL}/busca/{}?page_number={page_index}&page_size={}&facet_filters=&sort=most_searched&variant=catalog",
            Self::search_slug(query.raw()),
            self.page_size,
        )
    }

    fn extract(&self, markup: &str, query: &QueryContext, page_index: u32) -> ExtractOutcome {
        let document = Html::parse_document(markup);
        let Ok(anchor_selector) = Selector::parse(PRODUCT_ANCHOR) else {
            return ExtractOutcome::empty();
        };

        let anchors: Vec<_> = document.select(&anchor_selector).collect();
        let candidates_seen = anchors.len();

        let mut items = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut filtered_out = 0usize;

        for anchor in anchors.into_iter().take(MAX_CANDIDATES_PER_PAGE) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(url) = Self::absolutize(href) else {
                continue;
            };
            if !url.contains("/produto/") {
                continue;
            }
            // Grids repeat the same product link for image and title; dedup
            // within the page before the relevance filter sees it.
            if !seen_urls.insert(url.clone()) {
                continue;
            }

            let title = select_first_text(anchor, TITLE_SELECTORS, MIN_TITLE_CHARS)
                .or_else(|| attr_title(anchor));
            let Some(title) = title else {
                continue;
            };

            if !relevance::is_relevant(&title, query.keywords()) {
                filtered_out += 1;
                continue;
            }

            let image = first_image_src(anchor);
            let price = containing_card(anchor).and_then(|card| price::parse(&element_text(card)));

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

/// Search client for kabum.com.br.
pub struct KabumClient {
    config: ClientConfig,
}

impl KabumClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Search Kabum for `query`, visiting at most `max_pages` result pages
    /// and returning at most `limit` items.
    ///
    /// Page-level failures degrade to fewer items; only a browser that
    /// cannot be launched fails the call.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        max_pages: u32,
    ) -> Result<Vec<ProductItem>, SearchError> {
        let query = QueryContext::new(query);
        info!(
            query = query.raw(),
            limit,
            max_pages,
            page_size = self.config.page_size(),
            headless = self.config.headless(),
            "kabum search starting"
        );

        let strategy = KabumStrategy::new(self.config.page_size());
        let mut session = BrowserSession::launch_ephemeral(&self.config).await?;
        let outcome = run_pipeline(&session, &strategy, &self.config, &query, limit, max_pages).await;
        session.close().await;

        let items = match outcome {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "search degraded to an empty result");
                Vec::new()
            }
        };
        info!(extracted = items.len(), limit, "kabum search finished");
        Ok(items)
    }
}

impl Default for KabumClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> KabumStrategy {
        KabumStrategy::new(100)
    }

    fn ctx(query: &str) -> QueryContext {
        QueryContext::new(query)
    }

    #[test]
    fn page_url_carries_slug_and_paging() {
        let url = strategy().page_url(&ctx("controle ps5"), 2);
        assert_eq!(
            url,
            "https://www.kabum.com.br/busca/CONTROLE-PS5?page_number=2&page_size=100&facet_filters=&sort=most_searched&variant=catalog"
        );
    }

    #[test]
    fn slug_percent_encodes_accents() {
        let url = strategy().page_url(&ctx("fone é bom"), 1);
        assert!(url.contains("/busca/FONE-%C3%89-BOM?"));
    }

    const FIXTURE: &str = r#"
        <main>
          <a href="/promocoes">Ver ofertas</a>
          <article>
            <a href="/produto/1001/controle-dualsense-branco">
              <h2>Controle Sem Fio DualSense Branco PS5</h2>
              <img src="https://images.kabum.com.br/1001.jpg" />
            </a>
            <span>R$ 449,90 à vista</span>
          </article>
          <article>
            <a href="/produto/1001/controle-dualsense-branco">
              <img src="https://images.kabum.com.br/1001-thumb.jpg" />
            </a>
          </article>
          <article>
            <a href="/produto/1002/capa-silicone-controle">
              <h2>Capa Silicone para Controle PS5</h2>
            </a>
            <span>R$ 59,90</span>
          </article>
          <article>
            <a href="/produto/1003/controle-dualsense-edge" aria-label="Controle DualSense Edge PS5">
            </a>
            <div>R$ 1.099,99 no pix</div>
          </article>
          <article>
            <a href="/produto/1004/sem-titulo"></a>
          </article>
        </main>
    "#;

    #[test]
    fn extracts_relevant_unique_products() {
        let outcome = strategy().extract(FIXTURE, &ctx("controle ps5"), 1);

        // The promo anchor does not match the structural selector; the
        // duplicate, the accessory, and the titleless anchor all do.
        assert_eq!(outcome.candidates_seen, 5);
        assert_eq!(outcome.filtered_out, 1);
        assert_eq!(outcome.items.len(), 2);

        let first = &outcome.items[0];
        assert_eq!(first.title, "Controle Sem Fio DualSense Branco PS5");
        assert_eq!(first.url, "https://www.kabum.com.br/produto/1001/controle-dualsense-branco");
        assert_eq!(first.price, Some(449.90));
        assert_eq!(first.image.as_deref(), Some("https://images.kabum.com.br/1001.jpg"));
        assert_eq!(first.source, "kabum");
        assert_eq!(first.page, 1);

        // Attribute fallback resolved the second title; price came from the
        // containing card.
        let second = &outcome.items[1];
        assert_eq!(second.title, "Controle DualSense Edge PS5");
        assert_eq!(second.price, Some(1099.99));
        assert_eq!(second.image, None);
    }

    #[test]
    fn empty_markup_yields_empty_outcome() {
        let outcome = strategy().extract("<html><body></body></html>", &ctx("controle ps5"), 1);
        assert_eq!(outcome.candidates_seen, 0);
        assert!(outcome.items.is_empty());
    }

    #[test]
    fn page_index_is_stamped_on_items() {
        let outcome = strategy().extract(FIXTURE, &ctx("controle ps5"), 3);
        assert!(outcome.items.iter().all(|item| item.page == 3));
    }
}
