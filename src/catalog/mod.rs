//! Catalog discovery crawl
//!
//! A simple paginated list-scrape over brand search results: extracts
//! product identifiers and listing metadata from each result page and
//! follows the next-page link until pages run out or the product limit is
//! reached. The output seeds the review sampling core.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::CatalogConfig;
use crate::scraping::PageFetcher;
use crate::types::ProductSeed;

/// Errors that abort a discovery run before any page is fetched
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("brand '{0}' has no catalog filter configured")]
    UnknownBrand(String),
    #[error("invalid search URL '{url}': {source}")]
    InvalidSearchUrl {
        url: String,
        source: url::ParseError,
    },
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Crawls brand search listings into product seeds.
pub struct CatalogCrawler<'a> {
    fetcher: &'a dyn PageFetcher,
    config: &'a CatalogConfig,
    container: Selector,
    image: Selector,
    price: Selector,
    link: Selector,
    next_page: Selector,
}

impl<'a> CatalogCrawler<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, config: &'a CatalogConfig) -> Self {
        Self {
            fetcher,
            config,
            container: Selector::parse(
                "div[role='listitem'][data-component-type='s-search-result']",
            )
            .expect("valid selector"),
            image: Selector::parse("img.s-image").expect("valid selector"),
            price: Selector::parse("div[data-cy='price-recipe'] span.a-price > span.a-offscreen")
                .expect("valid selector"),
            link: Selector::parse("a.a-link-normal.s-no-outline").expect("valid selector"),
            next_page: Selector::parse("li.a-last a").expect("valid selector"),
        }
    }

    /// Crawl a brand's search listing and return its product seeds.
    ///
    /// Stops at `max_products` seeds, on the last page, or on the first
    /// failed listing fetch. Whatever was collected so far is returned, in
    /// keeping with the catalog's best-effort contract (completeness is not
    /// guaranteed under anti-bot blocking).
    pub async fn discover(
        &self,
        brand: &str,
        max_products: Option<usize>,
    ) -> Result<Vec<ProductSeed>, CatalogError> {
        if max_products == Some(0) {
            info!("max_products is 0; skipping discovery for '{}'", brand);
            return Ok(Vec::new());
        }

        let url = self
            .config
            .search_url(brand)
            .ok_or_else(|| CatalogError::UnknownBrand(brand.to_string()))?;
        let mut current = Url::parse(&url)
            .map_err(|source| CatalogError::InvalidSearchUrl { url, source })?;
        info!("Starting catalog discovery at {}", current);

        let mut seeds: Vec<ProductSeed> = Vec::new();
        loop {
            let markup = match self.fetcher.fetch(&current).await {
                Ok(markup) => markup,
                Err(e) => {
                    warn!("Listing fetch failed ({}); stopping discovery", e);
                    break;
                }
            };

            if self.collect_page(&markup, &current, max_products, &mut seeds) {
                info!("Reached maximum product limit: {}", seeds.len());
                break;
            }

            match self.next_page_url(&markup, &current) {
                Some(next) => {
                    debug!("Following pagination link: {}", next);
                    tokio::time::sleep(Duration::from_millis(self.config.listing_page_delay_ms))
                        .await;
                    current = next;
                }
                None => {
                    info!("No further listing pages");
                    break;
                }
            }
        }

        info!("Discovered {} products for '{}'", seeds.len(), brand);
        Ok(seeds)
    }

    /// Extract seeds from one listing page; true when the limit is reached.
    fn collect_page(
        &self,
        markup: &str,
        base_url: &Url,
        max_products: Option<usize>,
        seeds: &mut Vec<ProductSeed>,
    ) -> bool {
        let document = Html::parse_document(markup);
        for container in document.select(&self.container) {
            let Some(asin) = container
                .value()
                .attr("data-asin")
                .filter(|a| !a.trim().is_empty())
            else {
                continue;
            };

            let image_url = container
                .select(&self.image)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(str::to_string);
            let price = container.select(&self.price).next().map(text_of);
            let product_url = container
                .select(&self.link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| base_url.join(href).ok())
                .map(|u| u.to_string());

            debug!("Found product {}", asin);
            seeds.push(ProductSeed {
                asin: asin.to_string(),
                price,
                image_url,
                product_url,
            });

            if max_products.is_some_and(|max| seeds.len() >= max) {
                return true;
            }
        }
        false
    }

    fn next_page_url(&self, markup: &str, base_url: &Url) -> Option<Url> {
        let document = Html::parse_document(markup);
        let anchor = document.select(&self.next_page).next()?;
        let href = anchor.value().attr("href")?;
        base_url.join(href).ok()
    }
}
