//! Catalog discovery configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catalog listing crawl configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Search URL template; `{brand}` and `{filter}` are substituted
    #[serde(default = "default_search_url_template")]
    pub search_url_template: String,
    /// Delay between consecutive listing-page fetches (milliseconds)
    #[serde(default = "default_listing_page_delay_ms")]
    pub listing_page_delay_ms: u64,
    /// Per-brand catalog filter query fragments appended to the search URL
    #[serde(default = "default_brand_filters")]
    pub brand_filters: BTreeMap<String, String>,
}

fn default_search_url_template() -> String {
    "https://www.amazon.com/s?k={brand}+laptop{filter}".to_string()
}

fn default_brand_filters() -> BTreeMap<String, String> {
    [
        ("hp", "&rh=n%3A21512780011%2Cp_123%3A308445"),
        ("dell", "&rh=n%3A21512780011%2Cp_123%3A241862"),
        ("lenovo", "&rh=n%3A21512780011%2Cp_123%3A391242"),
        ("apple", "&rh=n%3A21512780011%2Cp_123%3A110955"),
        ("lg", "&rh=n%3A21512780011%2Cp_123%3A46658"),
    ]
    .into_iter()
    .map(|(brand, filter)| (brand.to_string(), filter.to_string()))
    .collect()
}

fn default_listing_page_delay_ms() -> u64 {
    1000
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            search_url_template: default_search_url_template(),
            listing_page_delay_ms: default_listing_page_delay_ms(),
            brand_filters: default_brand_filters(),
        }
    }
}

impl CatalogConfig {
    /// Search URL for a brand, or None if the brand has no filter entry.
    pub fn search_url(&self, brand: &str) -> Option<String> {
        let filter = self.brand_filters.get(brand)?;
        Some(
            self.search_url_template
                .replace("{brand}", brand)
                .replace("{filter}", filter),
        )
    }
}
