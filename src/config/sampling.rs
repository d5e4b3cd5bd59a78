//! Stratified sampling configuration

use serde::{Deserialize, Serialize};

/// Review sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Unfiltered review pages fetched per product to locate the histogram
    /// and product metadata
    #[serde(default = "default_review_pages")]
    pub review_pages: u32,
    /// Upper bound on pages fetched per rating bucket before accepting a
    /// quota shortfall
    #[serde(default = "default_max_bucket_pages")]
    pub max_bucket_pages: u32,
    /// Delay between consecutive main-page fetches (milliseconds)
    #[serde(default = "default_main_page_delay_ms")]
    pub main_page_delay_ms: u64,
    /// Delay between consecutive bucket-page fetches (milliseconds)
    #[serde(default = "default_bucket_page_delay_ms")]
    pub bucket_page_delay_ms: u64,
    /// Review page URL template; `{asin}` is replaced with the product id
    #[serde(default = "default_review_url_template")]
    pub review_url_template: String,
}

fn default_review_pages() -> u32 {
    3
}

fn default_max_bucket_pages() -> u32 {
    5
}

fn default_main_page_delay_ms() -> u64 {
    2000
}

fn default_bucket_page_delay_ms() -> u64 {
    1000
}

fn default_review_url_template() -> String {
    "https://www.amazon.com/dp/product-reviews/{asin}/".to_string()
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            review_pages: default_review_pages(),
            max_bucket_pages: default_max_bucket_pages(),
            main_page_delay_ms: default_main_page_delay_ms(),
            bucket_page_delay_ms: default_bucket_page_delay_ms(),
            review_url_template: default_review_url_template(),
        }
    }
}

impl SamplingConfig {
    /// The unfiltered review page URL for a product.
    pub fn review_url(&self, asin: &str) -> String {
        self.review_url_template.replace("{asin}", asin)
    }
}
