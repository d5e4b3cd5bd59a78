//! Sampling coordinator orchestrating one product end to end
//!
//! Coordinates the flow from the unfiltered main-page sweep through
//! histogram analysis, per-bucket sampling, deduplication, and metadata
//! extraction into a single [`ProductRecord`]. Failure isolation is an
//! explicit result type: the batch driver decides to log-and-continue, so
//! the never-abort-the-batch policy is a testable contract rather than a
//! catch-all.

use std::collections::BTreeMap;
use std::time::Duration;

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::dedup::dedupe_reviews;
use super::fetcher::PageFetcher;
use super::histogram::HistogramAnalyzer;
use super::sampler::StratifiedSampler;
use crate::config::SamplingConfig;
use crate::types::{ProductRecord, ProductSeed};

/// Errors that abort a single product run.
///
/// The run for one product fails as a unit; the batch driver emits an empty
/// record and moves on.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("invalid review page URL '{url}': {source}")]
    InvalidReviewUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("no main review page could be fetched for {product_id}")]
    MainPagesUnavailable { product_id: String },
}

/// Statistics accumulated across product runs
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleStats {
    /// Main-page fetches that returned markup
    pub main_pages_fetched: u64,
    /// Main-page fetches that failed
    pub main_pages_failed: u64,
    /// Buckets sampled (quota > 0 with a resolvable URL)
    pub buckets_sampled: u64,
    /// Unique reviews kept after deduplication
    pub reviews_sampled: u64,
    /// Reviews dropped as duplicates
    pub duplicates_removed: u64,
}

/// Product metadata pulled from the main review pages
struct MainMetadata {
    title: Option<String>,
    average_rating: Option<String>,
    review_count: Option<String>,
}

/// Orchestrates the stratified sampling pipeline for one product at a time.
///
/// Strictly sequential: one fetch in flight, one bucket after another. The
/// fetcher seam keeps the orchestration deterministic under test.
pub struct SamplingCoordinator<'a> {
    fetcher: &'a dyn PageFetcher,
    config: &'a SamplingConfig,
    analyzer: HistogramAnalyzer,
    title: Selector,
    average_rating: Selector,
    review_count: Selector,
    stats: SampleStats,
}

impl<'a> SamplingCoordinator<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, config: &'a SamplingConfig) -> Self {
        Self {
            fetcher,
            config,
            analyzer: HistogramAnalyzer::new(),
            title: Selector::parse("h1.product-info-title a").expect("valid selector"),
            average_rating: Selector::parse("i[data-hook='average-star-rating'] span.a-icon-alt")
                .expect("valid selector"),
            review_count: Selector::parse("div[data-hook='total-review-count'] span")
                .expect("valid selector"),
            stats: SampleStats::default(),
        }
    }

    /// Statistics accumulated so far.
    pub fn stats(&self) -> SampleStats {
        self.stats
    }

    /// Run the full pipeline for one product seed.
    ///
    /// An `Err` means nothing usable was collected; a successfully parsed
    /// main page with zero usable histogram buckets still produces a record
    /// (with empty histogram, quotas, and reviews), a degraded run the
    /// artifact makes visible rather than a retryable failure.
    pub async fn process(&mut self, seed: &ProductSeed) -> Result<ProductRecord, ProcessError> {
        let url = self.config.review_url(&seed.asin);
        let main_url = Url::parse(&url)
            .map_err(|source| ProcessError::InvalidReviewUrl { url, source })?;

        info!("Sampling reviews for {}", seed.asin);
        let combined = self.sweep_main_pages(&main_url, &seed.asin).await?;

        let buckets = self.analyzer.parse(&combined, &main_url);
        if buckets.is_empty() {
            warn!(
                "No usable histogram buckets for {}; emitting record without reviews",
                seed.asin
            );
        }

        let sampler = StratifiedSampler::new(
            self.fetcher,
            self.config.max_bucket_pages,
            Duration::from_millis(self.config.bucket_page_delay_ms),
        );
        let mut sampled = Vec::new();
        for bucket in &buckets {
            if bucket.quota == 0 {
                debug!("{} bucket has quota 0; not sampled", bucket.stars);
                continue;
            }
            debug!(
                "Sampling up to {} reviews for {} bucket",
                bucket.quota, bucket.stars
            );
            if bucket.url.is_some() {
                self.stats.buckets_sampled += 1;
            }
            sampled.extend(sampler.sample_bucket(bucket).await);
        }

        let before = sampled.len();
        let reviews = dedupe_reviews(sampled);
        self.stats.duplicates_removed += (before - reviews.len()) as u64;
        self.stats.reviews_sampled += reviews.len() as u64;

        let metadata = self.extract_metadata(&combined);

        let mut histogram = BTreeMap::new();
        let mut quotas = BTreeMap::new();
        for bucket in &buckets {
            histogram.insert(bucket.stars, bucket.percentage_label());
            quotas.insert(bucket.stars, bucket.quota);
        }

        info!(
            "Sampled {} unique reviews for {} across {} buckets",
            reviews.len(),
            seed.asin,
            buckets.iter().filter(|b| b.quota > 0).count()
        );

        Ok(ProductRecord {
            title: metadata.title,
            product_id: Some(seed.asin.clone()),
            price: seed.price.clone(),
            image_url: seed.image_url.clone(),
            product_url: seed.product_url.clone(),
            average_rating: metadata.average_rating,
            review_count: metadata.review_count,
            histogram,
            quotas,
            reviews,
            review_summary: None,
            review_sentiments: None,
        })
    }

    /// Fetch the unfiltered review pages and concatenate their markup.
    ///
    /// Individual page failures are tolerated; only a sweep with zero
    /// successful pages fails the product.
    async fn sweep_main_pages(
        &mut self,
        main_url: &Url,
        product_id: &str,
    ) -> Result<String, ProcessError> {
        let mut combined = String::new();
        let mut fetched = 0u32;

        for page in 1..=self.config.review_pages {
            if page > 1 {
                tokio::time::sleep(Duration::from_millis(self.config.main_page_delay_ms)).await;
            }
            debug!("Processing main review page {} for {}", page, product_id);
            match self.fetcher.fetch_page(main_url, page).await {
                Ok(markup) => {
                    combined.push_str(&markup);
                    combined.push('\n');
                    fetched += 1;
                    self.stats.main_pages_fetched += 1;
                }
                Err(_) => {
                    self.stats.main_pages_failed += 1;
                }
            }
        }

        if fetched == 0 {
            return Err(ProcessError::MainPagesUnavailable {
                product_id: product_id.to_string(),
            });
        }
        Ok(combined)
    }

    fn extract_metadata(&self, markup: &str) -> MainMetadata {
        let document = Html::parse_document(markup);
        let text = |selector: &Selector| {
            document
                .select(selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty())
        };
        MainMetadata {
            title: text(&self.title),
            average_rating: text(&self.average_rating),
            review_count: text(&self.review_count),
        }
    }
}
