//! Stratified per-bucket review sampling
//!
//! For each rating bucket the sampler walks the bucket-filtered review
//! pages until the bucket's quota is met or pages run out. A failed page is
//! logged and skipped; a single bad page never aborts the bucket.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use super::fetcher::PageFetcher;
use super::histogram::RatingBucket;
use crate::types::ReviewRecord;

/// Collect the visible text of an element, trimmed.
fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parses review nodes out of a rendered review page.
pub struct ReviewParser {
    node: Selector,
    body: Selector,
    name: Selector,
    rating: Selector,
    date: Selector,
}

impl Default for ReviewParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewParser {
    pub fn new() -> Self {
        Self {
            node: Selector::parse("li[data-hook='review']").expect("valid selector"),
            body: Selector::parse("span[data-hook='review-body'] span").expect("valid selector"),
            name: Selector::parse("a.a-profile > div.a-profile-content > span.a-profile-name")
                .expect("valid selector"),
            rating: Selector::parse("i[data-hook='review-star-rating'] span.a-icon-alt")
                .expect("valid selector"),
            date: Selector::parse("span[data-hook='review-date']").expect("valid selector"),
        }
    }

    /// Extract all review records on a page, in node order.
    ///
    /// A node without body text carries no sampling value and is skipped;
    /// the other fields degrade to empty strings when their markup is
    /// missing.
    pub fn parse_page(&self, markup: &str) -> Vec<ReviewRecord> {
        let document = Html::parse_document(markup);
        let mut reviews = Vec::new();

        for node in document.select(&self.node) {
            let review_text = match node.select(&self.body).next() {
                Some(body) => text_of(body),
                None => continue,
            };
            if review_text.is_empty() {
                continue;
            }

            let reviewer_name = node.select(&self.name).next().map(text_of).unwrap_or_default();
            let star_rating = node
                .select(&self.rating)
                .next()
                .map(text_of)
                .unwrap_or_default();
            let review_date = node.select(&self.date).next().map(text_of).unwrap_or_default();

            reviews.push(ReviewRecord {
                reviewer_name,
                star_rating,
                review_date,
                review_text,
            });
        }

        reviews
    }
}

/// Samples one rating bucket at a time through the fetcher seam.
pub struct StratifiedSampler<'a> {
    fetcher: &'a dyn PageFetcher,
    parser: ReviewParser,
    max_pages: u32,
    page_delay: Duration,
}

impl<'a> StratifiedSampler<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, max_pages: u32, page_delay: Duration) -> Self {
        Self {
            fetcher,
            parser: ReviewParser::new(),
            max_pages,
            page_delay,
        }
    }

    /// Sample up to `bucket.quota` reviews from the bucket's filtered pages.
    ///
    /// Stops as soon as the quota is met, never fetching further pages and
    /// never returning more than the quota. Fewer reviews than the quota is
    /// a soft shortfall (pagination exhausted), not an error. Buckets with
    /// quota 0 or no resolvable URL issue zero fetches.
    pub async fn sample_bucket(&self, bucket: &RatingBucket) -> Vec<ReviewRecord> {
        if bucket.quota == 0 {
            debug!("{} bucket has quota 0; skipping", bucket.stars);
            return Vec::new();
        }
        let Some(url) = &bucket.url else {
            warn!("{} bucket has no review URL; contributing zero reviews", bucket.stars);
            return Vec::new();
        };

        let quota = bucket.quota as usize;
        let mut collected: Vec<ReviewRecord> = Vec::with_capacity(quota);

        for page in 1..=self.max_pages {
            if page > 1 {
                tokio::time::sleep(self.page_delay).await;
            }
            match self.fetcher.fetch_page(url, page).await {
                Ok(markup) => {
                    let reviews = self.parser.parse_page(&markup);
                    debug!(
                        "{} bucket: page {} yielded {} reviews",
                        bucket.stars,
                        page,
                        reviews.len()
                    );
                    collected.extend(reviews);
                    if collected.len() >= quota {
                        collected.truncate(quota);
                        break;
                    }
                }
                Err(e) => {
                    warn!("{} bucket: page {} failed ({}); moving on", bucket.stars, page, e);
                }
            }
        }

        info!(
            "Collected {}/{} reviews for {} bucket",
            collected.len(),
            bucket.quota,
            bucket.stars
        );
        collected
    }
}
