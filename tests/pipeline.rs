//! Integration tests for the stratified review sampling pipeline
//!
//! Drives the coordinator and store end to end against a scripted fetcher,
//! verifying the quota, failure-isolation, and append-only properties.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use revstrata::config::SamplingConfig;
use revstrata::scraping::{FetchError, PageFetcher, SamplingCoordinator};
use revstrata::store::OutputStore;
use revstrata::types::{ProductRecord, ProductSeed, StarRating};
use tempfile::TempDir;
use url::Url;

/// Replays a fixed sequence of fetch outcomes, counting calls.
struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<String, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn new(responses: Vec<Result<String, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, _url: &Url) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}

fn review_page(texts: &[&str]) -> String {
    let nodes: String = texts
        .iter()
        .map(|text| {
            format!(
                r##"<li data-hook="review">
                     <a class="a-profile" href="#"><div class="a-profile-content">
                       <span class="a-profile-name">Reviewer</span></div></a>
                     <i data-hook="review-star-rating"><span class="a-icon-alt">5.0 out of 5 stars</span></i>
                     <span data-hook="review-date">Reviewed on June 2, 2024</span>
                     <span data-hook="review-body"><span>{}</span></span>
                   </li>"##,
                text
            )
        })
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", nodes)
}

fn main_page(entries: &[(u8, u8)]) -> String {
    let rows: String = entries
        .iter()
        .map(|(stars, percentage)| {
            format!(
                r#"<li><a aria-label="{stars} stars represent {percentage}% of rating"
                       href="/r?filterByStar={stars}_star">{stars} star</a></li>"#,
            )
        })
        .collect();
    format!(
        r#"<html><body>
           <h1 class="product-info-title"><a>Test Laptop 15</a></h1>
           <i data-hook="average-star-rating"><span class="a-icon-alt">4.3 out of 5 stars</span></i>
           <div data-hook="total-review-count"><span>1,204 global ratings</span></div>
           <ul id="histogramTable">{rows}</ul>
           </body></html>"#,
    )
}

fn fast_config() -> SamplingConfig {
    SamplingConfig {
        review_pages: 1,
        max_bucket_pages: 3,
        main_page_delay_ms: 0,
        bucket_page_delay_ms: 0,
        ..SamplingConfig::default()
    }
}

fn seed(asin: &str) -> ProductSeed {
    ProductSeed::new(asin)
}

/// Histogram {5: 70%, 4: 20%, 3: 0%} yields quotas {7, 2, 0}; only the
/// 5- and 4-star buckets are fetched and the final review count never
/// exceeds the quota sum.
#[tokio::test]
async fn stratified_sampling_end_to_end() {
    let fetcher = ScriptedFetcher::new(vec![
        Ok(main_page(&[(5, 70), (4, 20), (3, 0)])),
        // 5-star bucket, quota 7
        Ok(review_page(&["r1", "r2", "r3", "r4"])),
        Ok(review_page(&["r5", "r6", "r7", "r8"])),
        // 4-star bucket, quota 2
        Ok(review_page(&["q1", "q2", "q3"])),
    ]);
    let config = fast_config();
    let mut coordinator = SamplingCoordinator::new(&fetcher, &config);
    let record = coordinator.process(&seed("B0TEST")).await.unwrap();

    assert_eq!(record.quotas[&StarRating::Five], 7);
    assert_eq!(record.quotas[&StarRating::Four], 2);
    assert_eq!(record.quotas[&StarRating::Three], 0);
    assert_eq!(record.reviews.len() as u32, record.quota_total());
    assert_eq!(record.reviews.len(), 9);
    // 1 main + 2 five-star + 1 four-star; the zero-quota bucket fetches nothing
    assert_eq!(fetcher.calls(), 4);
    assert!(record
        .reviews
        .iter()
        .all(|review| !review.review_text.is_empty()));
}

/// A 500 on the first bucket page is recovered by the second; once the
/// quota is met no further page is fetched.
#[tokio::test]
async fn failed_bucket_page_recovers_and_stops_at_quota() {
    let fetcher = ScriptedFetcher::new(vec![
        Ok(main_page(&[(5, 30)])),
        Err(FetchError::Status(500)),
        Ok(review_page(&["a", "b", "c", "d", "e"])),
    ]);
    let config = fast_config();
    let mut coordinator = SamplingCoordinator::new(&fetcher, &config);
    let record = coordinator.process(&seed("B0TEST")).await.unwrap();

    assert_eq!(record.reviews.len(), 3);
    // 1 main + failed page 1 + successful page 2; page 3 never requested
    assert_eq!(fetcher.calls(), 3);
}

/// A product whose main pages all fail produces an empty record in the
/// store and the batch proceeds to the next product.
#[tokio::test]
async fn failed_product_appends_empty_record_and_batch_continues() {
    let dir = TempDir::new().unwrap();
    let store = OutputStore::open(dir.path()).unwrap();

    let fetcher = ScriptedFetcher::new(vec![
        // First product: main page fails outright
        Err(FetchError::Status(503)),
        // Second product: succeeds with a single bucket
        Ok(main_page(&[(5, 20)])),
        Ok(review_page(&["works fine"])),
    ]);
    let config = fast_config();
    let mut coordinator = SamplingCoordinator::new(&fetcher, &config);

    for asin in ["B0FAIL", "B0GOOD"] {
        let record = match coordinator.process(&seed(asin)).await {
            Ok(record) => record,
            Err(_) => ProductRecord::empty(),
        };
        store.append("hp", record).unwrap();
    }

    let records = store.load("hp").unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].is_empty());
    assert_eq!(records[1].product_id.as_deref(), Some("B0GOOD"));
    assert_eq!(records[1].reviews.len(), 1);
}

/// Appending to an existing store grows it by exactly one and leaves
/// earlier entries untouched.
#[tokio::test]
async fn store_accumulates_across_runs() {
    let dir = TempDir::new().unwrap();
    let store = OutputStore::open(dir.path()).unwrap();

    let run = |texts: Vec<Result<String, FetchError>>, asin: &'static str| async {
        let fetcher = ScriptedFetcher::new(texts);
        let config = fast_config();
        let mut coordinator = SamplingCoordinator::new(&fetcher, &config);
        coordinator.process(&seed(asin)).await.unwrap()
    };

    let first = run(
        vec![Ok(main_page(&[(5, 10)])), Ok(review_page(&["one"]))],
        "B0A",
    )
    .await;
    store.append("hp", first).unwrap();
    let before = store.load("hp").unwrap().len();

    let second = run(
        vec![Ok(main_page(&[(4, 10)])), Ok(review_page(&["two"]))],
        "B0B",
    )
    .await;
    store.append("hp", second).unwrap();
    let after = store.load("hp").unwrap();

    assert_eq!(after.len(), before + 1);
    assert_eq!(after[0].product_id.as_deref(), Some("B0A"));
    assert_eq!(after[1].product_id.as_deref(), Some("B0B"));
}

/// Identical review text reachable from overlapping bucket filters
/// collapses to the first occurrence.
#[tokio::test]
async fn overlapping_buckets_dedupe_to_first_seen() {
    let fetcher = ScriptedFetcher::new(vec![
        Ok(main_page(&[(5, 10), (4, 10)])),
        Ok(review_page(&["same words either way"])),
        Ok(review_page(&["same words either way"])),
    ]);
    let config = fast_config();
    let mut coordinator = SamplingCoordinator::new(&fetcher, &config);
    let record = coordinator.process(&seed("B0TEST")).await.unwrap();

    assert_eq!(record.reviews.len(), 1);
    assert!(record.reviews.len() as u32 <= record.quota_total());
}
