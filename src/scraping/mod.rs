//! Stratified review sampling subsystem
//!
//! Implements the per-product review pipeline: rendered-page fetching
//! through the proxy seam, histogram analysis and quota derivation,
//! per-bucket stratified sampling, deduplication, and orchestration.
//!
//! Key components:
//! - `PageFetcher` / `RenderClient`: rendered-page requests via the proxy
//! - `HistogramAnalyzer`: rating distribution to per-bucket quotas
//! - `StratifiedSampler`: bucket pagination with early stop at quota
//! - `dedupe_reviews`: first-seen-order content deduplication
//! - `SamplingCoordinator`: orchestrates one product end to end

pub mod coordinator;
pub mod dedup;
pub mod fetcher;
pub mod histogram;
pub mod sampler;

pub use coordinator::{ProcessError, SampleStats, SamplingCoordinator};
pub use dedup::dedupe_reviews;
pub use fetcher::{with_page_params, FetchError, FetchStats, PageFetcher, RenderClient};
pub use histogram::{quota_for, HistogramAnalyzer, RatingBucket};
pub use sampler::{ReviewParser, StratifiedSampler};
