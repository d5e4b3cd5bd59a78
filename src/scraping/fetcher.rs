//! Rendered-page fetching through the external rendering proxy
//!
//! All network and rendering variability lives behind the [`PageFetcher`]
//! seam: the sampling logic above it is deterministic given a sequence of
//! fetch outcomes. The fetcher performs no retries; callers decide whether
//! to retry or move on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::{CredentialsConfig, FetchConfig, API_KEY_ENV};

/// Errors that can occur during a rendered-page fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("proxy returned status {0}")]
    Status(u16),
    #[error("rendering proxy API key missing (set {0})")]
    MissingApiKey(&'static str),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Fetch statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchStats {
    /// Total fetch attempts
    pub total_fetches: u64,
    /// Fetches that returned a page body
    pub successes: u64,
    /// Non-200 responses and transport failures
    pub failures: u64,
}

/// Seam for fetching rendered pages.
///
/// [`fetch`](PageFetcher::fetch) takes the target URL exactly as given;
/// [`fetch_page`](PageFetcher::fetch_page) injects pagination parameters
/// first. Test doubles script the outcome sequence through this trait.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the rendered markup of `url`.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;

    /// Fetch page `page` of `url`, injecting `pageNumber` and the default
    /// review-listing parameters. Failures are logged with the page number;
    /// the caller decides whether to continue.
    async fn fetch_page(&self, url: &Url, page: u32) -> Result<String, FetchError> {
        match self.fetch(&with_page_params(url, page)).await {
            Ok(markup) => Ok(markup),
            Err(e) => {
                warn!("Failed to retrieve page {}: {}", page, e);
                Err(e)
            }
        }
    }
}

/// Rewrite `url` for pagination: set `pageNumber`, adding `ie=UTF8` and
/// `reviewerType=all_reviews` only if absent.
pub fn with_page_params(url: &Url, page: u32) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut has_ie = false;
    let mut has_reviewer_type = false;

    let mut out = url.clone();
    {
        let mut query = out.query_pairs_mut();
        query.clear();
        for (key, value) in &pairs {
            match key.as_str() {
                // Replaced below with the requested page
                "pageNumber" => continue,
                "ie" => has_ie = true,
                "reviewerType" => has_reviewer_type = true,
                _ => {}
            }
            query.append_pair(key, value);
        }
        query.append_pair("pageNumber", &page.to_string());
        if !has_ie {
            query.append_pair("ie", "UTF8");
        }
        if !has_reviewer_type {
            query.append_pair("reviewerType", "all_reviews");
        }
    }
    out
}

/// Client for the external rendering proxy.
///
/// Issues one GET per page against the proxy endpoint with the target URL,
/// API key, and cookie header as query parameters. Only HTTP 200 counts as
/// success; any other status is a [`FetchError::Status`].
pub struct RenderClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    cookies: String,
    block_resources: bool,
    total: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
}

impl RenderClient {
    /// Create a new rendering-proxy client from resolved configuration.
    pub fn new(fetch: &FetchConfig, credentials: &CredentialsConfig) -> Result<Self, FetchError> {
        let api_key = credentials
            .api_key()
            .ok_or(FetchError::MissingApiKey(API_KEY_ENV))?
            .to_string();
        let endpoint = Url::parse(&fetch.endpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(fetch.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            cookies: credentials.cookies().to_string(),
            block_resources: fetch.block_resources,
            total: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        })
    }

    /// Snapshot of fetch statistics.
    pub fn stats(&self) -> FetchStats {
        FetchStats {
            total_fetches: self.total.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl PageFetcher for RenderClient {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.total.fetch_add(1, Ordering::Relaxed);
        debug!("Fetching {}", url);

        let result = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("url", url.as_str()),
                (
                    "block_resources",
                    if self.block_resources { "true" } else { "false" },
                ),
                ("cookies", self.cookies.as_str()),
            ])
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                return Err(e.into());
            }
        };

        let status = response.status();
        debug!("{} - HTTP {}", url, status);
        if status != StatusCode::OK {
            self.failures.fetch_add(1, Ordering::Relaxed);
            warn!("Fetch of {} failed with status {}", url, status);
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        self.successes.fetch_add(1, Ordering::Relaxed);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_added_to_bare_url() {
        let url = Url::parse("https://www.amazon.com/dp/product-reviews/B0CZL2SLCJ/").unwrap();
        let paged = with_page_params(&url, 3);
        assert_eq!(
            paged.as_str(),
            "https://www.amazon.com/dp/product-reviews/B0CZL2SLCJ/?pageNumber=3&ie=UTF8&reviewerType=all_reviews"
        );
    }

    #[test]
    fn existing_page_number_is_replaced() {
        let url = Url::parse("https://www.amazon.com/r?pageNumber=9&ie=UTF8").unwrap();
        let paged = with_page_params(&url, 2);
        let pairs: Vec<(String, String)> = paged
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs.iter().filter(|(k, _)| k == "pageNumber").count(),
            1,
            "pageNumber must appear exactly once"
        );
        assert!(pairs.contains(&("pageNumber".into(), "2".into())));
    }

    #[test]
    fn default_params_only_added_when_absent() {
        let url =
            Url::parse("https://www.amazon.com/r?reviewerType=avp_only_reviews&filterByStar=five_star")
                .unwrap();
        let paged = with_page_params(&url, 1);
        let query = paged.query().unwrap();
        assert!(query.contains("reviewerType=avp_only_reviews"));
        assert!(!query.contains("all_reviews"));
        assert!(query.contains("ie=UTF8"));
        assert!(query.contains("filterByStar=five_star"));
    }

    #[test]
    fn client_requires_api_key() {
        let err = RenderClient::new(&FetchConfig::default(), &CredentialsConfig::default())
            .err()
            .expect("missing key should fail");
        assert!(matches!(err, FetchError::MissingApiKey(_)));
    }
}
