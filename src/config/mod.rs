//! Configuration for the review sampling pipeline

mod catalog;
mod credentials;
mod enrich;
mod fetch;
mod logging;
mod output;
mod sampling;

pub use catalog::CatalogConfig;
pub use credentials::{CredentialsConfig, API_KEY_ENV, COOKIES_ENV};
pub use enrich::{EnrichConfig, ENRICH_API_KEY_ENV};
pub use fetch::FetchConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use output::OutputConfig;
pub use sampling::SamplingConfig;

use anyhow::Result;
use std::path::Path;
use url::Url;

/// Main configuration for a pipeline run
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Rendering-proxy and target-site credentials
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Rendered-page fetch configuration
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Stratified sampling configuration
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Catalog discovery configuration
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Enrichment collaborator configuration
    #[serde(default)]
    pub enrich: EnrichConfig,
    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// After deserializing, validates all fields and resolves credentials
    /// from the environment so callers don't need a second setup step.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;
        config.validate()?;
        config.credentials.resolve_env();
        config.enrich.resolve_env();
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass rather than playing whack-a-mole.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if Url::parse(&self.fetch.endpoint).is_err() {
            errors.push(format!(
                "fetch endpoint is not a valid URL: '{}'",
                self.fetch.endpoint
            ));
        }
        if self.fetch.request_timeout_secs == 0 {
            errors.push("request_timeout_secs must be positive".to_string());
        }

        if self.sampling.review_pages == 0 {
            errors.push("review_pages must be positive".to_string());
        }
        if self.sampling.max_bucket_pages == 0 {
            errors.push("max_bucket_pages must be positive".to_string());
        }
        if !self.sampling.review_url_template.contains("{asin}") {
            errors.push("review_url_template must contain '{asin}'".to_string());
        }

        if !self.catalog.search_url_template.contains("{brand}") {
            errors.push("search_url_template must contain '{brand}'".to_string());
        }
        if self.catalog.brand_filters.is_empty() {
            errors.push("brand_filters must name at least one brand".to_string());
        }

        if self.enrich.model.is_empty() {
            errors.push("enrich model must not be empty".to_string());
        }
        if self.enrich.timeout_secs == 0 {
            errors.push("enrich timeout_secs must be positive".to_string());
        }

        if self.output.results_dir.as_os_str().is_empty() {
            errors.push("results_dir must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config::default()
    }

    // ========================================================================
    // Config::validate – happy path
    // ========================================================================

    #[test]
    fn default_config_passes_validation() {
        let cfg = valid_config();
        assert!(cfg.validate().is_ok(), "default config should be valid");
    }

    // ========================================================================
    // Config::validate – fetch errors
    // ========================================================================

    #[test]
    fn validate_rejects_bad_endpoint() {
        let mut cfg = valid_config();
        cfg.fetch.endpoint = "not a url".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("not a valid URL"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut cfg = valid_config();
        cfg.fetch.request_timeout_secs = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs must be positive"));
    }

    // ========================================================================
    // Config::validate – sampling errors
    // ========================================================================

    #[test]
    fn validate_rejects_zero_review_pages() {
        let mut cfg = valid_config();
        cfg.sampling.review_pages = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("review_pages must be positive"));
    }

    #[test]
    fn validate_rejects_template_without_asin_placeholder() {
        let mut cfg = valid_config();
        cfg.sampling.review_url_template = "https://example.com/reviews/".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("{asin}"));
    }

    // ========================================================================
    // Config::validate – multiple errors collected
    // ========================================================================

    #[test]
    fn validate_collects_multiple_errors() {
        let mut cfg = valid_config();
        cfg.sampling.review_pages = 0;
        cfg.sampling.max_bucket_pages = 0;
        cfg.enrich.model = String::new();
        let err = cfg.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("review_pages must be positive"));
        assert!(msg.contains("max_bucket_pages must be positive"));
        assert!(msg.contains("enrich model must not be empty"));
    }

    // ========================================================================
    // Default implementations – spot-check important values
    // ========================================================================

    #[test]
    fn default_sampling_config_values() {
        let s = SamplingConfig::default();
        assert_eq!(s.review_pages, 3);
        assert_eq!(s.max_bucket_pages, 5);
        assert_eq!(s.main_page_delay_ms, 2000);
        assert_eq!(s.bucket_page_delay_ms, 1000);
        assert_eq!(
            s.review_url("B0CZL2SLCJ"),
            "https://www.amazon.com/dp/product-reviews/B0CZL2SLCJ/"
        );
    }

    #[test]
    fn default_catalog_config_builds_brand_search_urls() {
        let c = CatalogConfig::default();
        let url = c.search_url("hp").expect("hp should have a filter entry");
        assert!(url.starts_with("https://www.amazon.com/s?k=hp+laptop&rh="));
        assert!(c.search_url("unknown-brand").is_none());
    }

    #[test]
    fn default_fetch_config_points_at_proxy() {
        let f = FetchConfig::default();
        assert_eq!(f.endpoint, "https://app.scrapingbee.com/api/v1");
        assert!(!f.block_resources);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = valid_config();
        let text = toml::to_string(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert!(back.validate().is_ok());
        assert_eq!(back.sampling.review_pages, cfg.sampling.review_pages);
    }
}
