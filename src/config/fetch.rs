//! Rendering-proxy fetch configuration

use serde::{Deserialize, Serialize};

/// Fetch configuration for rendered-page requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Rendering proxy endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout (seconds); bounds every proxy call so a hung render
    /// cannot block the pipeline indefinitely
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Ask the proxy to load page resources (images, CSS) during rendering
    #[serde(default)]
    pub block_resources: bool,
}

fn default_endpoint() -> String {
    "https://app.scrapingbee.com/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    90
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_timeout_secs(),
            block_resources: false,
        }
    }
}
