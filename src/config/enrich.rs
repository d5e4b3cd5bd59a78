//! Enrichment collaborator configuration (summaries and sentiment tags)

use serde::{Deserialize, Serialize};

/// Environment variable consulted when the config file carries no key
pub const ENRICH_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for the OpenAI-compatible text-classification services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichConfig {
    /// Chat-completions endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,
    /// API key (falls back to `OPENAI_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EnrichConfig {
    /// Fill the API key from the environment if the config left it unset.
    pub fn resolve_env(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var(ENRICH_API_KEY_ENV)
                .ok()
                .filter(|v| !v.is_empty());
        }
    }
}
