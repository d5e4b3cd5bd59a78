//! Rendering-proxy credentials
//!
//! Credentials live in an explicit struct passed into client constructors at
//! process start; nothing reads the environment after resolution.

use serde::{Deserialize, Serialize};

/// Environment variable consulted when the config file carries no API key
pub const API_KEY_ENV: &str = "SCRAPINGBEE_API_KEY";

/// Environment variable consulted when the config file carries no cookies
pub const COOKIES_ENV: &str = "AMAZON_COOKIES";

/// Credentials for the rendering proxy and the target site
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Rendering proxy API key (falls back to `SCRAPINGBEE_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Cookie header forwarded to the target site (falls back to
    /// `AMAZON_COOKIES`; empty is allowed but may get blocked)
    #[serde(default)]
    pub cookies: Option<String>,
}

impl CredentialsConfig {
    /// Fill unset fields from the environment.
    pub fn resolve_env(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var(API_KEY_ENV).ok().filter(|v| !v.is_empty());
        }
        if self.cookies.is_none() {
            self.cookies = std::env::var(COOKIES_ENV).ok().filter(|v| !v.is_empty());
        }
    }

    /// The resolved API key, if any source provided one.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// The resolved cookie header; missing cookies degrade to an empty value.
    pub fn cookies(&self) -> &str {
        self.cookies.as_deref().unwrap_or("")
    }
}
