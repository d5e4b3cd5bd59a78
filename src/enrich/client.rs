//! Chat-completions client for the enrichment collaborators
//!
//! Speaks the OpenAI-compatible chat API; any conforming endpoint works.
//! The pipeline consumes these services through a request/response contract
//! only: responses are parsed structurally and never validated beyond that.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EnrichConfig;

/// Errors from the enrichment services
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("service returned no choices")]
    EmptyResponse,
    #[error("invalid API key format: {0}")]
    InvalidKey(reqwest::header::InvalidHeaderValue),
}

/// Chat request format
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat response format
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// API error envelope
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct ChatClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl ChatClient {
    /// Create a new client from resolved configuration.
    pub fn new(config: &EnrichConfig) -> Result<Self, EnrichError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(key) = &config.api_key {
            let auth_value = format!("Bearer {}", key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value).map_err(EnrichError::InvalidKey)?,
            );
        } else if config.endpoint.contains("openai.com") {
            warn!("No API key provided for {}", config.endpoint);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }

    /// Run one system+user exchange and return the assistant's text.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, EnrichError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        debug!("Sending chat request to {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = match serde_json::from_str::<ErrorResponse>(&error_text) {
                Ok(envelope) => envelope.error.message,
                Err(_) => error_text,
            };
            return Err(EnrichError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(EnrichError::EmptyResponse)
    }
}
