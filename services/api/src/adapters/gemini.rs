//! services/api/src/adapters/gemini.rs
//!
//! This module contains the adapter for the remote generative-text API.
//! It implements the `TextGenerationService` port from the `core` crate:
//! one HTTP call per generation event, with a small bounded retry loop for
//! transient failures only.

use std::time::Duration;

use async_trait::async_trait;
use docsmith_core::ports::{PortError, PortResult, TextGenerationService};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::warn;

use crate::adapters::response::{self, NoUsableText};
use crate::config::AuthStyle;

/// Retries on top of the first attempt, for network errors, 5xx and 429 only.
const MAX_RETRIES: u32 = 2;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation API key is not configured")]
    MissingKey,
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation HTTP error {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error(transparent)]
    NoUsableText(#[from] NoUsableText),
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerationService` against the Google
/// generative-language REST endpoint.
#[derive(Clone)]
pub struct GeminiAdapter {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    auth_style: AuthStyle,
}

impl GeminiAdapter {
    /// Creates a new `GeminiAdapter`. A missing API key is allowed here;
    /// calls will then fail fast and the caller's fallback takes over.
    pub fn new(
        endpoint: String,
        model: String,
        api_key: Option<String>,
        auth_style: AuthStyle,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            model,
            api_key,
            auth_style,
        })
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn call(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self.api_key.as_deref().ok_or(GenerationError::MissingKey)?;
        let url = format!(
            "{}/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let mut attempt: u32 = 0;
        loop {
            let mut request = self.client.post(&url).json(&body);
            request = match self.auth_style {
                AuthStyle::QueryKey => request.query(&[("key", key)]),
                AuthStyle::Bearer => request.bearer_auth(key),
            };

            let failure = match request.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let value: Value = resp.json().await?;
                        return Ok(response::extract_text(&value)?);
                    }
                    let body = resp.text().await.unwrap_or_default();
                    let retryable =
                        status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
                    if !retryable {
                        // 4xx other than 429 is a hard failure, body attached.
                        return Err(GenerationError::Http { status, body });
                    }
                    GenerationError::Http { status, body }
                }
                Err(err) => GenerationError::Transport(err),
            };

            if attempt >= MAX_RETRIES {
                return Err(failure);
            }
            attempt += 1;
            warn!(attempt, error = %failure, "generation request failed, retrying");
            tokio::time::sleep(RETRY_BASE_DELAY * attempt).await;
        }
    }
}

//=========================================================================================
// `TextGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerationService for GeminiAdapter {
    async fn generate(&self, prompt: &str) -> PortResult<String> {
        self.call(prompt)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}
