//! HTTP client for the embedding/semantic-search service.
//!
//! The service is treated as opaque: it accepts a query and returns ranked
//! results, or accepts a backfill trigger and returns a summary. Every call
//! carries the configured request timeout, since the service has none of
//! its own.

use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use crate::config::AiServiceConfig;

use super::types::{BackfillSummary, SearchParams, SearchResults};

/// Errors that can occur when calling the AI service.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// The HTTP request failed (connect, timeout, decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status.
    #[error("AI service error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Body text of the error response.
        message: String,
    },

    /// The client could not be constructed from configuration.
    #[error("invalid AI service configuration: {0}")]
    Config(String),
}

/// Client for the external AI service.
#[derive(Debug, Clone)]
pub struct AiClient {
    client: reqwest::Client,
    base_url: String,
}

impl AiClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AiError::Config` if the HTTP client fails to build.
    pub fn new(config: &AiServiceConfig) -> Result<Self, AiError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Run a semantic search and return the service's ranked results.
    ///
    /// # Errors
    ///
    /// Returns `AiError` if the request fails or the service reports an
    /// error status.
    pub async fn semantic_search(&self, params: &SearchParams) -> Result<SearchResults, AiError> {
        let url = format!("{}/search/semantic", self.base_url);
        self.post_json(&url, Some(params)).await
    }

    /// Ask the service to generate embeddings for every book lacking one.
    ///
    /// # Errors
    ///
    /// Returns `AiError` if the request fails or the service reports an
    /// error status.
    pub async fn generate_missing_embeddings(&self) -> Result<BackfillSummary, AiError> {
        let url = format!("{}/embeddings/backfill", self.base_url);
        self.post_json::<(), _>(&url, None).await
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, AiError> {
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = AiClient::new(&AiServiceConfig {
            base_url: "http://localhost:8000/".to_owned(),
            timeout: Duration::from_secs(5),
        })
        .expect("client");

        assert_eq!(client.base_url, "http://localhost:8000");
    }
}
