use async_trait::async_trait;
use encart_core::{RecordSearchClient, SearchOptions, SearchResponse};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::app_config::WebhookConfig;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Search webhook URL is not configured")]
    NotConfigured,
    #[error("Unexpected response: HTTP {status}: {body}")]
    InvalidResponse { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct SearchRequestBody<'a> {
    query: &'a str,
    limit: usize,
}

/// Record search over the CRM's HTTP webhook. No retries: a failed call is
/// returned to the caller as-is.
#[derive(Clone)]
pub struct WebhookSearchClient {
    client: reqwest::Client,
    search_url: String,
}

impl WebhookSearchClient {
    pub fn new(config: &WebhookConfig) -> Result<Self, WebhookError> {
        if config.search_url.trim().is_empty() {
            return Err(WebhookError::NotConfigured);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            search_url: config.search_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_search(&self, query: &str, limit: usize) -> Result<SearchResponse, WebhookError> {
        let response = self
            .client
            .post(&self.search_url)
            .json(&SearchRequestBody { query, limit })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json::<SearchResponse>().await?)
        } else {
            let body = response.text().await?;
            Err(WebhookError::InvalidResponse { status: status.as_u16(), body })
        }
    }
}

#[async_trait]
impl RecordSearchClient for WebhookSearchClient {
    async fn search_records(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<SearchResponse, Box<dyn std::error::Error + Send + Sync>> {
        match self.post_search(query, options.limit).await {
            Ok(response) => {
                info!("Search webhook returned {} records for '{}'", response.data.len(), query);
                Ok(response)
            }
            Err(e) => {
                warn!("Search webhook failed for '{}': {}", query, e);
                Err(Box::new(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_url() {
        let config = WebhookConfig::default();
        assert!(matches!(WebhookSearchClient::new(&config), Err(WebhookError::NotConfigured)));
    }

    #[test]
    fn test_trims_trailing_slash() {
        let config = WebhookConfig {
            search_url: "http://localhost:5678/webhook/search/".to_string(),
            timeout_ms: 1000,
        };
        let client = WebhookSearchClient::new(&config).unwrap();
        assert_eq!(client.search_url, "http://localhost:5678/webhook/search");
    }
}
