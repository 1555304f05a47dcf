use async_trait::async_trait;
use cineflix_config::UpstreamConfig;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use crate::error::SourceError;
use crate::traits::PageFetcher;

/// Create a reqwest Client with browser-like headers and a fixed per-request deadline
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, SourceError> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| SourceError::Upstream(format!("Failed to build HTTP client: {}", e)))
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, SourceError> {
        let client = build_http_client(&config.user_agent, Duration::from_secs(config.timeout_secs))?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        debug!(url = %url, "Fetching upstream page");

        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-GB,en;q=0.9")
            .send()
            .await
            .map_err(|e| SourceError::from_request(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Upstream(format!("Error fetching {}: HTTP {}", url, status)));
        }

        response.text().await.map_err(|e| SourceError::from_request(e, url))
    }
}
