use cineflix_config::YoutubeConfig;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use crate::error::SourceError;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

/// Looks up trailers through the YouTube Data API search endpoint
#[derive(Clone)]
pub struct YoutubeClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl YoutubeClient {
    pub fn new(client: Client, api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.filter(|key| !key.is_empty()),
        }
    }

    pub fn from_config(client: Client, config: &YoutubeConfig) -> Self {
        Self::new(client, config.api_url.clone(), config.api_key.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// URL of the first video matching "{name} official trailer", if any
    pub async fn find_trailer(&self, movie_name: &str) -> Result<Option<String>, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SourceError::NotConfigured("YouTube API key not configured".to_string()))?;

        let query = format!("{} official trailer", movie_name);
        debug!(query = %query, "Searching YouTube");

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", query.as_str()),
                ("part", "snippet"),
                ("maxResults", "1"),
                ("type", "video"),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|e| SourceError::from_request(e, &self.api_url))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "YouTube API request failed");
            return Err(SourceError::Upstream("YouTube API request failed".to_string()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Upstream(format!("Invalid YouTube API response: {}", e)))?;

        Ok(trailer_url(body))
    }
}

fn trailer_url(response: SearchResponse) -> Option<String> {
    response
        .items
        .into_iter()
        .next()
        .and_then(|item| item.id.video_id)
        .map(|id| format!("https://www.youtube.com/watch?v={}", id))
}
