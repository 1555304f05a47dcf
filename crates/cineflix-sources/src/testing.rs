//! In-memory page fetcher serving canned HTML.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::error::SourceError;
use crate::traits::PageFetcher;

enum CannedPage {
    Body(String),
    Timeout,
    Status(u16),
}

#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, CannedPage>,
    requests: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), CannedPage::Body(body.into()));
        self
    }

    pub fn with_timeout(mut self, url: impl Into<String>) -> Self {
        self.pages.insert(url.into(), CannedPage::Timeout);
        self
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.pages.insert(url.into(), CannedPage::Status(status));
        self
    }

    /// Number of fetches served so far, including failures
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(url) {
            Some(CannedPage::Body(body)) => Ok(body.clone()),
            Some(CannedPage::Timeout) => Err(SourceError::Timeout(url.to_string())),
            Some(CannedPage::Status(status)) => {
                Err(SourceError::Upstream(format!("Error fetching {}: HTTP {}", url, status)))
            }
            None => Err(SourceError::Upstream(format!("Error fetching {}: HTTP 404 Not Found", url))),
        }
    }
}
