use async_trait::async_trait;
use crate::error::SourceError;

/// Retrieves the body of an upstream page.
///
/// Implementations must bound every request with a timeout and must not retry.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, SourceError>;
}
