use thiserror::Error;

/// Failure talking to, or making sense of, an upstream site
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    NoResults(String),

    #[error("{0}")]
    NotConfigured(String),
}

impl SourceError {
    /// Classify a transport error: deadline expiry is reported apart from every other failure
    pub fn from_request(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            SourceError::Timeout(url.to_string())
        } else {
            SourceError::Upstream(format!("Error fetching {}: {}", url, err))
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::Timeout(_))
    }
}
