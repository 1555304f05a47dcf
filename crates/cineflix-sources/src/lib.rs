pub mod error;
pub mod http;
pub mod traits;
pub mod category;
pub mod tmdb;
pub mod youtube;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::SourceError;
pub use http::{HttpFetcher, build_http_client};
pub use category::CategoryFetcher;
pub use tmdb::TmdbScraper;
pub use traits::PageFetcher;
pub use youtube::YoutubeClient;
