use cineflix_config::UpstreamConfig;
use cineflix_models::{MovieCategory, MovieRecord};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::error::SourceError;
use crate::tmdb::parser;
use crate::traits::PageFetcher;

/// Fetches the first N pages of a category listing with bounded concurrency.
///
/// Pages are merged in page order regardless of completion order. A failing
/// page is logged and skipped; the call fails only when nothing was collected.
#[derive(Clone)]
pub struct CategoryFetcher {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    pages: u32,
    concurrency: usize,
}

impl CategoryFetcher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>, pages: u32, concurrency: usize) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            pages,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(fetcher: Arc<dyn PageFetcher>, config: &UpstreamConfig) -> Self {
        Self::new(
            fetcher,
            config.tmdb_base_url.clone(),
            config.category_pages,
            config.max_concurrent_fetches,
        )
    }

    pub async fn fetch_category(&self, category: MovieCategory) -> Result<Vec<MovieRecord>, SourceError> {
        let url = format!("{}{}", self.base_url, category.path());
        let movies = self.fetch_pages(&url).await?;
        info!(category = %category, count = movies.len(), "Category listing fetched");
        Ok(movies)
    }

    pub async fn fetch_pages(&self, category_url: &str) -> Result<Vec<MovieRecord>, SourceError> {
        let results: Vec<Option<Vec<MovieRecord>>> = stream::iter(1..=self.pages)
            .map(|page| self.fetch_page(category_url, page))
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|page| page.is_none()).count();
        let movies: Vec<MovieRecord> = results.into_iter().flatten().flatten().collect();

        if movies.is_empty() {
            return Err(SourceError::NoResults(format!(
                "No movies found at {} ({} of {} pages failed)",
                category_url, failed, self.pages
            )));
        }

        if failed > 0 {
            warn!(url = %category_url, failed, pages = self.pages, "Category listing is partial");
        }
        Ok(movies)
    }

    async fn fetch_page(&self, category_url: &str, page: u32) -> Option<Vec<MovieRecord>> {
        let url = format!("{}?page={}&language=en-GB", category_url, page);
        match self.fetcher.fetch(&url).await {
            Ok(html) => {
                let movies = parser::parse_listing_page(&html, &self.base_url);
                debug!(page, count = movies.len(), "Parsed listing page");
                Some(movies)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to fetch listing page");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticFetcher;
    use crate::tmdb::parser::tests::listing_page;

    const BASE: &str = "https://www.themoviedb.org";

    fn page_url(path: &str, page: u32) -> String {
        format!("{}{}?page={}&language=en-GB", BASE, path, page)
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_page_order() {
        let mut fetcher = StaticFetcher::new();
        for page in 1..=10 {
            if [3, 6, 9].contains(&page) {
                fetcher = fetcher.with_timeout(page_url("/movie", page));
            } else {
                let title = format!("Movie {}", page);
                fetcher = fetcher.with_page(page_url("/movie", page), listing_page(&[&title]));
            }
        }
        let fetcher = Arc::new(fetcher);
        let categories = CategoryFetcher::new(fetcher.clone(), BASE, 10, 4);

        let movies = categories.fetch_category(MovieCategory::Popular).await.unwrap();
        let titles: Vec<_> = movies.iter().filter_map(|m| m.title.clone()).collect();

        assert_eq!(
            titles,
            vec!["Movie 1", "Movie 2", "Movie 4", "Movie 5", "Movie 7", "Movie 8", "Movie 10"]
        );
        assert_eq!(fetcher.request_count(), 10);
    }

    #[tokio::test]
    async fn test_document_order_within_page() {
        let fetcher = StaticFetcher::new()
            .with_page(page_url("/movie/upcoming", 1), listing_page(&["A", "B"]))
            .with_page(page_url("/movie/upcoming", 2), listing_page(&["C"]));
        let categories = CategoryFetcher::new(Arc::new(fetcher), BASE, 2, 2);

        let movies = categories.fetch_category(MovieCategory::Upcoming).await.unwrap();
        let titles: Vec<_> = movies.iter().filter_map(|m| m.title.as_deref()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_all_pages_failing_is_no_results() {
        let categories = CategoryFetcher::new(Arc::new(StaticFetcher::new()), BASE, 3, 2);

        let err = categories.fetch_category(MovieCategory::TopRated).await.unwrap_err();
        assert!(matches!(err, SourceError::NoResults(_)));
    }

    #[tokio::test]
    async fn test_all_pages_empty_is_no_results() {
        let fetcher = StaticFetcher::new()
            .with_page(page_url("/movie", 1), listing_page(&[]))
            .with_page(page_url("/movie", 2), "<html></html>");
        let categories = CategoryFetcher::new(Arc::new(fetcher), BASE, 2, 4);

        let err = categories.fetch_category(MovieCategory::Popular).await.unwrap_err();
        assert!(matches!(err, SourceError::NoResults(_)));
    }
}
