use cineflix_models::{Extracted, MovieDetail, MovieRecord, WatchLink};
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::error::SourceError;
use crate::tmdb::parser::{self, DetailPage};
use crate::traits::PageFetcher;

const LANGUAGE_SUFFIX: &str = "?language=en-GB";

/// Scrapes search results and movie detail pages from the movie database site
#[derive(Clone)]
pub struct TmdbScraper {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl TmdbScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn search(&self, term: &str) -> Result<Vec<MovieRecord>, SourceError> {
        let url = format!(
            "{}/search/movie?query={}&language=en-GB",
            self.base_url,
            urlencoding::encode(term)
        );
        let html = self.fetcher.fetch(&url).await?;
        let movies = parser::parse_search_results(&html, &self.base_url);

        info!(term = %term, count = movies.len(), "Search completed");
        Ok(movies)
    }

    /// Scrape a detail page plus its watch-provider and backdrop pages.
    ///
    /// Only the primary fetch can fail the call. Secondary pages degrade into
    /// `Extracted::Failed` so the caller still gets everything else.
    pub async fn details(&self, movie_url: &str) -> Result<MovieDetail, SourceError> {
        let prefix = format!("{}/movie/", self.base_url);
        if !movie_url.starts_with(&prefix) {
            return Err(SourceError::InvalidInput("Invalid movie URL".to_string()));
        }

        let html = self.fetcher.fetch(movie_url).await?;
        let page = match parser::parse_detail_page(&html, &self.base_url) {
            Some(page) => page,
            None => {
                warn!(url = %movie_url, "No director credit found, returning empty detail");
                return Ok(MovieDetail::unknown());
            }
        };

        let watch_links = self.watch_links(page.watch_page_url.as_deref()).await;
        let backdrops = self.backdrops(movie_url).await;

        Ok(into_detail(page, watch_links, backdrops))
    }

    async fn watch_links(&self, watch_page_url: Option<&str>) -> Extracted<WatchLink> {
        let Some(url) = watch_page_url else {
            debug!("Detail page has no watch link");
            return Extracted::Missing;
        };

        match self.fetcher.fetch(url).await {
            Ok(html) => Extracted::from_items(parser::parse_watch_links(&html)),
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to fetch watch providers");
                Extracted::failed(e.to_string())
            }
        }
    }

    async fn backdrops(&self, movie_url: &str) -> Extracted<String> {
        let url = backdrops_url(movie_url);
        match self.fetcher.fetch(&url).await {
            Ok(html) => Extracted::from_items(parser::parse_backdrops(&html)),
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to fetch backdrops");
                Extracted::failed(e.to_string())
            }
        }
    }
}

fn backdrops_url(movie_url: &str) -> String {
    let stem = movie_url.replace(LANGUAGE_SUFFIX, "");
    format!("{}/images/backdrops{}", stem.trim_end_matches('/'), LANGUAGE_SUFFIX)
}

fn into_detail(page: DetailPage, watch_links: Extracted<WatchLink>, backdrops: Extracted<String>) -> MovieDetail {
    MovieDetail {
        director: Some(page.director),
        cast: page.cast,
        genres: page.genres,
        runtime: page.runtime,
        certificate: page.certificate,
        language: page.language,
        watch_links,
        backdrops,
        overview: page.overview,
    }
}
