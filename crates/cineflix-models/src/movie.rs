use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One result card from a search or category listing page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub title: Option<String>,
    pub poster: Option<String>,
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>, // Listing cards carry no synopsis
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CastMember {
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchLink {
    pub icon: String,
    pub url: String,
}

/// Outcome of extracting a section that lives on a secondary page.
///
/// The upstream markup is uncontracted, so a missing section or a failed
/// secondary fetch is data, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Extracted<T> {
    Available { items: Vec<T> },
    Missing,
    Failed { reason: String },
}

impl<T> Extracted<T> {
    /// Wrap a list, treating an empty list as a missing section
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Extracted::Missing
        } else {
            Extracted::Available { items }
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Extracted::Failed { reason: reason.into() }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Extracted::Available { items } => items,
            _ => &[],
        }
    }
}

/// Everything scraped from a movie detail page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub director: Option<String>,
    pub cast: Vec<CastMember>,
    pub genres: Vec<String>,
    pub runtime: Option<String>,
    pub certificate: Option<String>,
    pub language: Option<String>,
    pub watch_links: Extracted<WatchLink>,
    pub backdrops: Extracted<String>,
    pub overview: Option<String>,
}

impl MovieDetail {
    /// Detail for a page whose credits block could not be found
    pub fn unknown() -> Self {
        Self {
            director: None,
            cast: Vec::new(),
            genres: Vec::new(),
            runtime: None,
            certificate: None,
            language: None,
            watch_links: Extracted::Missing,
            backdrops: Extracted::Missing,
            overview: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum MovieCategory {
    Popular,
    TopRated,
    Upcoming,
}

impl MovieCategory {
    /// Path of the listing page relative to the site root
    pub fn path(&self) -> &'static str {
        match self {
            MovieCategory::Popular => "/movie",
            MovieCategory::TopRated => "/movie/top-rated",
            MovieCategory::Upcoming => "/movie/upcoming",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovieCategory::Popular => "popular",
            MovieCategory::TopRated => "top-rated",
            MovieCategory::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for MovieCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovieCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(MovieCategory::Popular),
            "top-rated" | "top_rated" => Ok(MovieCategory::TopRated),
            "upcoming" => Ok(MovieCategory::Upcoming),
            other => Err(format!("Unknown movie category: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trailer {
    pub movie_name: String,
    pub trailer_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracted_serializes_with_status_tag() {
        let links = Extracted::from_items(vec![WatchLink {
            icon: "https://img/icon.png".to_string(),
            url: "https://www.netflix.com/title/1".to_string(),
        }]);
        let json = serde_json::to_value(&links).unwrap();
        assert_eq!(json["status"], "available");
        assert_eq!(json["items"][0]["url"], "https://www.netflix.com/title/1");

        let missing: Extracted<String> = Extracted::from_items(Vec::new());
        assert_eq!(serde_json::to_value(&missing).unwrap()["status"], "missing");

        let failed: Extracted<String> = Extracted::failed("timed out");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "timed out");
    }

    #[test]
    fn test_unknown_detail_has_null_director() {
        let detail = MovieDetail::unknown();
        let json = serde_json::to_value(&detail).unwrap();
        assert!(json["director"].is_null());
        assert_eq!(json["cast"].as_array().unwrap().len(), 0);
        assert!(detail.backdrops.items().is_empty());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("top-rated".parse::<MovieCategory>().unwrap(), MovieCategory::TopRated);
        assert_eq!(MovieCategory::Upcoming.path(), "/movie/upcoming");
        assert!("trending".parse::<MovieCategory>().is_err());
    }
}
