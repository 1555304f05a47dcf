use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::user::UserId;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// Round a rating to two decimal places
pub fn round_rating(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Identity of a review aggregate: a movie is told apart from remakes by its release date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MovieKey {
    pub movie_name: String,
    pub release_date: String,
}

impl MovieKey {
    pub fn new(movie_name: impl Into<String>, release_date: impl Into<String>) -> Self {
        Self {
            movie_name: movie_name.into(),
            release_date: release_date.into(),
        }
    }
}

impl fmt::Display for MovieKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.movie_name, self.release_date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewEntry {
    pub review_content: String,
    pub rating: f64,
    pub created_by: UserId, // Weak reference, never owns the user
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ReviewEntry {
    pub fn new(review_content: String, rating: f64, created_by: UserId) -> Self {
        Self {
            review_content,
            rating,
            created_by,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewAggregate {
    #[serde(flatten)]
    pub key: MovieKey,
    pub overall_rating: f64,
    pub reviews: Vec<ReviewEntry>,
}

impl ReviewAggregate {
    /// Start an aggregate from its first review
    pub fn new(key: MovieKey, first: ReviewEntry) -> Self {
        let mut aggregate = Self {
            key,
            overall_rating: 0.0,
            reviews: vec![first],
        };
        aggregate.recompute();
        aggregate
    }

    /// Mean of all entry ratings rounded to two decimals, 0 when empty
    pub fn mean_rating(&self) -> f64 {
        if self.reviews.is_empty() {
            return 0.0;
        }
        let total: f64 = self.reviews.iter().map(|r| r.rating).sum();
        round_rating(total / self.reviews.len() as f64)
    }

    pub fn recompute(&mut self) {
        self.overall_rating = self.mean_rating();
    }

    pub fn entry_for(&self, user: &UserId) -> Option<&ReviewEntry> {
        self.reviews.iter().find(|r| &r.created_by == user)
    }

    pub fn entry_for_mut(&mut self, user: &UserId) -> Option<&mut ReviewEntry> {
        self.reviews.iter_mut().find(|r| &r.created_by == user)
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rating: f64) -> ReviewEntry {
        ReviewEntry::new("text".to_string(), rating, UserId::new())
    }

    #[test]
    fn test_round_rating() {
        assert_eq!(round_rating(4.256), 4.26);
        assert_eq!(round_rating(10.0 / 3.0), 3.33);
        assert_eq!(round_rating(4.0), 4.0);
    }

    #[test]
    fn test_aggregate_mean() {
        let key = MovieKey::new("Dune", "2021-10-22");
        let mut aggregate = ReviewAggregate::new(key, entry(4.5));
        assert_eq!(aggregate.overall_rating, 4.5);

        aggregate.reviews.push(entry(3.5));
        aggregate.reviews.push(entry(1.0));
        aggregate.recompute();
        assert_eq!(aggregate.overall_rating, 3.0);

        aggregate.reviews.clear();
        assert_eq!(aggregate.mean_rating(), 0.0);
    }

    #[test]
    fn test_aggregate_serializes_flat_key() {
        let aggregate = ReviewAggregate::new(MovieKey::new("Dune", "2021-10-22"), entry(4.0));
        let json = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(json["movie_name"], "Dune");
        assert_eq!(json["release_date"], "2021-10-22");
        assert_eq!(json["overall_rating"], 4.0);
    }
}
