use chrono::Utc;
use cineflix_models::{MovieKey, ReviewAggregate, ReviewEntry, UserId, MAX_RATING, MIN_RATING};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use crate::error::{CoreError, Result};
use crate::store::ReviewStore;

/// Maintains per-movie review aggregates and their overall rating.
///
/// Read-modify-write on one movie is serialized by a per-key async lock, so
/// concurrent reviews of the same movie never lose an update. Different
/// movies proceed in parallel.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn ReviewStore>,
    locks: Arc<Mutex<HashMap<MovieKey, Arc<tokio::sync::Mutex<()>>>>>,
}

fn validate_key(key: &MovieKey) -> Result<()> {
    if key.movie_name.trim().is_empty() {
        return Err(CoreError::InvalidInput("Movie name must not be empty".to_string()));
    }
    if key.release_date.trim().is_empty() {
        return Err(CoreError::InvalidInput("Release date must not be empty".to_string()));
    }
    Ok(())
}

fn validate_rating(rating: f64) -> Result<()> {
    if !rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::InvalidInput(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    Ok(())
}

fn no_aggregate(key: &MovieKey) -> CoreError {
    CoreError::NotFound(format!("No reviews found for {}", key))
}

fn no_entry(key: &MovieKey) -> CoreError {
    CoreError::NotFound(format!("You have not reviewed {}", key))
}

impl ReviewService {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock_for(&self, key: &MovieKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Drop locks nobody is waiting on so the map tracks only live keys
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(key.clone()).or_default().clone()
    }

    pub async fn add_review(&self, key: MovieKey, content: String, rating: f64, user: UserId) -> Result<ReviewAggregate> {
        validate_key(&key)?;
        validate_rating(rating)?;

        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let aggregate = match self.store.get(&key).await? {
            Some(mut aggregate) => {
                if aggregate.entry_for(&user).is_some() {
                    return Err(CoreError::DuplicateReview(
                        "You have already submitted a review for this movie.".to_string(),
                    ));
                }
                aggregate.reviews.push(ReviewEntry::new(content, rating, user));
                aggregate.recompute();
                aggregate
            }
            None => ReviewAggregate::new(key.clone(), ReviewEntry::new(content, rating, user)),
        };

        self.store.put(aggregate.clone()).await?;
        info!(movie = %key, user_id = %user, overall_rating = aggregate.overall_rating, "Review added");
        Ok(aggregate)
    }

    pub async fn edit_review(&self, key: MovieKey, content: String, rating: f64, user: UserId) -> Result<ReviewAggregate> {
        validate_key(&key)?;
        validate_rating(rating)?;

        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let mut aggregate = self.store.get(&key).await?.ok_or_else(|| no_aggregate(&key))?;
        let entry = aggregate.entry_for_mut(&user).ok_or_else(|| no_entry(&key))?;
        entry.review_content = content;
        entry.rating = rating;
        entry.updated_at = Some(Utc::now());
        aggregate.recompute();

        self.store.put(aggregate.clone()).await?;
        info!(movie = %key, user_id = %user, overall_rating = aggregate.overall_rating, "Review updated");
        Ok(aggregate)
    }

    /// Remove the caller's review. Returns `None` when that was the last one
    /// and the aggregate itself was deleted.
    pub async fn delete_review(&self, key: MovieKey, user: UserId) -> Result<Option<ReviewAggregate>> {
        validate_key(&key)?;

        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let mut aggregate = self.store.get(&key).await?.ok_or_else(|| no_aggregate(&key))?;
        let before = aggregate.reviews.len();
        aggregate.reviews.retain(|entry| entry.created_by != user);
        if aggregate.reviews.len() == before {
            return Err(no_entry(&key));
        }

        if aggregate.is_empty() {
            self.store.remove(&key).await?;
            info!(movie = %key, user_id = %user, "Last review deleted, aggregate removed");
            return Ok(None);
        }

        aggregate.recompute();
        self.store.put(aggregate.clone()).await?;
        info!(movie = %key, user_id = %user, overall_rating = aggregate.overall_rating, "Review deleted");
        Ok(Some(aggregate))
    }

    pub async fn get_reviews(&self, key: &MovieKey) -> Result<ReviewAggregate> {
        validate_key(key)?;

        let mut aggregate = self.store.get(key).await?.ok_or_else(|| no_aggregate(key))?;
        if aggregate.is_empty() {
            aggregate.overall_rating = 0.0;
        }
        debug!(movie = %key, count = aggregate.reviews.len(), "Reviews fetched");
        Ok(aggregate)
    }

    /// Every review the user has written, ordered by movie
    pub async fn reviews_by_user(&self, user: &UserId) -> Result<Vec<(MovieKey, ReviewEntry)>> {
        let reviews = self
            .store
            .all()
            .await?
            .into_iter()
            .filter_map(|aggregate| {
                let entry = aggregate.entry_for(user).cloned()?;
                Some((aggregate.key, entry))
            })
            .collect();
        Ok(reviews)
    }
}
