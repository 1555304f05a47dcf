use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use cineflix_models::{MovieKey, ReviewAggregate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddReviewRequest {
    pub movie_name: String,
    pub release_date: String,
    pub review_content: String,
    pub rating: f64,
}

#[derive(Debug, Deserialize)]
pub struct EditReviewRequest {
    pub review_content: String,
    pub rating: f64,
}

/// One of the caller's reviews, flattened with the movie it belongs to
#[derive(Debug, Serialize)]
pub struct MyReview {
    pub movie_name: String,
    pub release_date: String,
    pub review_content: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/addReview", post(add_review))
        .route("/editReview/{movie_name}/{release_date}", put(edit_review))
        .route("/deleteReview/{movie_name}/{release_date}", delete(delete_review))
        .route("/getReviews/{movie_name}/{release_date}", get(get_reviews))
        .route("/mine", get(my_reviews))
}

async fn add_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(request): AppJson<AddReviewRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let key = MovieKey::new(request.movie_name, request.release_date);
    let aggregate = state
        .reviews
        .add_review(key, request.review_content, request.rating, user.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "Success": "Review added successfully",
            "overall_rating": aggregate.overall_rating,
        })),
    ))
}

async fn edit_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((movie_name, release_date)): Path<(String, String)>,
    AppJson(request): AppJson<EditReviewRequest>,
) -> AppResult<Json<Value>> {
    let key = MovieKey::new(movie_name, release_date);
    let content = request.review_content.clone();
    let aggregate = state
        .reviews
        .edit_review(key, request.review_content, request.rating, user.id)
        .await?;

    Ok(Json(json!({
        "movie_name": aggregate.key.movie_name,
        "updated_review_content": content,
        "overall_rating": aggregate.overall_rating,
    })))
}

async fn delete_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((movie_name, release_date)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let key = MovieKey::new(movie_name, release_date);
    let body = match state.reviews.delete_review(key, user.id).await? {
        Some(aggregate) => json!({
            "message": "Review deleted successfully",
            "overall_rating": aggregate.overall_rating,
        }),
        None => json!({
            "message": "Review and movie deleted successfully",
            "overall_rating": 0.0,
        }),
    };
    Ok(Json(body))
}

async fn get_reviews(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((movie_name, release_date)): Path<(String, String)>,
) -> AppResult<Json<ReviewAggregate>> {
    let key = MovieKey::new(movie_name, release_date);
    Ok(Json(state.reviews.get_reviews(&key).await?))
}

async fn my_reviews(State(state): State<AppState>, AuthUser(user): AuthUser) -> AppResult<Json<Vec<MyReview>>> {
    let reviews = state
        .reviews
        .reviews_by_user(&user.id)
        .await?
        .into_iter()
        .map(|(key, entry)| MyReview {
            movie_name: key.movie_name,
            release_date: key.release_date,
            review_content: entry.review_content,
            rating: entry.rating,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        })
        .collect();
    Ok(Json(reviews))
}
