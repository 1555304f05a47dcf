use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::state::AppState;

pub mod logins;
pub mod movies;
pub mod reviews;
pub mod users;

#[cfg(test)]
mod tests;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/users", users::routes())
        .nest("/logins", logins::routes())
        .nest("/movies", movies::routes())
        .nest("/review", reviews::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
