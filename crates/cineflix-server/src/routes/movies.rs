use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use cineflix_models::{MovieCategory, MovieDetail, MovieRecord, Trailer};
use serde::Deserialize;
use tracing::info;
use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::extract::AppQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    pub movie_url: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/search/{name}", get(search))
        .route("/details", get(details))
        .route("/popular", get(popular))
        .route("/top-rated", get(top_rated))
        .route("/upcoming", get(upcoming))
        .route("/trailer/{name}", get(trailer))
}

async fn search(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<Vec<MovieRecord>>> {
    let movies = state.scraper.search(&name).await?;
    if movies.is_empty() {
        return Err(AppError::not_found(format!("No movies found for '{}'", name)));
    }
    Ok(Json(movies))
}

async fn details(
    State(state): State<AppState>,
    _user: AuthUser,
    AppQuery(query): AppQuery<DetailsQuery>,
) -> AppResult<Json<MovieDetail>> {
    Ok(Json(state.scraper.details(&query.movie_url).await?))
}

async fn category(state: &AppState, category: MovieCategory) -> AppResult<Json<Vec<MovieRecord>>> {
    Ok(Json(state.categories.fetch_category(category).await?))
}

async fn popular(State(state): State<AppState>, _user: AuthUser) -> AppResult<Json<Vec<MovieRecord>>> {
    category(&state, MovieCategory::Popular).await
}

async fn top_rated(State(state): State<AppState>, _user: AuthUser) -> AppResult<Json<Vec<MovieRecord>>> {
    category(&state, MovieCategory::TopRated).await
}

async fn upcoming(State(state): State<AppState>, _user: AuthUser) -> AppResult<Json<Vec<MovieRecord>>> {
    category(&state, MovieCategory::Upcoming).await
}

async fn trailer(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<Trailer>> {
    match state.youtube.find_trailer(&name).await? {
        Some(trailer_url) => {
            info!(movie = %name, "Trailer found");
            Ok(Json(Trailer {
                movie_name: name,
                trailer_url,
            }))
        }
        None => Err(AppError::not_found("Trailer not found.")),
    }
}
