use axum::{extract::State, routing::post, Json, Router};
use cineflix_core::AccessToken;
use serde::Deserialize;
use crate::error::AppResult;
use crate::extract::AppForm;
use crate::state::AppState;

/// OAuth2 password-grant form; `username` carries the email
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/token", post(login))
}

async fn login(State(state): State<AppState>, AppForm(form): AppForm<LoginForm>) -> AppResult<Json<AccessToken>> {
    let token = state.auth.login(&form.username, &form.password).await?;
    Ok(Json(token))
}
