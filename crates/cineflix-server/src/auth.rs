use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use cineflix_models::UserProfile;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller, resolved from an `Authorization: Bearer` header
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserProfile);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| AppError::unauthorized("Not authenticated"))?;
        let profile = state.auth.authenticate(token).await?;
        Ok(AuthUser(profile))
    }
}
