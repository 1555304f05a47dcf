use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use cineflix_models::UserProfile;
use serde::Deserialize;
use serde_json::{json, Value};
use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/createuser", post(create_user))
        .route("/getallusers", get(list_users))
        .route("/deleteuser", delete(delete_user))
}

async fn create_user(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    state
        .users
        .create_user(&request.name, &request.email, &request.password)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "Success": "Signup successfull" }))))
}

async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserProfile>>> {
    Ok(Json(state.users.list_users().await?))
}

async fn delete_user(State(state): State<AppState>, AuthUser(user): AuthUser) -> AppResult<Json<Value>> {
    state.users.delete_user(&user.id).await?;
    Ok(Json(json!({ "Success": "User deleted successfully" })))
}
