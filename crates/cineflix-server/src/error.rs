use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cineflix_core::CoreError;
use cineflix_sources::SourceError;
use serde_json::json;
use std::fmt;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

/// Error returned by every handler, rendered as `{"detail": message}`
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), "{}", self.message);
        }

        let body = Json(json!({ "detail": self.message }));
        if self.status == StatusCode::UNAUTHORIZED {
            (self.status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (self.status, body).into_response()
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(msg) | CoreError::DuplicateReview(msg) => Self::bad_request(msg),
            CoreError::Unauthorized(msg) => Self::unauthorized(msg),
            CoreError::InvalidCredentials => Self::forbidden("Invalid credentials"),
            CoreError::NotFound(msg) => Self::not_found(msg),
            CoreError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidInput(msg) => Self::bad_request(msg),
            SourceError::Timeout(_) => Self::new(StatusCode::GATEWAY_TIMEOUT, err.to_string()),
            SourceError::Upstream(msg) => Self::new(StatusCode::BAD_GATEWAY, msg),
            SourceError::NoResults(msg) => Self::not_found(msg),
            SourceError::NotConfigured(msg) => Self::internal(msg),
        }
    }
}
