// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Shared by the exam session client and the reference backend, so a failure
/// reads the same on both sides of the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // 404: no exam exists for the course, or no such exam.
    NotFound(String),

    // 401/403: missing, expired or rejected bearer token.
    Unauthorized(String),

    // 400/409/422: the backend rejected the payload, or a local answer was malformed.
    ValidationError(String),

    // 5xx, transport failure or an undecodable response.
    ServerError(String),

    // The session's phase does not allow the requested operation.
    // Never sent over the wire by the client; the backend maps it to 409.
    InvalidTransition(String),
}

impl AppError {
    /// Maps a non-success HTTP status and its error message onto the taxonomy.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                AppError::ValidationError(message)
            }
            _ => AppError::ServerError(format!("{}: {}", status, message)),
        }
    }

    /// Whether re-invoking the failed call may succeed without changing the input.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::ServerError(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidTransition(msg) => (StatusCode::CONFLICT, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Transport-level failures (connect, timeout, body decode) are all treated as
/// server errors; status-code failures are mapped by `from_status` instead.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ServerError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
