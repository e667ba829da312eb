// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Errors raised by the quiz core.
///
/// Ordinary "not found" lookups are reported as `None`/`false` by the core;
/// these variants are reserved for rejected operations and storage failures.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("quiz {0} does not exist")]
    QuizNotFound(i64),

    #[error("quiz {0} is hidden")]
    QuizHidden(i64),

    #[error("student {student_id} already completed quiz {quiz_id}")]
    AlreadyCompleted { quiz_id: i64, student_id: i64 },

    #[error("attempt {0} does not exist")]
    AttemptNotFound(i64),

    #[error("attempt {0} is already completed")]
    AttemptCompleted(i64),

    #[error("attempt {0} is not completed yet")]
    AttemptNotCompleted(i64),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 403 Forbidden (e.g., hidden quiz)
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., quiz already completed)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::QuizNotFound(_) | CoreError::AttemptNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            CoreError::QuizHidden(_) => AppError::Forbidden(err.to_string()),
            CoreError::AlreadyCompleted { .. }
            | CoreError::AttemptCompleted(_)
            | CoreError::AttemptNotCompleted(_) => AppError::Conflict(err.to_string()),
            CoreError::InvalidSelection(msg) => AppError::BadRequest(msg),
            CoreError::Storage(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
