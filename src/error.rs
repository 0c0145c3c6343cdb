use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

use crate::server::templates;

#[derive(Debug, ThisError)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] SqlxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("password hash error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("username already exists")]
    DuplicateUsername,

    #[error("invalid similarity artifact: {0}")]
    InvalidArtifact(String),
}

/// Last-resort mapping for errors that escape a handler. Recoverable store
/// failures (duplicate username, bad credentials, DB hiccups) are turned into
/// inline page messages inside the handlers and never reach this impl.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        error!(error = %self, "request failed");
        let (status, message) = match &self {
            AppError::DuplicateUsername => (StatusCode::CONFLICT, "Username already exists."),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred.",
            ),
        };
        (status, Html(templates::error_page(message))).into_response()
    }
}
