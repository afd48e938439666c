//! # Centralized Error Handling
//!
//! Every engine operation returns [`AppResult`]. The variants mirror the error
//! categories clients see: entitlement and validation failures are detected
//! before any mutation, conflicts come from the store's uniqueness guarantees,
//! and store failures are logged here and surfaced opaquely.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Central application error type that encompasses all possible error conditions.
///
/// _Db errors are logged automatically when converted into a response, while
/// other errors should be logged at the point of creation if needed._
#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(&'static str),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("internal server error")]
    Internal,
}

impl AppError {
    /// Stable, machine-readable error category.
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::ValidationFailed(_) => "validation_failed",
            AppError::Db(_) | AppError::Internal => "internal",
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationFailed(errors.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationFailed(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationFailed(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Db(e) = &self {
            error!(?e, "Database error occurred");
        }

        let category = self.category();
        let (status, message) = match self {
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_owned()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_owned()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_owned()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_owned()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.to_owned()),
            AppError::ValidationFailed(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        };

        let body = Json(ErrorBody {
            success: false,
            error: category,
            message,
        });
        (status, body).into_response()
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;

/// Failures that abort process startup.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] crate::utils::config::ConfigError),
    #[error("failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("failed to read taxonomy file: {0}")]
    TaxonomyIo(#[from] std::io::Error),
    #[error("failed to parse taxonomy file: {0}")]
    TaxonomyParse(#[from] serde_json::Error),
}
