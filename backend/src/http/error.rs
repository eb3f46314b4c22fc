//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ErrorResponse;
use crate::db::repository::RepositoryError;

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Path id that is not a positive integer
    InvalidRecordId(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Repository error
    Repository(RepositoryError),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorResponse) {
        match self {
            AppError::InvalidRecordId(raw) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Invalid record id").with_error(format!(
                    "Record id must be a positive integer, got '{}'",
                    raw
                )),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            AppError::Repository(e) => repository_status_and_body(e),
        }
    }
}

fn repository_status_and_body(err: RepositoryError) -> (StatusCode, ErrorResponse) {
    match &err {
        RepositoryError::NotFound { context, .. } => {
            let mut body = ErrorResponse::new(err.message());
            body.record_id = context.entity_id.as_deref().and_then(|id| id.parse().ok());
            (StatusCode::NOT_FOUND, body)
        }
        RepositoryError::ValidationError { .. } => {
            (StatusCode::BAD_REQUEST, ErrorResponse::new(err.message()))
        }
        RepositoryError::ConnectionError { .. } | RepositoryError::TimeoutError { .. } => {
            log::error!("{}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("Database connection failed").with_error(err.message()),
            )
        }
        _ => {
            log::error!("{}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(err.message()),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}
