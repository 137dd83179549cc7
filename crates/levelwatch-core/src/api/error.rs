//! HTTP error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::StoreError;

/// Failures surfaced by the HTTP handlers.
///
/// The legacy clients expect short plain-text bodies, so detail stays in the
/// server log.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body was not a valid level document
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Writing a reading failed
    #[error("Failed to save data: {0}")]
    Save(StoreError),

    /// Reading the latest level failed
    #[error("Failed to get level data: {0}")]
    Load(StoreError),

    /// Route exists but not for this method
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::InvalidJson(detail) => {
                tracing::debug!(error = %detail, "Rejected request body");
                (StatusCode::BAD_REQUEST, "Invalid JSON")
            }
            ApiError::Save(StoreError::Invalid(detail)) => {
                tracing::debug!(error = %detail, "Rejected reading");
                (StatusCode::BAD_REQUEST, "Invalid level")
            }
            ApiError::Save(err) => {
                tracing::error!(error = %err, "Error saving to database");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save data")
            }
            ApiError::Load(err) => {
                tracing::error!(error = %err, "Error getting level data");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get level data")
            }
            ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
        };

        (status, body).into_response()
    }
}
