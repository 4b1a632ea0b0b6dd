use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::FileId;

/// Errors reported by blob and metadata backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Outcome kinds of the upload/download operations.
///
/// Store failures keep their cause as `source()` so it can be logged, but the
/// display text never carries backend wording.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid file identifier: {0}")]
    InvalidIdentifier(String),

    #[error("File {0} not found")]
    NotFound(FileId),

    #[error("Failed to write file content")]
    StorageWriteFailed(#[source] StoreError),

    #[error("Failed to read file")]
    StorageReadFailed(#[source] StoreError),

    #[error("Failed to record file metadata")]
    MetadataWriteFailed(#[source] StoreError),

    #[error("Operation cancelled")]
    Cancelled,
}

/// HTTP-facing error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Storage error: {0}")]
    Storage(#[source] FileError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FileError> for AppError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::InvalidInput(msg) => AppError::BadRequest(msg),
            FileError::InvalidIdentifier(_) => {
                AppError::BadRequest("Invalid file id format.".to_string())
            }
            FileError::NotFound(id) => {
                AppError::NotFound(format!("File with ID = {} not found.", id))
            }
            FileError::Cancelled => AppError::Cancelled,
            other => AppError::Storage(other),
        }
    }
}

/// Error body returned by the REST surface
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, "File is too large.".to_string())
            }
            AppError::Cancelled => {
                tracing::warn!("Request cancelled before completion");
                (StatusCode::SERVICE_UNAVAILABLE, "Request cancelled".to_string())
            }
            AppError::Storage(e) => {
                tracing::error!(error = ?e, "Storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
