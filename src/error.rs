//! Error types and error handling for the application
//!
//! Every failure a request can hit is represented by [`AppError`]. Errors are
//! recovered locally and converted into a 400/404 response whose plain-text
//! body is the underlying error text.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Request-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Storage directory (or one of its entries) could not be read
    #[error("Failed to read storage directory: {0}")]
    DirectoryUnavailable(String),

    /// Upload request had no usable file field
    #[error("Missing upload field: {0}")]
    FieldMissing(String),

    /// Uploaded file could not be written to the storage directory
    #[error("Failed to save file: {0}")]
    WriteFailure(String),

    /// Requested file does not exist or cannot be opened
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File exists but could not be removed
    #[error("Failed to remove file: {0}")]
    RemovalFailure(String),
}

impl AppError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::FieldMissing(_) | AppError::WriteFailure(_) => StatusCode::BAD_REQUEST,
            AppError::DirectoryUnavailable(_)
            | AppError::FileNotFound(_)
            | AppError::RemovalFailure(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::warn!(status = %status.as_u16(), "{}", self);

        (status, self.to_string()).into_response()
    }
}
