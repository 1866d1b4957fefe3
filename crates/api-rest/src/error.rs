//! HTTP error handling and conversion.
//!
//! Maps benchmark, upload and request errors onto status codes and a JSON
//! body of the form `{error, message, details?}`.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ml_benchmark_application::ApplicationError;
use ml_benchmark_domain::BenchmarkError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// API-specific error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Benchmark pipeline error
    #[error(transparent)]
    Benchmark(#[from] BenchmarkError),

    /// Application layer error
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Payload too large
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Benchmark(err) => StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Application(err) => StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for API response
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Benchmark(err) => err.error_code(),
            Self::Application(err) => err.error_code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Which inputs the error concerns, when known.
    pub fn details(&self) -> Option<serde_json::Value> {
        let Self::Benchmark(err) = self else {
            return None;
        };
        match err {
            BenchmarkError::ArtifactNotFound(artifact_id) => {
                Some(json!({ "artifact_id": artifact_id }))
            }
            BenchmarkError::DatasetNotFound(dataset_id) => Some(json!({ "dataset_id": dataset_id })),
            BenchmarkError::InvalidArtifact {
                artifact_id,
                source,
            } => Some(json!({ "artifact_id": artifact_id, "reason": source.to_string() })),
            BenchmarkError::InvalidDataset { dataset_id, source } => {
                Some(json!({ "dataset_id": dataset_id, "reason": source.to_string() }))
            }
            BenchmarkError::InferenceFailed {
                artifact_id,
                dataset_id,
                source,
            } => Some(json!({
                "artifact_id": artifact_id,
                "dataset_id": dataset_id,
                "reason": source.to_string(),
            })),
            BenchmarkError::InvalidRequest(_) | BenchmarkError::Internal(_) => None,
        }
    }
}

/// Standardized error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub error: String,

    /// Human-readable message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error response
    pub fn with_details(mut self, details: Option<serde_json::Value>) -> Self {
        self.details = details;
        self
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(error_code, message = %message, "Request error");
        } else {
            warn!(error_code, message = %message, "Request rejected");
        }

        let body = ErrorResponse::new(error_code, message).with_details(self.details());

        (status, Json(body)).into_response()
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
