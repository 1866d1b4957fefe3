//! Application layer for the ML benchmark platform
//!
//! Orchestrates the benchmark pipeline over the domain types and the object
//! stores.
//!
//! ## Modules
//!
//! - `parser` - Delimited dataset parsing
//! - `classifier` - Artifact loading and batch inference
//! - `scoring` - Weighted classification metrics
//! - `services` - Benchmark engine and upload service

pub mod classifier;
pub mod parser;
pub mod scoring;
pub mod services;

// Re-export commonly used types
pub use classifier::{ArtifactHandle, ArtifactLoader, Classifier, ClassifierAdapter};
pub use parser::DatasetParser;
pub use scoring::{classification_report, score, ScoringError};
pub use services::{BenchmarkEngine, UploadKind, UploadPolicy, UploadReceipt, UploadService};

use ml_benchmark_infrastructure::Error as StorageError;
use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug, Clone)]
pub enum ApplicationError {
    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upload larger than the configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Backing store unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApplicationError {
    /// Get HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            ApplicationError::NotFound(_) => 404,
            ApplicationError::InvalidInput(_) => 400,
            ApplicationError::PayloadTooLarge(_) => 413,
            ApplicationError::Internal(_) => 500,
            ApplicationError::ServiceUnavailable(_) => 503,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApplicationError::ServiceUnavailable(_))
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ApplicationError::NotFound(_) => "NOT_FOUND",
            ApplicationError::InvalidInput(_) => "INVALID_INPUT",
            ApplicationError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApplicationError::Internal(_) => "INTERNAL_ERROR",
            ApplicationError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl From<StorageError> for ApplicationError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => ApplicationError::NotFound(key),
            StorageError::InvalidKey(msg) => ApplicationError::InvalidInput(msg),
            StorageError::Configuration(msg) => ApplicationError::Internal(msg),
            other if other.is_retryable() => ApplicationError::ServiceUnavailable(other.to_string()),
            other => ApplicationError::Internal(other.to_string()),
        }
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_http_status() {
        assert_eq!(ApplicationError::NotFound("test".to_string()).http_status(), 404);
        assert_eq!(ApplicationError::InvalidInput("test".to_string()).http_status(), 400);
        assert_eq!(ApplicationError::PayloadTooLarge("test".to_string()).http_status(), 413);
        assert_eq!(ApplicationError::Internal("test".to_string()).http_status(), 500);
        assert_eq!(ApplicationError::ServiceUnavailable("test".to_string()).http_status(), 503);
    }

    #[test]
    fn test_error_retryable() {
        assert!(ApplicationError::ServiceUnavailable("test".to_string()).is_retryable());
        assert!(!ApplicationError::NotFound("test".to_string()).is_retryable());
        assert!(!ApplicationError::InvalidInput("test".to_string()).is_retryable());
    }

    #[test]
    fn test_storage_error_mapping() {
        let err: ApplicationError = StorageError::NotFound("x.csv".to_string()).into();
        assert!(matches!(err, ApplicationError::NotFound(ref k) if k == "x.csv"));

        let err: ApplicationError = StorageError::InvalidKey("../x".to_string()).into();
        assert_eq!(err.http_status(), 400);
    }
}
