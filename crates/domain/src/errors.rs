//! Error taxonomy for benchmark execution.
//!
//! Each pipeline step has its own error type. The engine wraps them into
//! [`BenchmarkError`] together with the identifier that was being processed,
//! so callers always learn which input and which step failed.

use crate::identifiers::{ArtifactId, DatasetId};
use serde::{Deserialize, Serialize};

/// Failure turning raw tabular bytes into a dataset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Fewer than two columns, so there is no feature left beside the label
    #[error("dataset needs at least 2 columns (features + label), found {found}")]
    InsufficientColumns { found: usize },

    /// A row could not be read as numbers
    #[error("malformed dataset at line {line}: {reason}")]
    Malformed { line: u64, reason: String },

    /// No header or no data rows
    #[error("dataset contains no data rows")]
    Empty,
}

/// Failure deserializing a classifier artifact.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// Bytes are not a readable artifact at all
    #[error("corrupt artifact: {0}")]
    Corrupt(String),

    /// Readable, but not something this build can execute
    #[error("incompatible artifact: {0}")]
    Incompatible(String),
}

/// Failure producing predictions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    /// Feature column count differs from what the artifact was trained on
    #[error("shape mismatch: artifact expects {expected} features, dataset has {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// The artifact returned a different number of predictions than rows
    #[error("artifact returned {found} predictions for {expected} rows")]
    LengthMismatch { expected: usize, found: usize },

    /// Any other inference fault raised by the artifact
    #[error("inference failed: {0}")]
    Failed(String),
}

/// Coarse classification used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The referenced input does not exist
    NotFound,
    /// The caller supplied something unusable
    Client,
    /// Fault inside the service
    System,
}

/// Terminal outcome of a failed benchmark.
#[derive(Debug, thiserror::Error)]
pub enum BenchmarkError {
    /// Request rejected before any lookup
    #[error("invalid benchmark request: {0}")]
    InvalidRequest(String),

    /// No artifact stored under this id
    #[error("artifact not found: {0}")]
    ArtifactNotFound(ArtifactId),

    /// No dataset stored under this id
    #[error("dataset not found: {0}")]
    DatasetNotFound(DatasetId),

    /// Artifact bytes could not be loaded
    #[error("artifact '{artifact_id}' could not be loaded: {source}")]
    InvalidArtifact {
        artifact_id: ArtifactId,
        #[source]
        source: LoadError,
    },

    /// Dataset bytes could not be parsed
    #[error("dataset '{dataset_id}' is invalid: {source}")]
    InvalidDataset {
        dataset_id: DatasetId,
        #[source]
        source: ParseError,
    },

    /// Artifact rejected or failed on the dataset
    #[error("artifact '{artifact_id}' failed on dataset '{dataset_id}': {source}")]
    InferenceFailed {
        artifact_id: ArtifactId,
        dataset_id: DatasetId,
        #[source]
        source: InferenceError,
    },

    /// Unexpected fault (storage I/O, worker panic, broken invariant)
    #[error("internal error: {0}")]
    Internal(String),
}

impl BenchmarkError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ArtifactNotFound(_) | Self::DatasetNotFound(_) => ErrorClass::NotFound,
            Self::InvalidRequest(_)
            | Self::InvalidArtifact { .. }
            | Self::InvalidDataset { .. }
            | Self::InferenceFailed { .. } => ErrorClass::Client,
            Self::Internal(_) => ErrorClass::System,
        }
    }

    /// Error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::ArtifactNotFound(_) => "ARTIFACT_NOT_FOUND",
            Self::DatasetNotFound(_) => "DATASET_NOT_FOUND",
            Self::InvalidArtifact { .. } => "INVALID_ARTIFACT",
            Self::InvalidDataset { .. } => "INVALID_DATASET",
            Self::InferenceFailed { .. } => "INFERENCE_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self.class() {
            ErrorClass::NotFound => 404,
            ErrorClass::Client => 400,
            ErrorClass::System => 500,
        }
    }

    /// Benchmarks are all-or-nothing and deterministic; retrying the same
    /// inputs yields the same failure.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Result alias for benchmark execution
pub type BenchmarkResult<T> = Result<T, BenchmarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(key: &str) -> ArtifactId {
        ArtifactId::new(key).unwrap()
    }

    fn dataset(key: &str) -> DatasetId {
        DatasetId::new(key).unwrap()
    }

    #[test]
    fn test_error_codes_and_status() {
        let err = BenchmarkError::ArtifactNotFound(artifact("nope.bin"));
        assert_eq!(err.error_code(), "ARTIFACT_NOT_FOUND");
        assert_eq!(err.http_status(), 404);
        assert_eq!(err.to_string(), "artifact not found: nope.bin");

        let err = BenchmarkError::InvalidDataset {
            dataset_id: dataset("one-col.csv"),
            source: ParseError::InsufficientColumns { found: 1 },
        };
        assert_eq!(err.error_code(), "INVALID_DATASET");
        assert_eq!(err.class(), ErrorClass::Client);
        assert_eq!(err.http_status(), 400);

        let err = BenchmarkError::Internal("worker panicked".into());
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn test_shape_mismatch_is_a_client_error() {
        let err = BenchmarkError::InferenceFailed {
            artifact_id: artifact("model.mlb"),
            dataset_id: dataset("wide.csv"),
            source: InferenceError::ShapeMismatch {
                expected: 3,
                found: 5,
            },
        };
        assert_eq!(err.http_status(), 400);
        assert!(err.to_string().contains("expects 3 features, dataset has 5"));
    }

    #[test]
    fn test_source_chain_is_preserved() {
        use std::error::Error as _;

        let err = BenchmarkError::InvalidArtifact {
            artifact_id: artifact("junk.bin"),
            source: LoadError::Corrupt("bad magic".into()),
        };
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "corrupt artifact: bad magic");
    }

    #[test]
    fn test_nothing_is_retryable() {
        assert!(!BenchmarkError::Internal("io".into()).is_retryable());
        assert!(!BenchmarkError::DatasetNotFound(dataset("x.csv")).is_retryable());
    }
}
