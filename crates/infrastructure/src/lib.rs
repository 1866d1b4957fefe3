//! Infrastructure layer for the ML benchmark platform
//!
//! This crate provides implementations for:
//! - Object storage for artifacts and datasets (local filesystem, in-memory)
//! - Construction of the two stores from configuration
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ml_benchmark_common::config::StorageConfig;
//! use ml_benchmark_infrastructure::Stores;
//!
//! # async fn run() -> ml_benchmark_infrastructure::Result<()> {
//! let stores = Stores::from_config(&StorageConfig::default()).await?;
//! let models = stores.artifacts.list().await?;
//! # Ok(())
//! # }
//! ```

pub mod storage;

use ml_benchmark_common::config::{StorageBackend, StorageConfig};
use std::sync::Arc;
use tracing::info;

// Re-export commonly used types
pub use storage::{InMemoryStorage, LocalFileStorage, ObjectInfo, Storage, StorageHealthStatus};

// Re-export result and error types
pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure-level errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Backend failure other than I/O
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Key rejected before reaching the backend
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Storage(_))
    }

    /// Get HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::InvalidKey(_) => 400,
            Error::Configuration(_) => 500,
            Error::Io(_) | Error::Storage(_) => 503,
        }
    }
}

/// The artifact store and the dataset store, kept apart so that a dataset
/// id can never resolve to an artifact and vice versa.
#[derive(Debug, Clone)]
pub struct Stores {
    pub artifacts: Arc<dyn Storage>,
    pub datasets: Arc<dyn Storage>,
}

impl Stores {
    /// Build both stores for the configured backend.
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        let stores = match config.backend {
            StorageBackend::Local => Self {
                artifacts: Arc::new(LocalFileStorage::new("models", config.models_path()).await?),
                datasets: Arc::new(
                    LocalFileStorage::new("datasets", config.datasets_path()).await?,
                ),
            },
            StorageBackend::InMemory => Self::in_memory(),
        };
        info!(backend = ?config.backend, "Stores initialized");
        Ok(stores)
    }

    pub fn in_memory() -> Self {
        Self {
            artifacts: Arc::new(InMemoryStorage::new("models")),
            datasets: Arc::new(InMemoryStorage::new("datasets")),
        }
    }

    /// Health of both stores, artifacts first.
    pub async fn health(&self) -> StoresHealth {
        StoresHealth {
            artifacts: self.artifacts.health_check().await,
            datasets: self.datasets.health_check().await,
        }
    }
}

/// Health of the two stores.
#[derive(Debug, Clone)]
pub struct StoresHealth {
    pub artifacts: StorageHealthStatus,
    pub datasets: StorageHealthStatus,
}

impl StoresHealth {
    pub fn healthy(&self) -> bool {
        self.artifacts.healthy && self.datasets.healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(io.is_retryable());

        let not_found = Error::NotFound("test".to_string());
        assert!(!not_found.is_retryable());
    }

    #[test]
    fn test_error_http_status() {
        let not_found = Error::NotFound("test".to_string());
        assert_eq!(not_found.http_status(), 404);

        let key = Error::InvalidKey("bad key".to_string());
        assert_eq!(key.http_status(), 400);
    }

    #[tokio::test]
    async fn test_in_memory_stores_are_separate() {
        let stores = Stores::in_memory();
        stores
            .artifacts
            .put("shared.bin", bytes::Bytes::from_static(b"a"))
            .await
            .unwrap();
        assert!(!stores.datasets.exists("shared.bin").await.unwrap());
        assert!(stores.health().await.healthy());
    }
}
