//! Object storage for uploaded artifacts and datasets.
//!
//! A store maps flat object keys (sanitized filenames) to immutable byte
//! blobs. Two backends are provided: [`LocalFileStorage`] writes files under
//! a directory with write-then-rename, and [`InMemoryStorage`] keeps
//! everything in process memory for tests and ephemeral deployments.

mod local;
mod memory;

pub use local::LocalFileStorage;
pub use memory::InMemoryStorage;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::Result;

/// Storage provider trait for object storage operations.
///
/// Implementations must allow concurrent readers; a `get` never observes a
/// partially written object.
#[async_trait]
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Short label used in logs and health output (e.g. "models").
    fn name(&self) -> &str;

    /// Store an object, replacing any previous object under the same key.
    async fn put(&self, key: &str, data: Bytes) -> Result<ObjectInfo>;

    /// Fetch an object. Missing keys yield [`crate::Error::NotFound`].
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Check if an object exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Object information without reading the contents.
    async fn head(&self, key: &str) -> Result<Option<ObjectInfo>>;

    /// All stored objects, sorted by key.
    async fn list(&self) -> Result<Vec<ObjectInfo>>;

    /// Delete an object. Returns `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Probe the backend.
    async fn health_check(&self) -> StorageHealthStatus;
}

/// Object information for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectInfo {
    /// Object key
    pub key: String,
    /// Object size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub last_modified: Option<DateTime<Utc>>,
}

/// Storage health status.
#[derive(Debug, Clone)]
pub struct StorageHealthStatus {
    /// Whether the storage is healthy
    pub healthy: bool,
    /// Probe latency
    pub latency: Duration,
    /// Error message if unhealthy
    pub error: Option<String>,
}

impl StorageHealthStatus {
    pub fn ok(latency: Duration) -> Self {
        Self {
            healthy: true,
            latency,
            error: None,
        }
    }

    pub fn failed(latency: Duration, error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            latency,
            error: Some(error.into()),
        }
    }
}
