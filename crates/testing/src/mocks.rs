//! Mock storage for exercising failure paths.
//!
//! [`MockStorage`] wraps an [`InMemoryStorage`], counts calls per operation
//! and can be told to fail every operation with a backend error.

use async_trait::async_trait;
use bytes::Bytes;
use ml_benchmark_infrastructure::{
    Error, InMemoryStorage, ObjectInfo, Result, Storage, StorageHealthStatus,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Storage mock with call counting and failure injection.
#[derive(Debug, Clone)]
pub struct MockStorage {
    inner: InMemoryStorage,
    failure: Arc<RwLock<Option<String>>>,
    calls: Arc<RwLock<HashMap<&'static str, usize>>>,
}

impl MockStorage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: InMemoryStorage::new(name),
            failure: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Make every subsequent operation fail with `Error::Storage(message)`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write() = Some(message.into());
    }

    pub fn recover(&self) {
        *self.failure.write() = None;
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.read().get(operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.read().values().sum()
    }

    /// Direct access to the backing store, bypassing counting and failures.
    pub fn inner(&self) -> &InMemoryStorage {
        &self.inner
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        *self.calls.write().entry(operation).or_insert(0) += 1;
        match self.failure.read().as_ref() {
            Some(message) => Err(Error::Storage(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Storage for MockStorage {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<ObjectInfo> {
        self.record("put")?;
        self.inner.put(key, data).await
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.record("get")?;
        self.inner.get(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.record("exists")?;
        self.inner.exists(key).await
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectInfo>> {
        self.record("head")?;
        self.inner.head(key).await
    }

    async fn list(&self) -> Result<Vec<ObjectInfo>> {
        self.record("list")?;
        self.inner.list().await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.record("delete")?;
        self.inner.delete(key).await
    }

    async fn health_check(&self) -> StorageHealthStatus {
        match self.record("health_check") {
            Ok(()) => StorageHealthStatus::ok(Duration::ZERO),
            Err(e) => StorageHealthStatus::failed(Duration::ZERO, e.to_string()),
        }
    }
}
