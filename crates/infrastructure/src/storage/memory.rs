//! In-process object store.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use ml_benchmark_common::validation::validate_object_key;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{ObjectInfo, Storage, StorageHealthStatus};
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    last_modified: DateTime<Utc>,
}

impl StoredObject {
    fn info(&self, key: &str) -> ObjectInfo {
        ObjectInfo {
            key: key.to_string(),
            size: self.data.len() as u64,
            last_modified: Some(self.last_modified),
        }
    }
}

/// Object store held in memory. Cloning shares the same contents.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    name: String,
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl InMemoryStorage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn clear(&self) {
        self.objects.write().clear();
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<ObjectInfo> {
        validate_object_key(key).map_err(Error::InvalidKey)?;
        let object = StoredObject {
            data,
            last_modified: Utc::now(),
        };
        let info = object.info(key);
        self.objects.write().insert(key.to_string(), object);
        debug!(store = %self.name, key = %key, size = info.size, "Object stored");
        Ok(info)
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.objects
            .read()
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.read().contains_key(key))
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectInfo>> {
        Ok(self.objects.read().get(key).map(|o| o.info(key)))
    }

    async fn list(&self) -> Result<Vec<ObjectInfo>> {
        Ok(self
            .objects
            .read()
            .iter()
            .map(|(key, object)| object.info(key))
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.objects.write().remove(key).is_some())
    }

    async fn health_check(&self) -> StorageHealthStatus {
        StorageHealthStatus::ok(Duration::ZERO)
    }
}
