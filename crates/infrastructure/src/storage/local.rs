//! Filesystem-backed object store.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use ml_benchmark_common::validation::validate_object_key;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{ObjectInfo, Storage, StorageHealthStatus};
use crate::{Error, Result};

/// Stores each object as a file named by its key inside one directory.
///
/// Writes go to a hidden temporary file in the same directory which is then
/// renamed over the target, so readers see either the old or the new bytes.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    name: String,
    root: PathBuf,
}

impl LocalFileStorage {
    /// Open a store rooted at `root`, creating the directory if needed.
    #[instrument(skip(name, root), fields(root = %root.as_ref().display()))]
    pub async fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            Error::Configuration(format!(
                "cannot create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        let name = name.into();
        info!(store = %name, "Local storage ready");
        Ok(Self { name, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        validate_object_key(key).map_err(Error::InvalidKey)?;
        Ok(self.root.join(key))
    }

    fn info_from_metadata(key: &str, metadata: &std::fs::Metadata) -> ObjectInfo {
        ObjectInfo {
            key: key.to_string(),
            size: metadata.len(),
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        }
    }

    async fn write_atomically(&self, target: &Path, data: &[u8]) -> std::io::Result<()> {
        let tmp = self.root.join(format!(".upload-{}.tmp", Uuid::new_v4()));

        let result = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, target).await
        }
        .await;

        if result.is_err() {
            // Leftover temp files are hidden from listings; removal is best effort
            let _ = tokio::fs::remove_file(&tmp).await;
        }
        result
    }
}

#[async_trait]
impl Storage for LocalFileStorage {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, data), fields(store = %self.name, size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> Result<ObjectInfo> {
        let path = self.object_path(key)?;
        self.write_atomically(&path, &data).await?;

        let metadata = tokio::fs::metadata(&path).await?;
        debug!(key = %key, "Object stored");
        Ok(Self::info_from_metadata(key, &metadata))
    }

    #[instrument(skip(self), fields(store = %self.name))]
    async fn get(&self, key: &str) -> Result<Bytes> {
        // Nothing can be stored under an invalid key
        let path = self
            .object_path(key)
            .map_err(|_| Error::NotFound(key.to_string()))?;

        match tokio::fs::read(&path).await {
            Ok(data) => {
                debug!(key = %key, size = data.len(), "Object read");
                Ok(Bytes::from(data))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.head(key).await?.is_some())
    }

    #[instrument(skip(self), fields(store = %self.name))]
    async fn head(&self, key: &str) -> Result<Option<ObjectInfo>> {
        let Ok(path) = self.object_path(key) else {
            return Ok(None);
        };

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(Self::info_from_metadata(key, &metadata))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(store = %self.name))]
    async fn list(&self) -> Result<Vec<ObjectInfo>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut objects = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let Some(key) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            // Skips temp files, dotfiles and anything not addressable by key
            if validate_object_key(&key).is_err() {
                continue;
            }
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                objects.push(Self::info_from_metadata(&key, &metadata));
            }
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        debug!(count = objects.len(), "Objects listed");
        Ok(objects)
    }

    #[instrument(skip(self), fields(store = %self.name))]
    async fn delete(&self, key: &str) -> Result<bool> {
        let Ok(path) = self.object_path(key) else {
            return Ok(false);
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key = %key, "Object deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(store = %self.name))]
    async fn health_check(&self) -> StorageHealthStatus {
        let start = Instant::now();

        match tokio::fs::metadata(&self.root).await {
            Ok(metadata) if metadata.is_dir() => {
                let latency = start.elapsed();
                debug!(latency_ms = latency.as_millis(), "Storage health check passed");
                StorageHealthStatus::ok(latency)
            }
            Ok(_) => {
                warn!(root = %self.root.display(), "Storage root is not a directory");
                StorageHealthStatus::failed(start.elapsed(), "storage root is not a directory")
            }
            Err(e) => {
                warn!(error = %e, "Storage health check failed");
                StorageHealthStatus::failed(start.elapsed(), e.to_string())
            }
        }
    }
}
