//! Upload Service
//!
//! Accepts artifact and dataset files, sanitizes their names and stores them.
//! Contents are not inspected here; a bad file surfaces when it is
//! benchmarked.

use crate::{ApplicationError, ApplicationResult};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use ml_benchmark_common::config::UploadConfig;
use ml_benchmark_common::validation::{file_extension, has_allowed_extension, secure_filename};
use ml_benchmark_infrastructure::{ObjectInfo, Storage, Stores};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Which store an upload goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Artifact,
    Dataset,
}

impl UploadKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Artifact => "artifact",
            Self::Dataset => "dataset",
        }
    }
}

/// Size and format limits applied to uploads.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    pub artifact_extensions: Vec<String>,
    pub dataset_extensions: Vec<String>,
}

impl From<&UploadConfig> for UploadPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_bytes: config.max_body_bytes,
            artifact_extensions: config.artifact_extensions.clone(),
            dataset_extensions: config.dataset_extensions.clone(),
        }
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from(&UploadConfig::default())
    }
}

impl UploadPolicy {
    fn extensions(&self, kind: UploadKind) -> &[String] {
        match kind {
            UploadKind::Artifact => &self.artifact_extensions,
            UploadKind::Dataset => &self.dataset_extensions,
        }
    }
}

/// Result of a stored upload. `id` is what the benchmark endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub id: String,
    pub size: u64,
    pub stored_at: Option<DateTime<Utc>>,
}

/// Stores uploaded artifacts and datasets.
#[derive(Debug, Clone)]
pub struct UploadService {
    artifacts: Arc<dyn Storage>,
    datasets: Arc<dyn Storage>,
    policy: UploadPolicy,
}

impl UploadService {
    pub fn new(stores: &Stores, policy: UploadPolicy) -> Self {
        Self {
            artifacts: stores.artifacts.clone(),
            datasets: stores.datasets.clone(),
            policy,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub async fn upload_artifact(&self, filename: &str, data: Bytes) -> ApplicationResult<UploadReceipt> {
        self.upload(UploadKind::Artifact, filename, data).await
    }

    pub async fn upload_dataset(&self, filename: &str, data: Bytes) -> ApplicationResult<UploadReceipt> {
        self.upload(UploadKind::Dataset, filename, data).await
    }

    pub async fn list_artifacts(&self) -> ApplicationResult<Vec<ObjectInfo>> {
        Ok(self.artifacts.list().await?)
    }

    pub async fn list_datasets(&self) -> ApplicationResult<Vec<ObjectInfo>> {
        Ok(self.datasets.list().await?)
    }

    #[instrument(skip(self, data), fields(kind = kind.label(), size = data.len()))]
    pub async fn upload(
        &self,
        kind: UploadKind,
        filename: &str,
        data: Bytes,
    ) -> ApplicationResult<UploadReceipt> {
        let key = self.validate(kind, filename, data.len())?;

        let store = match kind {
            UploadKind::Artifact => &self.artifacts,
            UploadKind::Dataset => &self.datasets,
        };
        let info = store.put(&key, data).await?;

        info!(key = %info.key, size = info.size, "Upload stored");
        Ok(UploadReceipt {
            id: info.key,
            size: info.size,
            stored_at: info.last_modified,
        })
    }

    /// Check an upload and return the key it will be stored under.
    pub fn validate(&self, kind: UploadKind, filename: &str, size: usize) -> ApplicationResult<String> {
        let key = secure_filename(filename);
        if key.is_empty() {
            return Err(ApplicationError::InvalidInput(format!(
                "'{filename}' is not a usable filename"
            )));
        }

        let allowed = self.policy.extensions(kind);
        if !has_allowed_extension(&key, allowed) {
            let found = file_extension(&key).unwrap_or_else(|| "none".to_string());
            let mut message = format!(
                "{} files must have one of the extensions [{}], got '{}'",
                kind.label(),
                allowed.join(", "),
                found
            );
            if kind == UploadKind::Artifact {
                message.push_str("; artifacts must use the native MLBA envelope format");
            }
            return Err(ApplicationError::InvalidInput(message));
        }

        if size == 0 {
            return Err(ApplicationError::InvalidInput(format!(
                "{} file '{key}' is empty",
                kind.label()
            )));
        }
        if size > self.policy.max_bytes {
            return Err(ApplicationError::PayloadTooLarge(format!(
                "{size} bytes exceeds the {} byte limit",
                self.policy.max_bytes
            )));
        }

        Ok(key)
    }
}
