//! Application state and dependency injection.
//!
//! Shared across handlers via Axum's state extraction. Everything in here is
//! cheap to clone.

use anyhow::Context;
use ml_benchmark_application::{BenchmarkEngine, UploadPolicy, UploadService};
use ml_benchmark_common::AppConfig;
use ml_benchmark_infrastructure::Stores;
use std::sync::Arc;

/// Application state shared across all requests
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<AppConfig>,

    /// Artifact and dataset stores
    pub stores: Stores,

    /// Benchmark engine over the stores
    pub engine: Arc<BenchmarkEngine>,

    /// Upload service over the stores
    pub uploads: Arc<UploadService>,
}

impl AppState {
    /// Wire services over already-built stores.
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let engine = BenchmarkEngine::from_stores(&stores);
        let uploads = UploadService::new(&stores, UploadPolicy::from(&config.uploads));

        Self {
            config: Arc::new(config),
            stores,
            engine: Arc::new(engine),
            uploads: Arc::new(uploads),
        }
    }

    /// Build the stores described by `config.storage` and wire services.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let stores = Stores::from_config(&config.storage)
            .await
            .context("Failed to initialize storage")?;
        Ok(Self::new(config, stores))
    }
}
