//! Command-line overrides for the server binary.

use clap::Parser;
use ml_benchmark_common::config::{AppConfig, StorageBackend};
use std::path::PathBuf;

/// Command-line arguments for `ml-benchmark-api`
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ml-benchmark-api")]
#[command(author, version, about = "ML model benchmarking service")]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides config and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding the models/ and datasets/ stores
    #[arg(long)]
    pub storage_dir: Option<PathBuf>,

    /// Keep uploads in memory instead of on disk
    #[arg(long)]
    pub in_memory: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ServeArgs {
    /// Apply the overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.storage_dir {
            config.storage.root_dir = dir.clone();
        }
        if self.in_memory {
            config.storage.backend = StorageBackend::InMemory;
        }
        if self.json_logs {
            config.telemetry.json_logging = true;
        }
        if let Some(level) = &self.log_level {
            config.telemetry.log_level = level.clone();
        }
    }

    /// Load layered configuration, apply the overrides and validate.
    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::load()?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}
