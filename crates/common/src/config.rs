//! Configuration management for the application.
//!
//! Settings are layered: built-in defaults, optional config files, `APP_`
//! environment variables, and finally the plain platform variables a hosted
//! deployment sets (`PORT`, `STORAGE_DIR`, `ALLOWED_ORIGINS`,
//! `RAILWAY_ENVIRONMENT`).
//!
//! ## Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [server]
//! port = 8000
//!
//! [storage]
//! backend = "local"
//! root_dir = "/data"
//!
//! [uploads]
//! max_body_bytes = 104857600
//! dataset_extensions = ["csv", "tsv"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Deployment environment name, reported by the root endpoint
    #[serde(default = "default_environment")]
    pub environment: String,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on a single request, benchmark included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Where artifacts and datasets are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Files under `root_dir` (default)
    #[default]
    Local,
    /// Process memory; contents vanish on restart (development/testing only)
    InMemory,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Base directory for the local backend
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Artifact subdirectory under `root_dir`
    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    /// Dataset subdirectory under `root_dir`
    #[serde(default = "default_datasets_dir")]
    pub datasets_dir: String,
}

/// Upload limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Accepted artifact file extensions, without the dot
    #[serde(default = "default_artifact_extensions")]
    pub artifact_extensions: Vec<String>,

    /// Accepted dataset file extensions, without the dot
    #[serde(default = "default_dataset_extensions")]
    pub dataset_extensions: Vec<String>,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API; `*` allows any
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable JSON logging format
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    60
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_models_dir() -> String {
    "models".to_string()
}

fn default_datasets_dir() -> String {
    "datasets".to_string()
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_artifact_extensions() -> Vec<String> {
    vec!["mlb".to_string(), "bin".to_string(), "model".to_string()]
}

fn default_dataset_extensions() -> Vec<String> {
    vec!["csv".to_string()]
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_service_name() -> String {
    "ml-benchmark-api".to_string()
}

fn default_json_logging() -> bool {
    false
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root_dir: default_root_dir(),
            models_dir: default_models_dir(),
            datasets_dir: default_datasets_dir(),
        }
    }
}

impl StorageConfig {
    /// Directory holding uploaded artifacts
    pub fn models_path(&self) -> PathBuf {
        self.root_dir.join(&self.models_dir)
    }

    /// Directory holding uploaded datasets
    pub fn datasets_path(&self) -> PathBuf {
        self.root_dir.join(&self.datasets_dir)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
            artifact_extensions: default_artifact_extensions(),
            dataset_extensions: default_dataset_extensions(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl CorsConfig {
    /// True when any origin is allowed
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            json_logging: default_json_logging(),
            log_level: default_log_level(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            uploads: UploadConfig::default(),
            cors: CorsConfig::default(),
            telemetry: TelemetryConfig::default(),
            environment: default_environment(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and configuration files.
    ///
    /// The configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/{environment}.toml (if exists, where environment is from APP_ENV)
    /// 4. Environment variables (prefixed with APP_)
    /// 5. Platform variables `PORT`, `STORAGE_DIR`, `ALLOWED_ORIGINS`, `RAILWAY_ENVIRONMENT`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ml_benchmark_common::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load configuration");
    /// println!("Server will run on {}:{}", config.server.host, config.server.port);
    /// ```
    pub fn load() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            // Start with default configuration file
            .add_source(config::File::with_name("config/default").required(false))
            // Add environment-specific configuration
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            // Add environment variables (prefix: APP_)
            // Example: APP_SERVER__PORT=3000
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let mut app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.apply_platform_env(|key| std::env::var(key).ok())?;

        // Validate the configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Apply the unprefixed variables hosting platforms set.
    ///
    /// `lookup` abstracts the environment so the mapping can be exercised in
    /// isolation.
    pub fn apply_platform_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{port}'"))?;
        }

        if let Some(dir) = lookup("STORAGE_DIR").filter(|d| !d.trim().is_empty()) {
            self.storage.root_dir = PathBuf::from(dir.trim());
        }

        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
            if !origins.is_empty() {
                self.cors.allowed_origins = origins;
            }
        }

        if let Some(env) = lookup("RAILWAY_ENVIRONMENT").filter(|e| !e.trim().is_empty()) {
            self.environment = env.trim().to_string();
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate server config
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.server.request_timeout_seconds == 0 {
            anyhow::bail!("Request timeout must be greater than 0");
        }

        // Validate storage config
        for (name, dir) in [
            ("models_dir", &self.storage.models_dir),
            ("datasets_dir", &self.storage.datasets_dir),
        ] {
            if dir.trim().is_empty() {
                anyhow::bail!("Storage {} must not be empty", name);
            }
        }

        if self.storage.backend == StorageBackend::Local
            && self.storage.models_dir == self.storage.datasets_dir
        {
            anyhow::bail!("Artifacts and datasets must use separate directories");
        }

        // Validate upload config
        if self.uploads.max_body_bytes == 0 {
            anyhow::bail!("Upload body limit must be greater than 0");
        }

        if self.uploads.artifact_extensions.is_empty() {
            anyhow::bail!("At least one artifact extension must be allowed");
        }

        if self.uploads.dataset_extensions.is_empty() {
            anyhow::bail!("At least one dataset extension must be allowed");
        }

        // Validate telemetry config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}'. Must be one of: {}",
                self.telemetry.log_level,
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }

    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    /// Create a development configuration with sensible defaults
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                ..ServerConfig::default()
            },
            telemetry: TelemetryConfig {
                log_level: "debug".to_string(),
                ..TelemetryConfig::default()
            },
            ..Self::default()
        }
    }

    /// Create an in-memory configuration for tests
    pub fn testing() -> Self {
        Self {
            storage: StorageConfig {
                backend: StorageBackend::InMemory,
                ..StorageConfig::default()
            },
            environment: "test".to_string(),
            ..Self::development()
        }
    }

    /// Create a production configuration
    pub fn production() -> Self {
        Self {
            telemetry: TelemetryConfig {
                json_logging: true,
                ..TelemetryConfig::default()
            },
            environment: "production".to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_sources_yield_defaults() {
        let config: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.models_path(), PathBuf::from("./models"));
        assert_eq!(config.storage.datasets_path(), PathBuf::from("./datasets"));
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.uploads.dataset_extensions, vec!["csv"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_platform_variables_override() {
        let mut config = AppConfig::default();
        config
            .apply_platform_env(env(&[
                ("PORT", "9090"),
                ("STORAGE_DIR", "/data"),
                ("ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
                ("RAILWAY_ENVIRONMENT", "production"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.storage.models_path(), PathBuf::from("/data/models"));
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.environment, "production");
    }

    #[test]
    fn test_bad_port_variable_is_rejected() {
        let mut config = AppConfig::default();
        assert!(config.apply_platform_env(env(&[("PORT", "eighty")])).is_err());
    }

    #[test]
    fn test_blank_platform_variables_are_ignored() {
        let mut config = AppConfig::default();
        config
            .apply_platform_env(env(&[("ALLOWED_ORIGINS", " , "), ("STORAGE_DIR", "")]))
            .unwrap();
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.storage.root_dir, PathBuf::from("."));
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Invalid port
        config.server.port = 0;
        assert!(config.validate().is_err());
        config.server.port = 8000;

        // Shared directory
        config.storage.datasets_dir = "models".to_string();
        assert!(config.validate().is_err());
        config.storage.datasets_dir = "datasets".to_string();

        // No dataset formats
        config.uploads.dataset_extensions.clear();
        assert!(config.validate().is_err());
        config.uploads.dataset_extensions = vec!["csv".to_string()];

        // Invalid log level
        config.telemetry.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(AppConfig::development().validate().is_ok());
        assert!(AppConfig::production().validate().is_ok());
        assert_eq!(AppConfig::testing().storage.backend, StorageBackend::InMemory);
    }
}
