//! Common utilities shared by every ML benchmark service crate.
//!
//! This crate provides:
//! - Configuration management
//! - Telemetry and structured logging
//! - Object key and upload filename validation

pub mod config;
pub mod telemetry;
pub mod validation;

// Re-export commonly used types
pub use config::{AppConfig, CorsConfig, StorageBackend, StorageConfig, UploadConfig};
pub use telemetry::init_tracing;
pub use validation::{has_allowed_extension, secure_filename, validate_object_key};

/// Common error type used throughout the crate
pub type Result<T> = std::result::Result<T, anyhow::Error>;
