//! ML Benchmark REST API
//!
//! Axum HTTP surface over the benchmark engine and the upload service.
//!
//! ## Architecture
//!
//! - **app**: Router assembly and middleware stack
//! - **routes**: Info/health, upload/listing and benchmark handlers
//! - **middleware**: Request IDs, request logging, panic recovery
//! - **extractors**: Validated query parameters
//! - **error**: HTTP error mapping
//! - **config**: Command-line overrides for the binary
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ml_benchmark_api_rest::{create_app, AppState};
//! use ml_benchmark_common::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let addr = format!("{}:{}", config.server.host, config.server.port);
//!     let app = create_app(AppState::from_config(config).await?);
//!
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use app::create_app;
pub use config::ServeArgs;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use state::AppState;
