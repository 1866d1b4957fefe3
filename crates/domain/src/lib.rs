//! ML Benchmark Domain Types
//!
//! Core domain model for the ML benchmark platform: what a benchmark request
//! is, what a dataset and a metric set look like, how a classifier artifact
//! is laid out on disk, and the closed set of ways a benchmark can fail.
//!
//! ## Architecture
//!
//! - **identifiers**: Object-key identifiers for artifacts and datasets
//! - **dataset**: Feature matrix and label vector
//! - **metrics**: The fixed four-key metric set and per-label breakdown
//! - **artifact**: Artifact envelope format and model specifications
//! - **benchmark**: Requests, the per-request stage machine, and reports
//! - **errors**: Per-step errors and the benchmark error taxonomy
//!
//! ## Usage
//!
//! ```rust
//! use ml_benchmark_domain::{
//!     artifact::{decode_artifact, encode_artifact, ModelSpec},
//!     benchmark::BenchmarkRequest,
//! };
//!
//! let request = BenchmarkRequest::parse("baseline.mlb", "iris.csv").unwrap();
//! assert_eq!(request.artifact_id.as_str(), "baseline.mlb");
//!
//! let spec = ModelSpec::Constant { n_features: 4, label: 0.0 };
//! let bytes = encode_artifact(&spec).unwrap();
//! assert_eq!(decode_artifact(&bytes).unwrap(), spec);
//! ```

#![warn(clippy::all)]

pub mod artifact;
pub mod benchmark;
pub mod dataset;
pub mod errors;
pub mod identifiers;
pub mod metrics;

// Re-export commonly used types
pub use artifact::{decode_artifact, encode_artifact, ModelSpec, TreeNode};
pub use benchmark::{BenchmarkReport, BenchmarkRequest, BenchmarkRun, BenchmarkStage};
pub use dataset::{Dataset, FeatureMatrix};
pub use errors::{
    BenchmarkError, BenchmarkResult, ErrorClass, InferenceError, LoadError, ParseError,
};
pub use identifiers::{ArtifactId, DatasetId};
pub use metrics::{ClassificationReport, LabelStats, MetricSet};
