//! Testing utilities for the ML benchmark platform
//!
//! This crate provides:
//! - Fixtures: ready-made datasets, artifacts and seeded stores
//! - Builders for custom CSV datasets and decision trees
//! - A storage mock with call counting and failure injection
//! - Proptest strategies for label vectors
//!
//! # Examples
//!
//! ```
//! use ml_benchmark_testing::{builders::*, fixtures::*};
//!
//! let csv = DatasetBuilder::new()
//!     .with_row(&[0.1, 2.0], 0.0)
//!     .with_row(&[0.9, 1.0], 1.0)
//!     .build_csv();
//! assert_eq!(csv.lines().count(), 3);
//!
//! let artifact = perfect_tree_artifact(2);
//! assert!(artifact.starts_with(b"MLBA"));
//! ```

pub mod builders;
pub mod fixtures;
pub mod mocks;
pub mod strategies;

// Re-export commonly used types
pub use builders::*;
pub use fixtures::*;
pub use mocks::*;

// Re-export testing dependencies for convenience
pub use fake;
pub use proptest;
