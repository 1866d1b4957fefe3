//! Scoring module - classification metrics
//!
//! Compares true labels with predictions and produces accuracy plus
//! support-weighted precision, recall and F1.

mod metrics;

pub use metrics::*;
