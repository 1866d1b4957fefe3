//! Classification metrics produced by a benchmark run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The four metrics returned for every successful benchmark.
///
/// Every value lies in `[0.0, 1.0]`. Precision, recall and F1 are
/// support-weighted averages over the labels present in `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl MetricSet {
    /// Metric names, in serialization order.
    pub const KEYS: [&'static str; 4] = ["accuracy", "precision", "recall", "f1_score"];

    /// Metric name to value, keyed by [`MetricSet::KEYS`].
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        Self::KEYS.into_iter().zip(self.values()).collect()
    }

    /// Values in the same order as [`MetricSet::KEYS`].
    pub fn values(&self) -> [f64; 4] {
        [self.accuracy, self.precision, self.recall, self.f1_score]
    }

    /// True when every metric is a finite number in `[0, 1]`.
    pub fn is_within_unit_range(&self) -> bool {
        self.values()
            .iter()
            .all(|v| v.is_finite() && (0.0..=1.0).contains(v))
    }
}

/// Per-label counts and scores from which the weighted metrics are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStats {
    pub label: f64,
    /// True occurrences of the label in `y`
    pub support: usize,
    /// Occurrences of the label in the predictions
    pub predicted: usize,
    pub true_positives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Full breakdown of one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Labels present in `y`, in ascending order
    pub per_label: Vec<LabelStats>,
    pub metrics: MetricSet,
}
