//! Proptest strategies for label data.

use proptest::prelude::*;

/// Integer-valued class labels drawn from `0..n_classes`.
pub fn labels(n_classes: u8, len: impl Into<prop::collection::SizeRange>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0..n_classes).prop_map(f64::from), len)
}

/// Two equal-length label vectors, ground truth then predictions.
pub fn label_pairs(n_classes: u8, max_len: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1..=max_len).prop_flat_map(move |len| (labels(n_classes, len), labels(n_classes, len)))
}
