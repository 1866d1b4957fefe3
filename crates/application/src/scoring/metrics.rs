//! Weighted multi-class classification metrics.
//!
//! For every label present in `y_true`:
//!
//! - precision = TP / predicted occurrences, 0.0 when the label is never predicted
//! - recall = TP / support
//! - F1 = 2PR / (P + R), 0.0 when P + R = 0
//!
//! Each is weighted by the label's support and the sum divided by N. Labels
//! that only appear in the predictions carry zero weight. Labels are
//! visited in ascending order, so the floating point sums are reproducible.

use ml_benchmark_domain::{ClassificationReport, LabelStats, MetricSet};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

/// Inputs that cannot be scored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("{truth} true labels but {predicted} predictions")]
    LengthMismatch { truth: usize, predicted: usize },

    #[error("cannot score an empty label vector")]
    Empty,
}

/// Exact label identity with `-0.0 == 0.0`, ordered by `f64::total_cmp`.
#[derive(Debug, Clone, Copy)]
struct LabelKey(f64);

impl LabelKey {
    fn new(label: f64) -> Self {
        Self(if label == 0.0 { 0.0 } else { label })
    }
}

impl PartialEq for LabelKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LabelKey {}

impl PartialOrd for LabelKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LabelKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    support: usize,
    predicted: usize,
    true_positives: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    let sum = precision + recall;
    if sum == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / sum
    }
}

/// Per-label breakdown plus the weighted metric set.
pub fn classification_report(
    y_true: &[f64],
    y_pred: &[f64],
) -> Result<ClassificationReport, ScoringError> {
    if y_true.len() != y_pred.len() {
        return Err(ScoringError::LengthMismatch {
            truth: y_true.len(),
            predicted: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(ScoringError::Empty);
    }

    let mut counts: BTreeMap<LabelKey, Counts> = BTreeMap::new();
    let mut correct = 0usize;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        let (t, p) = (LabelKey::new(t), LabelKey::new(p));
        counts.entry(t).or_default().support += 1;
        counts.entry(p).or_default().predicted += 1;
        if t == p {
            counts.entry(t).or_default().true_positives += 1;
            correct += 1;
        }
    }

    let n = y_true.len() as f64;
    let (mut precision, mut recall, mut f1_score) = (0.0, 0.0, 0.0);
    let mut per_label = Vec::new();

    for (label, c) in counts.iter().filter(|(_, c)| c.support > 0) {
        let p = ratio(c.true_positives, c.predicted);
        let r = ratio(c.true_positives, c.support);
        let f = f1(p, r);
        let weight = c.support as f64;

        precision += weight * p;
        recall += weight * r;
        f1_score += weight * f;

        per_label.push(LabelStats {
            label: label.0,
            support: c.support,
            predicted: c.predicted,
            true_positives: c.true_positives,
            precision: p,
            recall: r,
            f1_score: f,
        });
    }

    let metrics = MetricSet {
        accuracy: ratio(correct, y_true.len()),
        precision: (precision / n).clamp(0.0, 1.0),
        recall: (recall / n).clamp(0.0, 1.0),
        f1_score: (f1_score / n).clamp(0.0, 1.0),
    };

    Ok(ClassificationReport { per_label, metrics })
}

/// Accuracy and weighted precision, recall and F1.
pub fn score(y_true: &[f64], y_pred: &[f64]) -> Result<MetricSet, ScoringError> {
    classification_report(y_true, y_pred).map(|r| r.metrics)
}
