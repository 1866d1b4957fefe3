//! In-memory representation of a parsed, labeled dataset.

use serde::{Deserialize, Serialize};

/// Dense, row-major matrix of numeric features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    n_rows: usize,
    n_features: usize,
    data: Vec<f64>,
}

/// Error produced when matrix dimensions and data disagree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixShapeError {
    /// Flat buffer length is not `rows * cols`
    #[error("buffer of {len} values cannot form a {rows}x{cols} matrix")]
    BufferSize { rows: usize, cols: usize, len: usize },

    /// A row had a different width than the first
    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    /// Label vector length differs from the feature row count
    #[error("{labels} labels for {rows} feature rows")]
    LabelCount { rows: usize, labels: usize },
}

impl FeatureMatrix {
    /// Build a matrix from a flat row-major buffer.
    pub fn new(n_rows: usize, n_features: usize, data: Vec<f64>) -> Result<Self, MatrixShapeError> {
        if n_rows.checked_mul(n_features) != Some(data.len()) {
            return Err(MatrixShapeError::BufferSize {
                rows: n_rows,
                cols: n_features,
                len: data.len(),
            });
        }
        Ok(Self {
            n_rows,
            n_features,
            data,
        })
    }

    /// Build a matrix from nested rows. All rows must have equal width.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, MatrixShapeError> {
        let n_features = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * n_features);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n_features {
                return Err(MatrixShapeError::RaggedRow {
                    row: i,
                    expected: n_features,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            n_rows: rows.len(),
            n_features,
            data,
        })
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Borrow row `i`. Panics if `i >= n_rows`.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.n_features;
        &self.data[start..start + self.n_features]
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }
}

/// Feature matrix `X` paired with its label vector `y`.
///
/// The label is always the rightmost column of the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub features: FeatureMatrix,
    pub labels: Vec<f64>,
}

impl Dataset {
    /// Pair features with labels; the row counts must agree.
    pub fn new(features: FeatureMatrix, labels: Vec<f64>) -> Result<Self, MatrixShapeError> {
        if features.n_rows() != labels.len() {
            return Err(MatrixShapeError::LabelCount {
                rows: features.n_rows(),
                labels: labels.len(),
            });
        }
        Ok(Self { features, labels })
    }

    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.n_features()
    }

    /// Number of distinct label values in `y`.
    pub fn n_classes(&self) -> usize {
        // -0.0 and 0.0 are the same class
        let mut seen: Vec<f64> = self
            .labels
            .iter()
            .map(|l| if *l == 0.0 { 0.0 } else { *l })
            .collect();
        seen.sort_by(|a, b| a.total_cmp(b));
        seen.dedup();
        seen.len()
    }
}
