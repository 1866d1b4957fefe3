//! Fluent builders for constructing test datasets and models.

use bytes::Bytes;
use ml_benchmark_domain::artifact::{encode_artifact, ModelSpec, TreeNode};

/// Builder for CSV datasets. The label is always written as the last column.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    header: bool,
    delimiter: char,
    rows: Vec<(Vec<f64>, f64)>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self {
            header: true,
            delimiter: ',',
            rows: Vec::new(),
        }
    }

    pub fn without_header(mut self) -> Self {
        self.header = false;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_row(mut self, features: &[f64], label: f64) -> Self {
        self.rows.push((features.to_vec(), label));
        self
    }

    /// Add `count` copies of the same row.
    pub fn with_repeated_row(mut self, features: &[f64], label: f64, count: usize) -> Self {
        for _ in 0..count {
            self.rows.push((features.to_vec(), label));
        }
        self
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn labels(&self) -> Vec<f64> {
        self.rows.iter().map(|(_, label)| *label).collect()
    }

    pub fn build_csv(&self) -> String {
        let sep = self.delimiter.to_string();
        let mut out = String::new();

        if self.header {
            let n_features = self.rows.first().map(|(x, _)| x.len()).unwrap_or(1);
            let mut names: Vec<String> = (0..n_features).map(|i| format!("x{i}")).collect();
            names.push("target".to_string());
            out.push_str(&names.join(&sep));
            out.push('\n');
        }

        for (features, label) in &self.rows {
            let mut cells: Vec<String> = features.iter().map(|v| v.to_string()).collect();
            cells.push(label.to_string());
            out.push_str(&cells.join(&sep));
            out.push('\n');
        }
        out
    }

    pub fn build_bytes(&self) -> Bytes {
        Bytes::from(self.build_csv())
    }
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for decision tree models. Nodes are appended in order, so the
/// first node added is the root.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    n_features: usize,
    nodes: Vec<TreeNode>,
}

impl TreeBuilder {
    pub fn new(n_features: usize) -> Self {
        Self {
            n_features,
            nodes: Vec::new(),
        }
    }

    pub fn split(mut self, feature: usize, threshold: f64, left: usize, right: usize) -> Self {
        self.nodes.push(TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        });
        self
    }

    pub fn leaf(mut self, label: f64) -> Self {
        self.nodes.push(TreeNode::Leaf { label });
        self
    }

    /// A single split on `feature` with a leaf on each side.
    pub fn stump(n_features: usize, feature: usize, threshold: f64, below: f64, above: f64) -> Self {
        Self::new(n_features)
            .split(feature, threshold, 1, 2)
            .leaf(below)
            .leaf(above)
    }

    pub fn build(self) -> ModelSpec {
        ModelSpec::DecisionTree {
            n_features: self.n_features,
            nodes: self.nodes,
        }
    }

    pub fn encode(self) -> Vec<u8> {
        encode_artifact(&self.build()).expect("tree artifact encodes")
    }
}
