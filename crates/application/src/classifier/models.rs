//! Built-in classifier families.
//!
//! Construction validates the decoded spec completely, so `predict` can
//! index weights and tree nodes without further checks.

use super::Classifier;
use ml_benchmark_domain::{FeatureMatrix, InferenceError, LoadError, ModelSpec, TreeNode};

/// Build the classifier described by a decoded spec.
pub fn build_classifier(spec: ModelSpec) -> Result<Box<dyn Classifier>, LoadError> {
    Ok(match spec {
        ModelSpec::Constant { n_features, label } => {
            Box::new(ConstantClassifier::new(n_features, label)?)
        }
        ModelSpec::Linear {
            n_features,
            classes,
            weights,
            intercepts,
        } => Box::new(LinearClassifier::new(n_features, classes, weights, intercepts)?),
        ModelSpec::DecisionTree { n_features, nodes } => {
            Box::new(DecisionTreeClassifier::new(n_features, nodes)?)
        }
    })
}

fn incompatible(msg: impl Into<String>) -> LoadError {
    LoadError::Incompatible(msg.into())
}

fn require_features(n_features: usize) -> Result<(), LoadError> {
    if n_features == 0 {
        return Err(incompatible("model must expect at least one feature"));
    }
    Ok(())
}

fn require_finite(value: f64, what: &str) -> Result<(), LoadError> {
    if !value.is_finite() {
        return Err(incompatible(format!("{what} must be finite")));
    }
    Ok(())
}

// ============================================================================
// Constant
// ============================================================================

/// Predicts the same label for every row.
#[derive(Debug, Clone)]
pub struct ConstantClassifier {
    n_features: usize,
    label: f64,
}

impl ConstantClassifier {
    pub fn new(n_features: usize, label: f64) -> Result<Self, LoadError> {
        require_features(n_features)?;
        require_finite(label, "label")?;
        Ok(Self { n_features, label })
    }
}

impl Classifier for ConstantClassifier {
    fn kind(&self) -> &'static str {
        "constant"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
        Ok(vec![self.label; features.n_rows()])
    }
}

// ============================================================================
// Linear
// ============================================================================

/// One linear score per class; the highest score wins, earliest class on ties.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    n_features: usize,
    classes: Vec<f64>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LinearClassifier {
    pub fn new(
        n_features: usize,
        classes: Vec<f64>,
        weights: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self, LoadError> {
        require_features(n_features)?;
        if classes.is_empty() {
            return Err(incompatible("linear model has no classes"));
        }
        if weights.len() != classes.len() || intercepts.len() != classes.len() {
            return Err(incompatible(format!(
                "linear model has {} classes but {} weight rows and {} intercepts",
                classes.len(),
                weights.len(),
                intercepts.len()
            )));
        }
        for (c, row) in weights.iter().enumerate() {
            if row.len() != n_features {
                return Err(incompatible(format!(
                    "weight row {c} has {} entries, expected {n_features}",
                    row.len()
                )));
            }
            for w in row {
                require_finite(*w, "weight")?;
            }
        }
        for v in classes.iter().chain(&intercepts) {
            require_finite(*v, "class label and intercept")?;
        }

        Ok(Self {
            n_features,
            classes,
            weights,
            intercepts,
        })
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        let mut best: Option<(usize, f64)> = None;
        for (c, (w, b)) in self.weights.iter().zip(&self.intercepts).enumerate() {
            let score = w.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + b;
            if score.is_nan() {
                return Err(InferenceError::Failed(format!(
                    "score for class {} is not a number",
                    self.classes[c]
                )));
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((c, score));
            }
        }
        best.map(|(c, _)| self.classes[c])
            .ok_or_else(|| InferenceError::Failed("linear model has no classes".into()))
    }
}

impl Classifier for LinearClassifier {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
        features.rows().map(|row| self.predict_row(row)).collect()
    }
}

// ============================================================================
// Decision tree
// ============================================================================

/// Binary decision tree stored as a flat node list, root at index 0.
#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    n_features: usize,
    nodes: Vec<TreeNode>,
}

impl DecisionTreeClassifier {
    /// Children must come after their parent, which rules out cycles.
    pub fn new(n_features: usize, nodes: Vec<TreeNode>) -> Result<Self, LoadError> {
        require_features(n_features)?;
        if nodes.is_empty() {
            return Err(incompatible("decision tree has no nodes"));
        }
        for (i, node) in nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(incompatible(format!(
                            "node {i} splits on feature {feature}, model has {n_features}"
                        )));
                    }
                    require_finite(threshold, "split threshold")?;
                    for child in [left, right] {
                        if child <= i || child >= nodes.len() {
                            return Err(incompatible(format!(
                                "node {i} has invalid child index {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { label } => require_finite(label, "leaf label")?,
            }
        }
        Ok(Self { n_features, nodes })
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { label } => return label,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

impl Classifier for DecisionTreeClassifier {
    fn kind(&self) -> &'static str {
        "decision_tree"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
        Ok(features.rows().map(|row| self.predict_row(row)).collect())
    }
}
