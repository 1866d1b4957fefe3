//! Classifier Adapter
//!
//! An artifact is opaque to the engine: once loaded it is only something
//! that can turn a feature matrix into labels. [`ArtifactLoader`] is the seam
//! where new artifact formats plug in; [`ArtifactHandle`] guards every
//! prediction with the shape checks the engine relies on.

mod models;

pub use models::{build_classifier, ConstantClassifier, DecisionTreeClassifier, LinearClassifier};

use ml_benchmark_domain::{artifact::decode_artifact, FeatureMatrix, InferenceError, LoadError};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Anything that can predict labels for rows of features.
pub trait Classifier: Send + Sync + Debug {
    /// Short model family name, e.g. "decision_tree".
    fn kind(&self) -> &'static str;

    /// Feature columns the model was trained on.
    fn n_features(&self) -> usize;

    /// One label per row. Callers guarantee `features.n_features() == self.n_features()`.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, InferenceError>;
}

/// Deserializes artifact bytes into a classifier.
pub trait ArtifactLoader: Send + Sync + Debug {
    fn load(&self, bytes: &[u8]) -> Result<Box<dyn Classifier>, LoadError>;
}

/// Loader for the native envelope format.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeArtifactLoader;

impl ArtifactLoader for NativeArtifactLoader {
    fn load(&self, bytes: &[u8]) -> Result<Box<dyn Classifier>, LoadError> {
        let spec = decode_artifact(bytes)?;
        debug!(kind = spec.kind(), n_features = spec.n_features(), "Artifact decoded");
        build_classifier(spec)
    }
}

/// Loads artifacts and hands out checked handles.
#[derive(Debug, Clone)]
pub struct ClassifierAdapter {
    loader: Arc<dyn ArtifactLoader>,
}

impl ClassifierAdapter {
    pub fn new(loader: Arc<dyn ArtifactLoader>) -> Self {
        Self { loader }
    }

    pub fn native() -> Self {
        Self::new(Arc::new(NativeArtifactLoader))
    }

    pub fn load(&self, bytes: &[u8]) -> Result<ArtifactHandle, LoadError> {
        self.loader.load(bytes).map(ArtifactHandle::new)
    }
}

impl Default for ClassifierAdapter {
    fn default() -> Self {
        Self::native()
    }
}

/// A loaded artifact, valid for one benchmark call.
#[derive(Debug)]
pub struct ArtifactHandle {
    classifier: Box<dyn Classifier>,
}

impl ArtifactHandle {
    pub fn new(classifier: Box<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn kind(&self) -> &'static str {
        self.classifier.kind()
    }

    pub fn n_features(&self) -> usize {
        self.classifier.n_features()
    }

    /// Predict labels, rejecting inputs of the wrong width and outputs of
    /// the wrong length.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
        let expected = self.classifier.n_features();
        if features.n_features() != expected {
            return Err(InferenceError::ShapeMismatch {
                expected,
                found: features.n_features(),
            });
        }

        let predictions = self.classifier.predict(features)?;
        if predictions.len() != features.n_rows() {
            return Err(InferenceError::LengthMismatch {
                expected: features.n_rows(),
                found: predictions.len(),
            });
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ml_benchmark_domain::artifact::{encode_artifact, ModelSpec};

    /// Returns one prediction too few.
    #[derive(Debug)]
    struct ShortClassifier;

    impl Classifier for ShortClassifier {
        fn kind(&self) -> &'static str {
            "short"
        }

        fn n_features(&self) -> usize {
            1
        }

        fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
            Ok(vec![0.0; features.n_rows().saturating_sub(1)])
        }
    }

    fn matrix(rows: usize, cols: usize) -> FeatureMatrix {
        FeatureMatrix::new(rows, cols, vec![0.0; rows * cols]).unwrap()
    }

    #[test]
    fn test_native_loader_builds_classifier() {
        let bytes = encode_artifact(&ModelSpec::Constant {
            n_features: 3,
            label: 1.0,
        })
        .unwrap();
        let handle = ClassifierAdapter::native().load(&bytes).unwrap();
        assert_eq!(handle.kind(), "constant");
        assert_eq!(handle.predict(&matrix(2, 3)).unwrap(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_wrong_width_is_shape_mismatch() {
        let handle = ArtifactHandle::new(Box::new(ConstantClassifier::new(3, 0.0).unwrap()));
        assert_eq!(
            handle.predict(&matrix(4, 5)).unwrap_err(),
            InferenceError::ShapeMismatch {
                expected: 3,
                found: 5
            }
        );
    }

    #[test]
    fn test_short_output_is_length_mismatch() {
        let handle = ArtifactHandle::new(Box::new(ShortClassifier));
        assert_eq!(
            handle.predict(&matrix(3, 1)).unwrap_err(),
            InferenceError::LengthMismatch {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_garbage_bytes_fail_to_load() {
        let err = ClassifierAdapter::native().load(b"not a model").unwrap_err();
        assert!(matches!(err, LoadError::Corrupt(_)));
    }
}
