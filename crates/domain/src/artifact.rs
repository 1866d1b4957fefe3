//! Serialized classifier artifact format.
//!
//! An artifact is a fixed 12-byte header followed by a JSON payload that
//! describes the model.
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       4     Magic ("MLBA")
//! 4       1     Version major
//! 5       1     Version minor
//! 6       2     Reserved
//! 8       4     Payload size (bytes, little-endian)
//! ```
//!
//! Decoding never panics: anything that is not an artifact is reported as
//! [`LoadError::Corrupt`], and a well-formed artifact this build cannot run is
//! reported as [`LoadError::Incompatible`].

use crate::errors::LoadError;
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Magic bytes identifying a classifier artifact.
pub const MAGIC: &[u8; 4] = b"MLBA";

/// Current format version (major).
pub const CURRENT_VERSION_MAJOR: u8 = 1;

/// Current format version (minor).
pub const CURRENT_VERSION_MINOR: u8 = 0;

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 12;

// ============================================================================
// Header
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub payload_size: u32,
}

impl ArtifactHeader {
    /// Header for a payload of the given size at the current version.
    pub fn new(payload_size: u32) -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            version_minor: CURRENT_VERSION_MINOR,
            payload_size,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = self.version_major;
        buf[5] = self.version_minor;
        // 6..8 reserved
        buf[8..12].copy_from_slice(&self.payload_size.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, LoadError> {
        if &buf[0..4] != MAGIC {
            return Err(LoadError::Corrupt("not a classifier artifact (bad magic)".into()));
        }

        let version_major = buf[4];
        let version_minor = buf[5];
        if version_major > CURRENT_VERSION_MAJOR {
            return Err(LoadError::Incompatible(format!(
                "artifact format {version_major}.{version_minor} is newer than supported {CURRENT_VERSION_MAJOR}.{CURRENT_VERSION_MINOR}"
            )));
        }

        let payload_size = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);

        Ok(Self {
            version_major,
            version_minor,
            payload_size,
        })
    }
}

// ============================================================================
// Model payload
// ============================================================================

/// Model description carried in the artifact payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Predicts one label for every row (e.g. a majority-class baseline).
    Constant { n_features: usize, label: f64 },

    /// One score `w_c . x + b_c` per class; the highest score wins.
    Linear {
        n_features: usize,
        classes: Vec<f64>,
        weights: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },

    /// Binary decision tree, root at index 0.
    DecisionTree {
        n_features: usize,
        nodes: Vec<TreeNode>,
    },
}

impl ModelSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Constant { .. } => "constant",
            Self::Linear { .. } => "linear",
            Self::DecisionTree { .. } => "decision_tree",
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Self::Constant { n_features, .. }
            | Self::Linear { n_features, .. }
            | Self::DecisionTree { n_features, .. } => *n_features,
        }
    }
}

/// Decision tree node. Splits send `x[feature] <= threshold` left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        label: f64,
    },
}

// ============================================================================
// Encode / decode
// ============================================================================

/// Errors that can occur while writing an artifact.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload of {0} bytes exceeds the format limit")]
    TooLarge(usize),
}

/// Serialize a model spec into artifact bytes.
pub fn encode_artifact(spec: &ModelSpec) -> Result<Vec<u8>, EncodeError> {
    let payload = serde_json::to_vec(spec)?;
    let size = u32::try_from(payload.len()).map_err(|_| EncodeError::TooLarge(payload.len()))?;

    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&ArtifactHeader::new(size).to_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode artifact bytes into a model spec.
pub fn decode_artifact(bytes: &[u8]) -> Result<ModelSpec, LoadError> {
    let header_bytes: &[u8; HEADER_SIZE] = bytes
        .get(..HEADER_SIZE)
        .and_then(|h| h.try_into().ok())
        .ok_or_else(|| {
            LoadError::Corrupt(format!(
                "artifact truncated: {} bytes is shorter than the {HEADER_SIZE}-byte header",
                bytes.len()
            ))
        })?;
    let header = ArtifactHeader::from_bytes(header_bytes)?;

    let payload = &bytes[HEADER_SIZE..];
    let expected = header.payload_size as usize;
    if payload.len() != expected {
        return Err(LoadError::Corrupt(format!(
            "payload size mismatch: header declares {expected} bytes, found {}",
            payload.len()
        )));
    }

    serde_json::from_slice(payload).map_err(|e| {
        use serde_json::error::Category;
        match e.classify() {
            // Well-formed JSON that does not describe a known model
            Category::Data => LoadError::Incompatible(format!("unsupported model payload: {e}")),
            Category::Syntax | Category::Eof | Category::Io => {
                LoadError::Corrupt(format!("unreadable model payload: {e}"))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant() -> ModelSpec {
        ModelSpec::Constant {
            n_features: 3,
            label: 0.0,
        }
    }

    fn with_payload(payload: &[u8]) -> Vec<u8> {
        let mut bytes = ArtifactHeader::new(payload.len() as u32).to_bytes().to_vec();
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_decode_reads_encoded_spec() {
        let spec = ModelSpec::DecisionTree {
            n_features: 2,
            nodes: vec![
                TreeNode::Split {
                    feature: 1,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { label: 0.0 },
                TreeNode::Leaf { label: 1.0 },
            ],
        };
        let bytes = encode_artifact(&spec).unwrap();
        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(decode_artifact(&bytes).unwrap(), spec);
    }

    #[test]
    fn test_bad_magic_is_corrupt() {
        let mut bytes = encode_artifact(&constant()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode_artifact(&bytes), Err(LoadError::Corrupt(_))));
    }

    #[test]
    fn test_short_input_is_corrupt() {
        assert!(matches!(decode_artifact(b""), Err(LoadError::Corrupt(_))));
        assert!(matches!(decode_artifact(b"MLBA\x01"), Err(LoadError::Corrupt(_))));
    }

    #[test]
    fn test_truncated_payload_is_corrupt() {
        let bytes = encode_artifact(&constant()).unwrap();
        let err = decode_artifact(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, LoadError::Corrupt(ref m) if m.contains("size mismatch")));
    }

    #[test]
    fn test_newer_major_version_is_incompatible() {
        let mut bytes = encode_artifact(&constant()).unwrap();
        bytes[4] = CURRENT_VERSION_MAJOR + 1;
        assert!(matches!(decode_artifact(&bytes), Err(LoadError::Incompatible(_))));
    }

    #[test]
    fn test_newer_minor_version_is_accepted() {
        let mut bytes = encode_artifact(&constant()).unwrap();
        bytes[5] = CURRENT_VERSION_MINOR + 7;
        assert_eq!(decode_artifact(&bytes).unwrap(), constant());
    }

    #[test]
    fn test_invalid_json_is_corrupt() {
        let bytes = with_payload(b"{\"kind\": \"constant\", ");
        assert!(matches!(decode_artifact(&bytes), Err(LoadError::Corrupt(_))));
    }

    #[test]
    fn test_unknown_kind_is_incompatible() {
        let bytes = with_payload(br#"{"kind": "random_forest", "n_features": 3}"#);
        assert!(matches!(decode_artifact(&bytes), Err(LoadError::Incompatible(_))));
    }

    #[test]
    fn test_missing_field_is_incompatible() {
        let bytes = with_payload(br#"{"kind": "constant", "label": 1.0}"#);
        assert!(matches!(decode_artifact(&bytes), Err(LoadError::Incompatible(_))));
    }
}
