//! Strongly-typed identifiers for stored objects.
//!
//! Artifacts and datasets are addressed by the object key they were stored
//! under (the sanitized upload filename). Wrapping the key in a newtype keeps
//! an artifact id from being passed where a dataset id is expected.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Error returned when an identifier is empty or blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must not be empty")]
pub struct EmptyIdentifier {
    /// Which identifier was rejected
    pub kind: &'static str,
}

macro_rules! define_key_id {
    ($name:ident, $kind:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, rejecting empty or whitespace-only keys
            pub fn new(key: impl Into<String>) -> Result<Self, EmptyIdentifier> {
                let key = key.into();
                if key.trim().is_empty() {
                    return Err(EmptyIdentifier { kind: $kind });
                }
                Ok(Self(key))
            }

            /// Borrow the underlying object key
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert into the underlying object key
            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = EmptyIdentifier;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

define_key_id!(
    ArtifactId,
    "artifact id",
    "Key of a serialized classifier artifact in the artifact store"
);
define_key_id!(
    DatasetId,
    "dataset id",
    "Key of a labeled tabular dataset in the dataset store"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_keys() {
        assert!(ArtifactId::new("").is_err());
        assert_eq!(
            DatasetId::new("   ").unwrap_err().to_string(),
            "dataset id must not be empty"
        );
    }

    #[test]
    fn test_keys_are_kept_verbatim() {
        let id: ArtifactId = "model.mlb".parse().unwrap();
        assert_eq!(id.as_str(), "model.mlb");
        assert_eq!(id.to_string(), "model.mlb");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"model.mlb\"");
    }
}
