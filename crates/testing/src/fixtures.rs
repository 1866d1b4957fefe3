//! Test fixtures: canned datasets, artifacts and seeded stores.
//!
//! The "separable" fixtures pair with [`perfect_tree_artifact`]: feature 0 is
//! either 0.0 or 1.0 and equals the label, so a stump on feature 0 at 0.5
//! classifies every row correctly.

use bytes::Bytes;
use fake::{faker::lorem::en::Word, Fake};
use ml_benchmark_domain::artifact::{encode_artifact, ModelSpec};
use ml_benchmark_infrastructure::{InMemoryStorage, Storage, Stores};
use std::sync::Arc;

use crate::builders::{DatasetBuilder, TreeBuilder};

/// A dataset with four features and a binary label that equals feature 0.
pub fn separable_dataset(rows: usize) -> DatasetBuilder {
    (0..rows).fold(DatasetBuilder::new(), |builder, i| {
        let label = (i % 2) as f64;
        builder.with_row(&[label, i as f64, 0.25, -1.5], label)
    })
}

pub fn separable_csv(rows: usize) -> String {
    separable_dataset(rows).build_csv()
}

/// 80 rows labelled 0 and 20 labelled 1, three features each.
pub fn imbalanced_csv() -> String {
    DatasetBuilder::new()
        .with_repeated_row(&[0.0, 1.0, 2.0], 0.0, 80)
        .with_repeated_row(&[1.0, 1.0, 2.0], 1.0, 20)
        .build_csv()
}

/// A header plus a single label column.
pub fn label_only_csv() -> String {
    "target\n0\n1\n1\n".to_string()
}

/// Stump on feature 0 at 0.5, predicting 0 below and 1 above.
pub fn perfect_tree_artifact(n_features: usize) -> Vec<u8> {
    TreeBuilder::stump(n_features, 0, 0.5, 0.0, 1.0).encode()
}

/// Always predicts `label`.
pub fn constant_artifact(n_features: usize, label: f64) -> Vec<u8> {
    encode_artifact(&ModelSpec::Constant { n_features, label }).expect("constant artifact encodes")
}

/// Linear model over `n_features` that scores class 1 by feature 0.
pub fn linear_artifact(n_features: usize) -> Vec<u8> {
    let mut positive = vec![0.0; n_features];
    if let Some(first) = positive.first_mut() {
        *first = 2.0;
    }
    encode_artifact(&ModelSpec::Linear {
        n_features,
        classes: vec![0.0, 1.0],
        weights: vec![vec![0.0; n_features], positive],
        intercepts: vec![0.0, -1.0],
    })
    .expect("linear artifact encodes")
}

/// Bytes that are not an artifact at all.
pub fn corrupt_artifact() -> Vec<u8> {
    b"\x80\x04\x95this is a pickle, not an artifact".to_vec()
}

/// A random lowercase key with the given extension, e.g. `lorem.csv`.
pub fn random_key(extension: &str) -> String {
    let word: String = Word().fake();
    let stem: String = word.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if stem.is_empty() {
        format!("object.{extension}")
    } else {
        format!("{stem}.{extension}")
    }
}

/// In-memory stores pre-loaded with the given objects.
pub async fn seeded_stores(
    artifacts: &[(&str, Vec<u8>)],
    datasets: &[(&str, Vec<u8>)],
) -> Stores {
    let artifact_store = InMemoryStorage::new("models");
    for (key, data) in artifacts {
        artifact_store
            .put(key, Bytes::from(data.clone()))
            .await
            .expect("seed artifact");
    }

    let dataset_store = InMemoryStorage::new("datasets");
    for (key, data) in datasets {
        dataset_store
            .put(key, Bytes::from(data.clone()))
            .await
            .expect("seed dataset");
    }

    Stores {
        artifacts: Arc::new(artifact_store),
        datasets: Arc::new(dataset_store),
    }
}

/// Stores holding `model.mlb` (perfect tree over 4 features) and
/// `data.csv` (ten separable rows).
pub async fn standard_stores() -> Stores {
    seeded_stores(
        &[("model.mlb", perfect_tree_artifact(4))],
        &[("data.csv", separable_csv(10).into_bytes())],
    )
    .await
}
