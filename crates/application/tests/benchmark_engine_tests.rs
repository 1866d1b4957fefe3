//! Integration tests for the benchmark engine

use ml_benchmark_application::BenchmarkEngine;
use ml_benchmark_domain::{
    BenchmarkError, BenchmarkRequest, BenchmarkStage, ErrorClass, InferenceError, LoadError,
    ParseError,
};
use ml_benchmark_infrastructure::{InMemoryStorage, Storage, Stores};
use ml_benchmark_testing::{
    constant_artifact, corrupt_artifact, imbalanced_csv, label_only_csv, linear_artifact,
    perfect_tree_artifact, random_key, seeded_stores, separable_csv, standard_stores,
    DatasetBuilder, MockStorage,
};
use proptest::prelude::*;
use std::sync::Arc;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ============================================================================
// Successful runs
// ============================================================================

#[tokio::test]
async fn test_perfect_predictor_scores_one() {
    // Arrange
    let engine = BenchmarkEngine::from_stores(&standard_stores().await);

    // Act
    let metrics = engine.run("model.mlb", "data.csv").await.unwrap();

    // Assert
    assert_eq!(metrics.accuracy, 1.0);
    assert_eq!(metrics.precision, 1.0);
    assert_eq!(metrics.recall, 1.0);
    assert_eq!(metrics.f1_score, 1.0);
}

#[tokio::test]
async fn test_majority_baseline_on_imbalanced_data() {
    // Arrange
    let stores = seeded_stores(
        &[("baseline.mlb", constant_artifact(3, 0.0))],
        &[("imbalanced.csv", imbalanced_csv().into_bytes())],
    )
    .await;
    let engine = BenchmarkEngine::from_stores(&stores);

    // Act
    let metrics = engine.run("baseline.mlb", "imbalanced.csv").await.unwrap();

    // Assert
    assert_close(metrics.accuracy, 0.8);
    assert_close(metrics.recall, 0.8);
    // Class 1 is never predicted and contributes zero precision
    assert_close(metrics.precision, 0.64);
    assert_close(metrics.f1_score, 0.8 * (2.0 * 0.8 / 1.8));
}

#[tokio::test]
async fn test_linear_model_on_separable_data() {
    let stores = seeded_stores(
        &[("linear.bin", linear_artifact(4))],
        &[("data.csv", separable_csv(12).into_bytes())],
    )
    .await;
    let engine = BenchmarkEngine::from_stores(&stores);

    let metrics = engine.run("linear.bin", "data.csv").await.unwrap();
    assert_eq!(metrics.accuracy, 1.0);
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let engine = BenchmarkEngine::from_stores(&standard_stores().await);

    let first = engine.run("model.mlb", "data.csv").await.unwrap();
    let second = engine.run("model.mlb", "data.csv").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_report_describes_the_run() {
    let engine = BenchmarkEngine::from_stores(&standard_stores().await);
    let request = BenchmarkRequest::parse("model.mlb", "data.csv").unwrap();

    let report = engine.run_request(&request).await.unwrap();

    assert_eq!(report.artifact_id.as_str(), "model.mlb");
    assert_eq!(report.dataset_id.as_str(), "data.csv");
    assert_eq!(report.model_kind, "decision_tree");
    assert_eq!(report.rows, 10);
    assert_eq!(report.n_features, 4);
    assert_eq!(report.n_classes, 2);
    assert!(report.metrics.is_within_unit_range());
}

#[tokio::test]
async fn test_concurrent_runs_share_one_engine() {
    let engine = Arc::new(BenchmarkEngine::from_stores(&standard_stores().await));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.run("model.mlb", "data.csv").await })
        })
        .collect();

    for handle in handles {
        let metrics = handle.await.unwrap().unwrap();
        assert_eq!(metrics.accuracy, 1.0);
    }
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_empty_ids_are_invalid_requests() {
    let engine = BenchmarkEngine::from_stores(&standard_stores().await);

    let err = engine.run("", "data.csv").await.unwrap_err();
    assert!(matches!(err, BenchmarkError::InvalidRequest(_)));
    assert_eq!(err.http_status(), 400);
}

#[tokio::test]
async fn test_missing_artifact() {
    let engine = BenchmarkEngine::from_stores(&standard_stores().await);

    let err = engine.run("nope.bin", "data.csv").await.unwrap_err();

    assert!(matches!(err, BenchmarkError::ArtifactNotFound(ref id) if id.as_str() == "nope.bin"));
    assert_eq!(err.class(), ErrorClass::NotFound);
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn test_artifact_is_resolved_before_dataset() {
    let engine = BenchmarkEngine::from_stores(&standard_stores().await);

    let err = engine.run("nope.bin", "missing.csv").await.unwrap_err();
    assert!(matches!(err, BenchmarkError::ArtifactNotFound(_)));
}

#[tokio::test]
async fn test_missing_dataset() {
    let engine = BenchmarkEngine::from_stores(&standard_stores().await);

    let err = engine.run("model.mlb", "missing.csv").await.unwrap_err();
    assert!(matches!(err, BenchmarkError::DatasetNotFound(ref id) if id.as_str() == "missing.csv"));
}

#[tokio::test]
async fn test_path_traversal_ids_are_not_found() {
    let engine = BenchmarkEngine::from_stores(&standard_stores().await);

    let err = engine.run("../model.mlb", "data.csv").await.unwrap_err();
    assert!(matches!(err, BenchmarkError::ArtifactNotFound(_)));
}

#[tokio::test]
async fn test_stores_do_not_cross_resolve() {
    // An id present only in the artifact store is not a dataset
    let stores = seeded_stores(
        &[
            ("model.mlb", perfect_tree_artifact(4)),
            ("data.csv", separable_csv(4).into_bytes()),
        ],
        &[],
    )
    .await;
    let engine = BenchmarkEngine::from_stores(&stores);

    let err = engine.run("model.mlb", "data.csv").await.unwrap_err();
    assert!(matches!(err, BenchmarkError::DatasetNotFound(_)));
}

#[tokio::test]
async fn test_label_only_dataset_is_invalid() {
    let stores = seeded_stores(
        &[("model.mlb", perfect_tree_artifact(4))],
        &[("labels.csv", label_only_csv().into_bytes())],
    )
    .await;
    let engine = BenchmarkEngine::from_stores(&stores);

    let err = engine.run("model.mlb", "labels.csv").await.unwrap_err();

    match err {
        BenchmarkError::InvalidDataset { dataset_id, source } => {
            assert_eq!(dataset_id.as_str(), "labels.csv");
            assert_eq!(source, ParseError::InsufficientColumns { found: 1 });
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_dataset_is_invalid() {
    let stores = seeded_stores(
        &[("model.mlb", perfect_tree_artifact(2))],
        &[("bad.csv", b"a,b,y\n1,2,0\n1,oops,1\n".to_vec())],
    )
    .await;
    let engine = BenchmarkEngine::from_stores(&stores);

    let err = engine.run("model.mlb", "bad.csv").await.unwrap_err();
    assert!(matches!(
        err,
        BenchmarkError::InvalidDataset {
            source: ParseError::Malformed { line: 3, .. },
            ..
        }
    ));
    assert_eq!(err.http_status(), 400);
}

#[tokio::test]
async fn test_feature_count_mismatch() {
    let stores = seeded_stores(
        &[("wide.mlb", perfect_tree_artifact(5))],
        &[("data.csv", separable_csv(6).into_bytes())],
    )
    .await;
    let engine = BenchmarkEngine::from_stores(&stores);

    let err = engine.run("wide.mlb", "data.csv").await.unwrap_err();

    assert!(matches!(
        err,
        BenchmarkError::InferenceFailed {
            source: InferenceError::ShapeMismatch {
                expected: 5,
                found: 4
            },
            ..
        }
    ));
    assert_eq!(err.class(), ErrorClass::Client);
}

#[tokio::test]
async fn test_corrupt_artifact() {
    let stores = seeded_stores(
        &[("model.pkl", corrupt_artifact())],
        &[("data.csv", separable_csv(4).into_bytes())],
    )
    .await;
    let engine = BenchmarkEngine::from_stores(&stores);

    let err = engine.run("model.pkl", "data.csv").await.unwrap_err();

    assert!(matches!(
        err,
        BenchmarkError::InvalidArtifact {
            source: LoadError::Corrupt(_),
            ..
        }
    ));
    assert_eq!(err.error_code(), "INVALID_ARTIFACT");
}

#[tokio::test]
async fn test_store_failure_is_internal() {
    let artifacts = MockStorage::new("models");
    artifacts.fail_with("connection reset");
    let datasets = InMemoryStorage::new("datasets");
    let engine = BenchmarkEngine::new(Arc::new(artifacts.clone()), Arc::new(datasets));

    let err = engine.run("model.mlb", "data.csv").await.unwrap_err();

    assert!(matches!(err, BenchmarkError::Internal(_)));
    assert_eq!(err.class(), ErrorClass::System);
    assert_eq!(artifacts.call_count("get"), 1);
}

#[tokio::test]
async fn test_dataset_is_not_fetched_when_artifact_missing() {
    let datasets = MockStorage::new("datasets");
    let engine = BenchmarkEngine::new(Arc::new(InMemoryStorage::new("models")), Arc::new(datasets.clone()));

    let _ = engine.run("nope.bin", "data.csv").await;

    assert_eq!(datasets.total_calls(), 0);
}

// ============================================================================
// Run lifecycle
// ============================================================================

#[tokio::test]
async fn test_successful_run_ends_completed() {
    // Arrange
    let engine = BenchmarkEngine::from_stores(&standard_stores().await);
    let request = BenchmarkRequest::parse("model.mlb", "data.csv").unwrap();

    // Act
    let (run, result) = engine.run_tracked(&request).await;

    // Assert
    let report = result.unwrap();
    assert_eq!(run.stage(), BenchmarkStage::Completed);
    assert_eq!(run.failure(), None);
    assert_eq!(run.failed_at(), None);
    assert_eq!(report.run_id, run.run_id());
}

#[tokio::test]
async fn test_missing_artifact_fails_run_before_resolution() {
    // Arrange
    let engine = BenchmarkEngine::from_stores(&standard_stores().await);
    let request = BenchmarkRequest::parse("nope.bin", "data.csv").unwrap();

    // Act
    let (run, result) = engine.run_tracked(&request).await;

    // Assert
    assert!(matches!(result, Err(BenchmarkError::ArtifactNotFound(_))));
    assert_eq!(run.stage(), BenchmarkStage::Failed);
    assert_eq!(run.failed_at(), Some(BenchmarkStage::Received));
    assert!(run.failure().unwrap().contains("nope.bin"));
}

#[tokio::test]
async fn test_store_failure_fails_run() {
    // Arrange
    let datasets = MockStorage::new("datasets");
    datasets.fail_with("disk unplugged");
    let stores = seeded_stores(&[("model.mlb", perfect_tree_artifact(4))], &[]).await;
    let engine = BenchmarkEngine::new(stores.artifacts.clone(), Arc::new(datasets));
    let request = BenchmarkRequest::parse("model.mlb", "data.csv").unwrap();

    // Act
    let (run, result) = engine.run_tracked(&request).await;

    // Assert
    assert!(matches!(result, Err(BenchmarkError::Internal(_))));
    assert_eq!(run.stage(), BenchmarkStage::Failed);
    assert_eq!(run.failed_at(), Some(BenchmarkStage::Received));
}

#[tokio::test]
async fn test_shape_mismatch_fails_run_after_parsing() {
    // Arrange
    let stores = seeded_stores(
        &[("wide.mlb", perfect_tree_artifact(5))],
        &[("data.csv", separable_csv(4).into_bytes())],
    )
    .await;
    let engine = BenchmarkEngine::from_stores(&stores);
    let request = BenchmarkRequest::parse("wide.mlb", "data.csv").unwrap();

    // Act
    let (run, result) = engine.run_tracked(&request).await;

    // Assert
    assert!(matches!(
        result,
        Err(BenchmarkError::InferenceFailed {
            source: InferenceError::ShapeMismatch { .. },
            ..
        })
    ));
    assert_eq!(run.stage(), BenchmarkStage::Failed);
    assert_eq!(run.failed_at(), Some(BenchmarkStage::Parsed));
    assert!(run.failure().is_some());
}

#[tokio::test]
async fn test_corrupt_artifact_fails_run_after_resolution() {
    // Arrange
    let stores = seeded_stores(
        &[("model.mlb", corrupt_artifact())],
        &[("data.csv", separable_csv(4).into_bytes())],
    )
    .await;
    let engine = BenchmarkEngine::from_stores(&stores);
    let request = BenchmarkRequest::parse("model.mlb", "data.csv").unwrap();

    // Act
    let (run, result) = engine.run_tracked(&request).await;

    // Assert
    assert!(result.is_err());
    assert_eq!(run.stage(), BenchmarkStage::Failed);
    assert_eq!(run.failed_at(), Some(BenchmarkStage::Resolved));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_perfect_predictor_always_scores_one(labels in prop::collection::vec(any::<bool>(), 1..40)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let metrics = rt.block_on(async {
            let dataset = labels.iter().enumerate().fold(DatasetBuilder::new(), |b, (i, &positive)| {
                let label = if positive { 1.0 } else { 0.0 };
                b.with_row(&[label, i as f64], label)
            });
            let model_key = random_key("mlb");
            let stores = seeded_stores(
                &[(model_key.as_str(), perfect_tree_artifact(2))],
                &[("data.csv", dataset.build_csv().into_bytes())],
            )
            .await;
            BenchmarkEngine::from_stores(&stores).run(&model_key, "data.csv").await
        });

        let metrics = metrics.unwrap();
        prop_assert_eq!(metrics.accuracy, 1.0);
        prop_assert_eq!(metrics.precision, 1.0);
        prop_assert_eq!(metrics.recall, 1.0);
        prop_assert_eq!(metrics.f1_score, 1.0);
    }
}

#[tokio::test]
async fn test_dataset_uploaded_after_engine_creation_is_visible() {
    let stores = Stores::in_memory();
    let engine = BenchmarkEngine::from_stores(&stores);
    stores
        .artifacts
        .put("model.mlb", perfect_tree_artifact(4).into())
        .await
        .unwrap();
    stores
        .datasets
        .put("late.csv", separable_csv(4).into())
        .await
        .unwrap();

    assert_eq!(engine.run("model.mlb", "late.csv").await.unwrap().accuracy, 1.0);
}
