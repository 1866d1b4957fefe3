//! Benchmark Execution Engine
//!
//! Resolves an artifact and a dataset by id, loads and parses them, runs
//! inference and scores the predictions. Every step short-circuits with a
//! typed [`BenchmarkError`] naming the input that failed.

use crate::classifier::ClassifierAdapter;
use crate::parser::DatasetParser;
use crate::scoring;
use bytes::Bytes;
use chrono::Utc;
use ml_benchmark_domain::{
    BenchmarkError, BenchmarkReport, BenchmarkRequest, BenchmarkResult, BenchmarkRun,
    BenchmarkStage, ErrorClass, MetricSet,
};
use ml_benchmark_infrastructure::{Error as StorageError, Storage, Stores};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Runs benchmarks against an artifact store and a dataset store.
///
/// Holds no per-request state; one engine serves any number of concurrent
/// calls.
#[derive(Debug, Clone)]
pub struct BenchmarkEngine {
    artifacts: Arc<dyn Storage>,
    datasets: Arc<dyn Storage>,
    adapter: ClassifierAdapter,
    parser: DatasetParser,
}

/// Output of the CPU-bound part of a run.
struct Evaluation {
    model_kind: &'static str,
    metrics: MetricSet,
    rows: usize,
    n_features: usize,
    n_classes: usize,
}

impl BenchmarkEngine {
    pub fn new(artifacts: Arc<dyn Storage>, datasets: Arc<dyn Storage>) -> Self {
        Self {
            artifacts,
            datasets,
            adapter: ClassifierAdapter::native(),
            parser: DatasetParser::default(),
        }
    }

    pub fn from_stores(stores: &Stores) -> Self {
        Self::new(stores.artifacts.clone(), stores.datasets.clone())
    }

    /// Replace the artifact adapter (e.g. to support another artifact format).
    pub fn with_adapter(mut self, adapter: ClassifierAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn with_parser(mut self, parser: DatasetParser) -> Self {
        self.parser = parser;
        self
    }

    /// Benchmark the artifact against the dataset and return the metrics.
    pub async fn run(&self, artifact_id: &str, dataset_id: &str) -> BenchmarkResult<MetricSet> {
        let request = BenchmarkRequest::parse(artifact_id, dataset_id)?;
        self.run_request(&request).await.map(|report| report.metrics)
    }

    /// Benchmark a validated request and return the full report.
    pub async fn run_request(&self, request: &BenchmarkRequest) -> BenchmarkResult<BenchmarkReport> {
        self.run_tracked(request).await.1
    }

    /// Like [`BenchmarkEngine::run_request`], but also hands back the run so
    /// callers can see the stage it ended in. A failed call always leaves the
    /// run in [`BenchmarkStage::Failed`].
    #[instrument(
        skip(self, request),
        fields(artifact_id = %request.artifact_id, dataset_id = %request.dataset_id)
    )]
    pub async fn run_tracked(
        &self,
        request: &BenchmarkRequest,
    ) -> (BenchmarkRun, BenchmarkResult<BenchmarkReport>) {
        let started = Instant::now();
        let (mut run, result) = self.execute(BenchmarkRun::new(request.clone()), started).await;
        if let Err(e) = &result {
            run.fail(e.to_string());
        }

        let run_id = run.run_id();
        let failed_at = run.failed_at().map(|stage| stage.as_str()).unwrap_or("none");
        match &result {
            Ok(report) => info!(
                %run_id,
                stage = %run.stage(),
                model_kind = %report.model_kind,
                rows = report.rows,
                accuracy = report.metrics.accuracy,
                f1_score = report.metrics.f1_score,
                duration_ms = report.duration_ms,
                "Benchmark completed"
            ),
            Err(e) if e.class() == ErrorClass::System => error!(
                %run_id,
                stage = %run.stage(),
                failed_at,
                code = e.error_code(),
                reason = run.failure().unwrap_or_default(),
                "Benchmark failed"
            ),
            Err(e) => warn!(
                %run_id,
                stage = %run.stage(),
                failed_at,
                code = e.error_code(),
                reason = run.failure().unwrap_or_default(),
                "Benchmark rejected"
            ),
        }
        (run, result)
    }

    async fn execute(
        &self,
        mut run: BenchmarkRun,
        started: Instant,
    ) -> (BenchmarkRun, BenchmarkResult<BenchmarkReport>) {
        let request = run.request().clone();

        let (artifact_bytes, dataset_bytes) = match self.resolve(&request).await {
            Ok(inputs) => inputs,
            Err(e) => return (run, Err(e)),
        };
        if let Err(e) = run.advance(BenchmarkStage::Resolved) {
            return (run, Err(e.into()));
        }
        debug!(
            artifact_size = artifact_bytes.len(),
            dataset_size = dataset_bytes.len(),
            "Inputs resolved"
        );

        // Deserialization, inference and scoring are CPU-bound
        let adapter = self.adapter.clone();
        let parser = self.parser;
        let pending = run.clone();
        let (mut run, evaluation) = match tokio::task::spawn_blocking(move || {
            let evaluation = evaluate(&mut run, &adapter, parser, &artifact_bytes, &dataset_bytes);
            (run, evaluation)
        })
        .await
        {
            Ok(joined) => joined,
            Err(e) => {
                let err = BenchmarkError::Internal(format!("benchmark worker failed: {e}"));
                return (pending, Err(err));
            }
        };

        let evaluation = match evaluation {
            Ok(evaluation) => evaluation,
            Err(e) => return (run, Err(e)),
        };
        if let Err(e) = run.advance(BenchmarkStage::Completed) {
            return (run, Err(e.into()));
        }

        let report = BenchmarkReport {
            run_id: run.run_id(),
            artifact_id: request.artifact_id,
            dataset_id: request.dataset_id,
            model_kind: evaluation.model_kind.to_string(),
            metrics: evaluation.metrics,
            rows: evaluation.rows,
            n_features: evaluation.n_features,
            n_classes: evaluation.n_classes,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            completed_at: Utc::now(),
        };
        (run, Ok(report))
    }

    /// Fetch artifact then dataset bytes. The dataset store is not touched
    /// when the artifact is missing.
    async fn resolve(&self, request: &BenchmarkRequest) -> BenchmarkResult<(Bytes, Bytes)> {
        let artifact_bytes = match self.artifacts.get(request.artifact_id.as_str()).await {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound(_)) => {
                return Err(BenchmarkError::ArtifactNotFound(request.artifact_id.clone()))
            }
            Err(e) => return Err(storage_failure("artifact", e)),
        };
        let dataset_bytes = match self.datasets.get(request.dataset_id.as_str()).await {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound(_)) => {
                return Err(BenchmarkError::DatasetNotFound(request.dataset_id.clone()))
            }
            Err(e) => return Err(storage_failure("dataset", e)),
        };
        Ok((artifact_bytes, dataset_bytes))
    }
}

fn storage_failure(what: &str, err: StorageError) -> BenchmarkError {
    BenchmarkError::Internal(format!("{what} store unavailable: {err}"))
}

fn evaluate(
    run: &mut BenchmarkRun,
    adapter: &ClassifierAdapter,
    parser: DatasetParser,
    artifact_bytes: &Bytes,
    dataset_bytes: &Bytes,
) -> BenchmarkResult<Evaluation> {
    let request = run.request().clone();

    let handle = adapter
        .load(artifact_bytes)
        .map_err(|source| BenchmarkError::InvalidArtifact {
            artifact_id: request.artifact_id.clone(),
            source,
        })?;
    run.advance(BenchmarkStage::Loaded)?;
    debug!(kind = handle.kind(), n_features = handle.n_features(), "Artifact loaded");

    let dataset = parser
        .parse(dataset_bytes)
        .map_err(|source| BenchmarkError::InvalidDataset {
            dataset_id: request.dataset_id.clone(),
            source,
        })?;
    run.advance(BenchmarkStage::Parsed)?;

    let predictions =
        handle
            .predict(&dataset.features)
            .map_err(|source| BenchmarkError::InferenceFailed {
                artifact_id: request.artifact_id.clone(),
                dataset_id: request.dataset_id.clone(),
                source,
            })?;
    run.advance(BenchmarkStage::Predicted)?;

    let metrics = scoring::score(&dataset.labels, &predictions)
        .map_err(|e| BenchmarkError::Internal(format!("scoring failed: {e}")))?;
    run.advance(BenchmarkStage::Scored)?;

    Ok(Evaluation {
        model_kind: handle.kind(),
        metrics,
        rows: dataset.n_rows(),
        n_features: dataset.n_features(),
        n_classes: dataset.n_classes(),
    })
}
