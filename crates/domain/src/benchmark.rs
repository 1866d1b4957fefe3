//! Benchmark requests, the per-request stage machine, and reports.

use crate::errors::BenchmarkError;
use crate::identifiers::{ArtifactId, DatasetId};
use crate::metrics::MetricSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Caller-supplied pair of identifiers. Carries no other state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkRequest {
    pub artifact_id: ArtifactId,
    pub dataset_id: DatasetId,
}

impl BenchmarkRequest {
    /// Validate raw identifiers into a request.
    pub fn parse(artifact_id: &str, dataset_id: &str) -> Result<Self, BenchmarkError> {
        let artifact_id = ArtifactId::new(artifact_id)
            .map_err(|e| BenchmarkError::InvalidRequest(e.to_string()))?;
        let dataset_id =
            DatasetId::new(dataset_id).map_err(|e| BenchmarkError::InvalidRequest(e.to_string()))?;
        Ok(Self {
            artifact_id,
            dataset_id,
        })
    }
}

/// Progress of a single benchmark request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkStage {
    Received,
    /// Both identifiers resolved to stored bytes
    Resolved,
    /// Artifact deserialized into a classifier
    Loaded,
    /// Dataset split into features and labels
    Parsed,
    Predicted,
    Scored,
    Completed,
    Failed,
}

impl BenchmarkStage {
    /// Check if a stage transition is valid
    pub fn can_transition_to(&self, target: BenchmarkStage) -> bool {
        matches!(
            (self, target),
            (Self::Received, Self::Resolved)
                | (Self::Resolved, Self::Loaded)
                | (Self::Loaded, Self::Parsed)
                | (Self::Parsed, Self::Predicted)
                | (Self::Predicted, Self::Scored)
                | (Self::Scored, Self::Completed)
        ) || (!self.is_terminal() && target == Self::Failed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Resolved => "resolved",
            Self::Loaded => "loaded",
            Self::Parsed => "parsed",
            Self::Predicted => "predicted",
            Self::Scored => "scored",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for BenchmarkStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a run is pushed along an edge the stage machine lacks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("benchmark stage transition not allowed: {from} -> {to}")]
pub struct StageTransitionError {
    pub from: BenchmarkStage,
    pub to: BenchmarkStage,
}

impl From<StageTransitionError> for BenchmarkError {
    fn from(err: StageTransitionError) -> Self {
        BenchmarkError::Internal(err.to_string())
    }
}

/// Ephemeral tracker for one benchmark call. Never shared between requests.
#[derive(Debug, Clone)]
pub struct BenchmarkRun {
    run_id: Uuid,
    request: BenchmarkRequest,
    stage: BenchmarkStage,
    failure: Option<String>,
    failed_at: Option<BenchmarkStage>,
    started_at: DateTime<Utc>,
}

impl BenchmarkRun {
    pub fn new(request: BenchmarkRequest) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            request,
            stage: BenchmarkStage::Received,
            failure: None,
            failed_at: None,
            started_at: Utc::now(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn request(&self) -> &BenchmarkRequest {
        &self.request
    }

    pub fn stage(&self) -> BenchmarkStage {
        self.stage
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Reason recorded by [`BenchmarkRun::fail`], if any.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Last stage reached before the run failed.
    pub fn failed_at(&self) -> Option<BenchmarkStage> {
        self.failed_at
    }

    /// Move to the next stage.
    pub fn advance(&mut self, to: BenchmarkStage) -> Result<(), StageTransitionError> {
        if !self.stage.can_transition_to(to) {
            return Err(StageTransitionError {
                from: self.stage,
                to,
            });
        }
        self.stage = to;
        Ok(())
    }

    /// Mark the run failed. A run that already finished keeps its stage.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.stage.can_transition_to(BenchmarkStage::Failed) {
            self.failed_at = Some(self.stage);
            self.stage = BenchmarkStage::Failed;
            self.failure = Some(reason.into());
        }
    }
}

/// Metrics of a completed run plus the context they were computed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub run_id: Uuid,
    pub artifact_id: ArtifactId,
    pub dataset_id: DatasetId,
    /// Classifier kind reported by the loaded artifact
    pub model_kind: String,
    pub metrics: MetricSet,
    pub rows: usize,
    pub n_features: usize,
    pub n_classes: usize,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BenchmarkRequest {
        BenchmarkRequest::parse("model.mlb", "iris.csv").unwrap()
    }

    #[test]
    fn test_parse_rejects_empty_ids() {
        assert!(matches!(
            BenchmarkRequest::parse("", "iris.csv"),
            Err(BenchmarkError::InvalidRequest(_))
        ));
        assert!(matches!(
            BenchmarkRequest::parse("model.mlb", " "),
            Err(BenchmarkError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_run_walks_happy_path() {
        let mut run = BenchmarkRun::new(request());
        for stage in [
            BenchmarkStage::Resolved,
            BenchmarkStage::Loaded,
            BenchmarkStage::Parsed,
            BenchmarkStage::Predicted,
            BenchmarkStage::Scored,
            BenchmarkStage::Completed,
        ] {
            run.advance(stage).unwrap();
        }
        assert_eq!(run.stage(), BenchmarkStage::Completed);
        assert!(run.stage().is_terminal());
    }

    #[test]
    fn test_run_rejects_skipped_stage() {
        let mut run = BenchmarkRun::new(request());
        let err = run.advance(BenchmarkStage::Parsed).unwrap_err();
        assert_eq!(err.from, BenchmarkStage::Received);
        assert_eq!(run.stage(), BenchmarkStage::Received);
    }

    #[test]
    fn test_fail_records_reason_once() {
        let mut run = BenchmarkRun::new(request());
        run.advance(BenchmarkStage::Resolved).unwrap();
        run.fail("corrupt artifact");
        assert_eq!(run.stage(), BenchmarkStage::Failed);
        assert_eq!(run.failure(), Some("corrupt artifact"));
        assert_eq!(run.failed_at(), Some(BenchmarkStage::Resolved));

        run.fail("second failure");
        assert_eq!(run.failure(), Some("corrupt artifact"));
        assert_eq!(run.failed_at(), Some(BenchmarkStage::Resolved));
    }

    #[test]
    fn test_completed_run_cannot_fail() {
        let mut run = BenchmarkRun::new(request());
        assert_eq!(run.failed_at(), None);
        for stage in [
            BenchmarkStage::Resolved,
            BenchmarkStage::Loaded,
            BenchmarkStage::Parsed,
            BenchmarkStage::Predicted,
            BenchmarkStage::Scored,
            BenchmarkStage::Completed,
        ] {
            run.advance(stage).unwrap();
        }

        run.fail("too late");
        assert_eq!(run.stage(), BenchmarkStage::Completed);
        assert_eq!(run.failure(), None);
        assert_eq!(run.failed_at(), None);
    }
}
