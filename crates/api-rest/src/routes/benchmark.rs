//! Benchmark endpoint.

use crate::{error::ApiResult, extractors::ValidatedQuery, state::AppState};
use axum::{extract::State, routing::post, Json, Router};
use ml_benchmark_domain::{BenchmarkReport, BenchmarkRequest, MetricSet};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters for `POST /benchmark`
#[derive(Debug, Deserialize, Validate)]
pub struct BenchmarkQuery {
    #[validate(length(min = 1, max = 255))]
    pub model_id: String,

    #[validate(length(min = 1, max = 255))]
    pub dataset_id: String,
}

#[derive(Debug, Serialize)]
pub struct BenchmarkResponse {
    pub status: &'static str,
    pub metrics: MetricSet,
    pub report: BenchmarkReport,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/benchmark", post(run_benchmark))
}

async fn run_benchmark(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<BenchmarkQuery>,
) -> ApiResult<Json<BenchmarkResponse>> {
    let request = BenchmarkRequest::parse(&query.model_id, &query.dataset_id)?;
    let report = state.engine.run_request(&request).await?;

    Ok(Json(BenchmarkResponse {
        status: "success",
        metrics: report.metrics,
        report,
    }))
}
