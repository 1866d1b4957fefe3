//! Upload and listing endpoints for artifacts and datasets.

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use ml_benchmark_application::UploadReceipt;
use ml_benchmark_infrastructure::ObjectInfo;
use serde::Serialize;

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub message: String,
    pub filename: String,
    pub size: u64,
}

impl UploadResponse {
    fn new(what: &str, receipt: UploadReceipt) -> Self {
        Self {
            status: "success",
            message: format!("{what} '{}' uploaded", receipt.id),
            filename: receipt.id,
            size: receipt.size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ObjectListResponse {
    pub status: &'static str,
    pub count: usize,
    pub items: Vec<ObjectInfo>,
}

impl From<Vec<ObjectInfo>> for ObjectListResponse {
    fn from(items: Vec<ObjectInfo>) -> Self {
        Self {
            status: "success",
            count: items.len(),
            items,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload-model", post(upload_model))
        .route("/upload-dataset", post(upload_dataset))
        .route("/models", get(list_models))
        .route("/datasets", get(list_datasets))
}

async fn upload_model(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let (filename, data) = read_file_field(multipart?).await?;
    let receipt = state.uploads.upload_artifact(&filename, data).await?;
    Ok(Json(UploadResponse::new("Model", receipt)))
}

async fn upload_dataset(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let (filename, data) = read_file_field(multipart?).await?;
    let receipt = state.uploads.upload_dataset(&filename, data).await?;
    Ok(Json(UploadResponse::new("Dataset", receipt)))
}

async fn list_models(State(state): State<AppState>) -> ApiResult<Json<ObjectListResponse>> {
    Ok(Json(state.uploads.list_artifacts().await?.into()))
}

async fn list_datasets(State(state): State<AppState>) -> ApiResult<Json<ObjectListResponse>> {
    Ok(Json(state.uploads.list_datasets().await?.into()))
}

/// First `file` part with a filename; other parts are ignored.
async fn read_file_field(mut multipart: Multipart) -> ApiResult<(String, Bytes)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("No file selected".to_string()))?;
        let data = field.bytes().await?;
        return Ok((filename, data));
    }
    Err(ApiError::BadRequest(format!(
        "No '{FILE_FIELD}' part in the request"
    )))
}
