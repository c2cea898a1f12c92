//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use phishguard_core::{
    Error, ErrorKind, ExtractionFailureKind, FeatureVector, ModelId, PredictionResult,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::state::AppState;

/// Model used when a scan request names none
pub const DEFAULT_MODEL: &str = "xgboost";

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/v1/scan", post(scan))
        .route("/v1/models", get(list_models))
        .route("/v1/models/reload", post(reload_models))
        .fallback(fallback)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed").into_response(),
    }
}

/// Scan request body
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Include the normalized URL and feature vector in the response
    #[serde(default)]
    pub explain: bool,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Scan response body
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    #[serde(flatten)]
    pub result: PredictionResult,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,
}

async fn scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, AppError> {
    let Json(req) = payload?;
    let model = ModelId::from(req.model.as_str());
    info!("Scan request for '{}' with model {}", req.url, model);

    let report = state.pipeline.scan_detailed(&req.url, &model).await?;

    let response = if req.explain {
        ScanResponse {
            result: report.result,
            normalized_url: Some(report.url.to_string()),
            features: Some(report.features),
        }
    } else {
        ScanResponse {
            result: report.result,
            normalized_url: None,
            features: None,
        }
    };

    Ok(Json(response))
}

/// One registered model
#[derive(Debug, Serialize)]
struct ModelInfo {
    id: ModelId,
    name: String,
    kind: String,
}

async fn list_models(State(state): State<AppState>) -> Json<serde_json::Value> {
    let registry = state.pipeline.registry().snapshot();
    let models: Vec<ModelInfo> = registry
        .iter()
        .map(|(id, classifier)| ModelInfo {
            id: id.clone(),
            name: classifier.name().to_string(),
            kind: classifier.kind().to_string(),
        })
        .collect();

    let policy = state.pipeline.predictor().policy();
    Json(json!({
        "models": models,
        "threshold": policy.threshold,
        "suspicious_band": policy.suspicious_band,
    }))
}

async fn reload_models(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let reload_state = state.clone();
    let ids = tokio::task::spawn_blocking(move || reload_state.reload_models())
        .await
        .map_err(|e| Error::config(format!("model reload task failed: {}", e)))??;

    Ok(Json(json!({ "reloaded": ids.len(), "models": ids })))
}

async fn fallback() -> Response {
    let body = json!({
        "error": {
            "message": "No such route",
            "type": "not_found",
        }
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    /// Scan pipeline or model failure
    Scan(Error),

    /// Request body that could not be decoded
    InvalidRequest { status: StatusCode, message: String },
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::Scan(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Scan(err) => match err.kind() {
                ErrorKind::ExtractionFailure => match err.extraction_kind() {
                    Some(ExtractionFailureKind::MalformedUrl) => StatusCode::BAD_REQUEST,
                    Some(ExtractionFailureKind::Timeout) => StatusCode::GATEWAY_TIMEOUT,
                    _ => StatusCode::BAD_GATEWAY,
                },
                ErrorKind::UnknownModel => StatusCode::NOT_FOUND,
                ErrorKind::SchemaMismatch
                | ErrorKind::InferenceFailure
                | ErrorKind::Config
                | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::InvalidRequest { status, .. } => *status,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, kind) = match &self {
            AppError::Scan(err) => (err.to_string(), err.kind().as_str()),
            AppError::InvalidRequest { message, .. } => (message.clone(), "invalid_request"),
        };

        if status.is_server_error() {
            error!("Request failed: {}", message);
        }

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
