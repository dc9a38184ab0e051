// src/api.rs
//! HTTP surface: CV upload, CV analysis and job search.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AppConfig;
use crate::extract::{extract_text, ExtractError};
use crate::jobs::types::{AggregationResult, AllSourcesFailedError};
use crate::jobs::JobFinder;
use crate::profile::{analyze_cv_text, anon_id, Profile};

/// CV text shorter than this is rejected by `/analyze`.
pub const MIN_CV_CHARS: usize = 50;
pub const UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub finder: Arc<JobFinder>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            finder: Arc::new(JobFinder::from_config(&config)),
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    AllSourcesFailed(#[from] AllSourcesFailedError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut message = self.to_string();
        let (status, code, extra) = match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", None),
            ApiError::Extract(ExtractError::UnsupportedFormat(_)) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                None,
            ),
            ApiError::Extract(ExtractError::ExtractionFailed(_)) => {
                (StatusCode::BAD_REQUEST, "EXTRACTION_FAILED", None)
            }
            ApiError::AllSourcesFailed(e) => (
                StatusCode::BAD_GATEWAY,
                "ALL_SOURCES_FAILED",
                Some(json!(e.causes)),
            ),
            ApiError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                message = "internal server error".to_string();
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", None)
            }
        };

        let mut error = json!({ "code": code, "message": message });
        if let Some(causes) = extra {
            error["causes"] = causes;
        }
        (status, Json(json!({ "error": error }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/", get(root))
        .route("/health", get(|| async { "ok" }))
        .route(
            "/upload_cv",
            post(upload_cv).layer(DefaultBodyLimit::max(UPLOAD_MAX_BYTES)),
        )
        .route("/analyze", post(analyze))
        .route("/find_jobs", post(find_jobs))
        .layer(cors)
        .with_state(state)
}

/// Configured origins, or any origin when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::very_permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": "SmartCV job finder",
        "endpoints": ["/health", "/upload_cv", "/analyze", "/find_jobs", "/metrics"],
    }))
}

#[derive(Debug, Serialize)]
struct UploadResp {
    text: String,
}

async fn upload_cv(mut multipart: Multipart) -> Result<Json<UploadResp>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            tracing::debug!(field = ?field.name(), "ignoring multipart field");
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("could not read upload: {e}")))?;

        // PDF parsing is CPU bound; a panic inside it comes back as a JoinError.
        let text = tokio::task::spawn_blocking(move || {
            extract_text(&bytes, &filename, content_type.as_deref())
        })
        .await
        .map_err(|e| anyhow::Error::new(e).context("cv extraction task failed"))??;

        if text.is_empty() {
            return Err(ApiError::BadRequest("no text found in the uploaded CV".into()));
        }
        tracing::info!(cv = %anon_id(&text), chars = text.chars().count(), "cv uploaded");
        return Ok(Json(UploadResp { text }));
    }

    Err(ApiError::BadRequest("missing multipart field 'file'".into()))
}

#[derive(Debug, Deserialize)]
struct AnalyzeReq {
    cv_text: String,
}

async fn analyze(Json(body): Json<AnalyzeReq>) -> Result<Json<Profile>, ApiError> {
    let text = body.cv_text.trim();
    if text.chars().count() < MIN_CV_CHARS {
        return Err(ApiError::BadRequest(format!(
            "cv_text must contain at least {MIN_CV_CHARS} characters"
        )));
    }
    Ok(Json(analyze_cv_text(text)))
}

#[derive(Debug, Deserialize)]
struct FindJobsReq {
    analysis: Profile,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    limit: Option<i64>,
}

async fn find_jobs(
    State(state): State<AppState>,
    Json(body): Json<FindJobsReq>,
) -> Result<Json<AggregationResult>, ApiError> {
    let location = body
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(&state.config.default_location);

    let result = state
        .finder
        .find_jobs(&body.analysis, Some(location), body.limit)
        .await?;
    Ok(Json(result))
}
