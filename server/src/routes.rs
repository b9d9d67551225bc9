use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handle::PipelineHandle;
use crate::synthesis::{synthesize_to_file, SynthesisRequest, TtsRequest};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PipelineHandle>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(pipeline: Arc<PipelineHandle>, config: ServerConfig) -> Self {
        Self {
            pipeline,
            config: Arc::new(config),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
}

#[derive(Serialize)]
pub struct TtsResponse {
    file: String,
}

/// `/health` (GET and POST) and `/tts` (POST). Everything else is a 404,
/// including the wrong method on a known path. Request bodies are unbounded.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check).post(health_check).fallback(not_found))
        .route("/tts", post(tts_endpoint).fallback(not_found))
        .fallback(not_found)
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: state.pipeline.is_loaded(),
    })
}

pub async fn tts_endpoint(State(state): State<AppState>, body: Bytes) -> Result<Json<TtsResponse>, ApiError> {
    // Any content type is accepted; a malformed body is a 500 carrying serde's message.
    let req: TtsRequest = serde_json::from_slice(&body).map_err(|e| ApiError::Internal(e.to_string()))?;
    let request = SynthesisRequest::try_from(req)?;

    let pipeline = state.pipeline.get_or_load().await?;

    let trim = state.config.trim;
    let output_dir = state.config.output_dir.clone();
    let path = tokio::task::spawn_blocking(move || {
        synthesize_to_file(pipeline.as_ref(), &request, trim, &output_dir)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Task join error: {e}")))??;

    Ok(Json(TtsResponse {
        file: path.to_string_lossy().into_owned(),
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
