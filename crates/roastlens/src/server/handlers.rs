//! Route handlers.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use roastlens_core::AnalysisError;

use super::{ApiError, AppState};

/// Default language tag when the form field is absent.
const DEFAULT_LANGUAGE: &str = "en";

/// Successful analysis response body.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub roast_prompt: String,
}

/// GET / - health/info message.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Roastlens is running. Use the /analyze endpoint to analyze images."
    }))
}

/// POST /analyze - score an uploaded image against the caption list.
///
/// Multipart form: required `image` file part, optional `language` field.
/// The model check comes first so an unavailable service answers 503
/// without touching the body.
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let analyzer = state.analyzer.clone().ok_or(ApiError::Unavailable)?;

    let mut image_bytes = None;
    let mut language = DEFAULT_LANGUAGE.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("image") => {
                image_bytes = Some(field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read image part: {e}"))
                })?);
            }
            Some("language") => {
                language = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read language field: {e}"))
                })?;
            }
            _ => {}
        }
    }

    let bytes =
        image_bytes.ok_or_else(|| ApiError::BadRequest("Missing `image` part".to_string()))?;

    // Decode and forward pass are compute-bound; keep them off the async
    // worker threads.
    let result =
        tokio::task::spawn_blocking(move || analyzer.analyze(&bytes, &language)).await;

    match result {
        Ok(Ok(roast_prompt)) => Ok(Json(AnalyzeResponse { roast_prompt })),
        Ok(Err(AnalysisError::BadImage(message))) => Err(ApiError::BadImage(message)),
        Ok(Err(AnalysisError::Inference(message))) => {
            tracing::error!("Inference failed: {message}");
            Err(ApiError::Inference(message))
        }
        Err(join_error) => {
            tracing::error!("Analysis task panicked or was cancelled: {join_error}");
            Err(ApiError::Inference(join_error.to_string()))
        }
    }
}
