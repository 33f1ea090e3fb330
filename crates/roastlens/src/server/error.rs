//! HTTP error mapping.
//!
//! The three user-visible failure kinds map onto status codes with a JSON
//! `detail` body. Inference failures also get logged where they are
//! observed, before being mapped here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Request-level errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    /// The model failed to load at startup; unavailable until restart
    Unavailable,

    /// The request body was malformed (missing or unreadable parts)
    BadRequest(String),

    /// The uploaded bytes could not be decoded as an image
    BadImage(String),

    /// Preprocessing or the forward pass failed
    Inference(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CLIP model is not available.".to_string(),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::BadImage(message) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid image file: {message}"),
            ),
            ApiError::Inference(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing image: {message}"),
            ),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
