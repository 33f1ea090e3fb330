//! Router integration tests.
//!
//! The model handle is substituted with stub analyzers so the HTTP contract
//! can be exercised without ONNX sessions or checkpoint files on disk.

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use roastlens::server::{build_router, AppState};
use roastlens_core::{AnalysisError, CaptionAnalyzer, CaptionSet, Language};

const ALLOWED_ORIGIN: &str = "http://localhost:9002";
const BOUNDARY: &str = "roastlens-test-boundary";

/// Stand-in for the real analyzer: decodes the upload, then deterministically
/// "wins" at a fixed caption index instead of running a forward pass.
struct FixedWinner(usize);

impl CaptionAnalyzer for FixedWinner {
    fn analyze(&self, image_bytes: &[u8], language_tag: &str) -> Result<String, AnalysisError> {
        roastlens_core::decode::decode_image(image_bytes)?;
        let set = CaptionSet::for_language(Language::from_tag(language_tag));
        Ok(set.render(self.0))
    }
}

/// Stand-in whose forward pass always fails.
struct Failing;

impl CaptionAnalyzer for Failing {
    fn analyze(&self, _image_bytes: &[u8], _language_tag: &str) -> Result<String, AnalysisError> {
        Err(AnalysisError::Inference(
            "unexpected tensor shape [1, 0]".to_string(),
        ))
    }
}

fn router_with(analyzer: Option<Arc<dyn CaptionAnalyzer>>) -> Router {
    build_router(AppState { analyzer }, &[ALLOWED_ORIGIN.to_string()])
}

/// A small valid PNG, encoded in memory.
fn png_bytes() -> Vec<u8> {
    let image = image::DynamicImage::ImageRgb8(image::RgbImage::new(16, 16));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Build a multipart/form-data body from (name, filename, data) parts.
fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn analyze_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn root_returns_status_message() {
    let app = router_with(Some(Arc::new(FixedWinner(0))));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("/analyze"));
}

#[tokio::test]
async fn analyze_without_model_returns_503() {
    let app = router_with(None);

    let body = multipart_body(&[("image", Some("photo.png"), &png_bytes())]);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "CLIP model is not available.");
}

#[tokio::test]
async fn analyze_without_model_skips_body_processing() {
    // Even a garbage body answers 503: the model check comes first.
    let app = router_with(None);

    let response = app
        .oneshot(analyze_request(b"not multipart at all".to_vec()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn analyze_defaults_to_english() {
    let app = router_with(Some(Arc::new(FixedWinner(7))));

    let body = multipart_body(&[("image", Some("pet.png"), &png_bytes())]);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body["roast_prompt"],
        "The image appears to be of an adorable pet. Based on this, \
         the subject might be a bit predictable or trying too hard."
    );
}

#[tokio::test]
async fn analyze_spanish_uses_spanish_set_at_same_index() {
    let app = router_with(Some(Arc::new(FixedWinner(7))));

    let body = multipart_body(&[
        ("image", Some("pet.png"), &png_bytes()),
        ("language", None, b"es"),
    ]);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body["roast_prompt"],
        "La imagen parece ser de una mascota adorable. Basándonos en esto, \
         el sujeto podría ser un poco predecible o estar esforzándose demasiado."
    );
}

#[tokio::test]
async fn analyze_unrecognized_language_falls_back_to_english() {
    let app = router_with(Some(Arc::new(FixedWinner(0))));

    let body = multipart_body(&[
        ("image", Some("selfie.png"), &png_bytes()),
        ("language", None, b"fr"),
    ]);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["roast_prompt"]
        .as_str()
        .unwrap()
        .contains("a generic selfie"));
}

#[tokio::test]
async fn analyze_rejects_undecodable_image_with_400() {
    let app = router_with(Some(Arc::new(FixedWinner(0))));

    let body = multipart_body(&[("image", Some("notes.txt"), b"plain text, not pixels")]);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Invalid image file:"));
}

#[tokio::test]
async fn analyze_rejects_missing_image_part_with_400() {
    let app = router_with(Some(Arc::new(FixedWinner(0))));

    let body = multipart_body(&[("language", None, b"en")]);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Missing `image` part");
}

#[tokio::test]
async fn analyze_ignores_unknown_parts() {
    let app = router_with(Some(Arc::new(FixedWinner(0))));

    let body = multipart_body(&[
        ("comment", None, b"roast me gently"),
        ("image", Some("photo.png"), &png_bytes()),
    ]);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn inference_failure_returns_500_with_message() {
    let app = router_with(Some(Arc::new(Failing)));

    let body = multipart_body(&[("image", Some("photo.png"), &png_bytes())]);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error processing image:"));
    assert!(detail.contains("unexpected tensor shape"));
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let app = router_with(Some(Arc::new(FixedWinner(0))));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, ALLOWED_ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some(ALLOWED_ORIGIN)
    );
}

#[tokio::test]
async fn cors_omits_header_for_unlisted_origin() {
    let app = router_with(Some(Arc::new(FixedWinner(0))));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
