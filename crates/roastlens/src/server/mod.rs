//! The Roastlens HTTP server.
//!
//! One router, two routes: a health/info root and the multipart `/analyze`
//! endpoint. The model handle is loaded once before serving and injected
//! into the router state; a load failure leaves the state empty rather than
//! aborting startup, so the process stays up and `/analyze` fails closed.

mod error;
mod handlers;

pub use error::ApiError;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use roastlens_core::{Analyzer, CaptionAnalyzer, ClipEngine, Config};

/// Largest accepted request body. Camera photos routinely exceed the
/// framework's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared router state.
///
/// `analyzer` is `None` when the model failed to load at startup; every
/// `/analyze` request then reports the unavailable condition.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Option<Arc<dyn CaptionAnalyzer>>,
}

/// Build the application router with CORS restricted to `allowed_origins`.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring unparseable CORS origin {origin:?}");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/analyze", post(handlers::analyze))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Load the model handle, fail-soft.
///
/// Any load error is logged and swallowed; the server runs without an
/// analyzer until restart. One-shot, no retry.
fn load_analyzer(config: &Config) -> Option<Arc<dyn CaptionAnalyzer>> {
    match ClipEngine::load(&config.model, &config.model_dir()) {
        Ok(engine) => Some(Arc::new(Analyzer::new(engine))),
        Err(e) => {
            tracing::error!("Failed to load CLIP model: {e}");
            tracing::warn!(
                "Serving without a model: /analyze will return 503 until the \
                 model is installed and the server restarted"
            );
            None
        }
    }
}

/// Start the server on `port`, binding all interfaces.
pub async fn run(config: Config, port: u16) -> anyhow::Result<()> {
    let state = AppState {
        analyzer: load_analyzer(&config),
    };

    let app = build_router(state, &config.server.allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Roastlens v{} listening on {}", roastlens_core::VERSION, addr);

    axum::serve(listener, app).await?;

    Ok(())
}
