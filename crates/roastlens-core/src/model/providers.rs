//! ONNX Runtime session construction and execution provider selection.
//!
//! The device decision is made once per session at load time: register the
//! CUDA provider when it is compiled in and reports itself available,
//! otherwise stay on the CPU provider.

use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;

use crate::error::ModelError;

/// Build a session for `model_path` with the best available provider.
pub fn create_session(model_path: &Path) -> Result<Session, ModelError> {
    let mut builder = Session::builder().map_err(|e| ModelError::Session {
        path: model_path.to_path_buf(),
        message: format!("Failed to create session builder: {e}"),
    })?;

    register_best(&mut builder);

    builder
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| ModelError::Session {
            path: model_path.to_path_buf(),
            message: format!("Failed to set optimization level: {e}"),
        })?
        .commit_from_file(model_path)
        .map_err(|e| ModelError::Session {
            path: model_path.to_path_buf(),
            message: format!("Failed to load ONNX model: {e}"),
        })
}

fn register_best(builder: &mut ort::session::builder::SessionBuilder) {
    if try_cuda(builder) {
        return;
    }
    tracing::info!("Using CPU execution provider");
}

#[cfg(feature = "cuda")]
fn try_cuda(builder: &mut ort::session::builder::SessionBuilder) -> bool {
    use ort::ep::{ExecutionProvider, CUDA};

    let provider = CUDA::default();
    if !provider.is_available().unwrap_or(false) {
        tracing::debug!("CUDA execution provider not available");
        return false;
    }

    match provider.register(builder) {
        Ok(_) => {
            tracing::info!("Using CUDA execution provider");
            true
        }
        Err(e) => {
            tracing::debug!("CUDA registration failed: {e}");
            false
        }
    }
}

#[cfg(not(feature = "cuda"))]
fn try_cuda(_builder: &mut ort::session::builder::SessionBuilder) -> bool {
    false
}
