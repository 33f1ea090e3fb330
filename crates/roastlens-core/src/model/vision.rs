//! CLIP vision encoder session management and inference.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::{AnalysisError, ModelError};
use crate::math;

use super::providers;

/// Wraps an ONNX Runtime session for the CLIP vision encoder.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`; the lock also
/// serializes concurrent forward passes on the underlying device.
pub struct VisionEncoder {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
}

impl VisionEncoder {
    /// Load the vision encoder from an ONNX file.
    pub fn load(model_path: &Path) -> Result<Self, ModelError> {
        let session = providers::create_session(model_path)?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "pixel_values".to_string());

        tracing::debug!(
            "Loaded vision encoder from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    /// Run inference on a preprocessed image tensor and return the embedding.
    ///
    /// Input shape: \[1, 3, image_size, image_size\] (NCHW, CLIP-normalized).
    /// Output: L2-normalized projection from `image_embeds`.
    pub fn embed(&self, preprocessed: &Array4<f32>) -> Result<Vec<f32>, AnalysisError> {
        let shape: Vec<i64> = preprocessed.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = preprocessed.iter().copied().collect();

        let input_value = Value::from_array((shape, flat_data)).map_err(|e| {
            AnalysisError::Inference(format!("Failed to create image input tensor: {e}"))
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self
            .session
            .lock()
            .map_err(|e| AnalysisError::Inference(format!("Session lock poisoned: {e}")))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| AnalysisError::Inference(format!("Vision inference failed: {e}")))?;

        // image_embeds carries the cross-modal projection; last_hidden_state
        // is not aligned with the text space and must not be used here.
        let image_embeds = outputs
            .iter()
            .find(|(name, _)| *name == "image_embeds")
            .ok_or_else(|| {
                AnalysisError::Inference("Model did not produce image_embeds".to_string())
            })?;

        let (shape, data) = image_embeds.1.try_extract_tensor::<f32>().map_err(|e| {
            AnalysisError::Inference(format!("Failed to extract image_embeds tensor: {e}"))
        })?;

        // image_embeds is [1, dim] — take the single embedding vector.
        let mut raw = match shape.len() {
            1 => data.to_vec(),
            2 => {
                let dim = shape[1] as usize;
                data[..dim].to_vec()
            }
            _ => {
                return Err(AnalysisError::Inference(format!(
                    "Unexpected image_embeds shape: {shape:?}"
                )));
            }
        };

        math::l2_normalize_in_place(&mut raw);
        Ok(raw)
    }
}
