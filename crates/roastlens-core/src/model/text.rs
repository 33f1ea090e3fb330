//! CLIP text encoder for embedding candidate captions.
//!
//! Loads the text ONNX model and tokenizer, encodes caption strings to
//! vectors aligned with the vision encoder's space.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;

use crate::error::{AnalysisError, ModelError};
use crate::math;

use super::providers;

/// CLIP's fixed token context length.
const CONTEXT_LENGTH: usize = 77;

/// CLIP text encoder wrapper.
///
/// Uses the same `Mutex<Session>` pattern as the vision encoder.
pub struct TextEncoder {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
}

impl TextEncoder {
    /// Load the text encoder and tokenizer from their files.
    pub fn load(model_path: &Path, tokenizer_path: &Path) -> Result<Self, ModelError> {
        let session = providers::create_session(model_path)?;

        let tokenizer =
            tokenizers::Tokenizer::from_file(tokenizer_path).map_err(|e| ModelError::Tokenizer {
                message: e.to_string(),
            })?;

        tracing::debug!(
            "Loaded text encoder (inputs: {:?}, outputs: {:?})",
            session
                .inputs()
                .iter()
                .map(|i| i.name())
                .collect::<Vec<_>>(),
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Encode a batch of caption strings to normalized embeddings.
    ///
    /// Returns one embedding vector per input, in input order.
    pub fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        let batch_size = texts.len();
        if batch_size == 0 {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| AnalysisError::Inference(format!("Tokenization failed: {e}")))?;

        // Build flat input_ids and attention_mask tensors at the fixed
        // context length; positions past each caption stay zero-masked.
        let mut input_ids = vec![0i64; batch_size * CONTEXT_LENGTH];
        let mut attention_mask = vec![0i64; batch_size * CONTEXT_LENGTH];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            for (j, &id) in ids.iter().take(CONTEXT_LENGTH).enumerate() {
                input_ids[i * CONTEXT_LENGTH + j] = id as i64;
                attention_mask[i * CONTEXT_LENGTH + j] = 1;
            }
        }

        let tensor_shape = vec![batch_size as i64, CONTEXT_LENGTH as i64];

        let input_ids_value =
            Value::from_array((tensor_shape.clone(), input_ids)).map_err(|e| {
                AnalysisError::Inference(format!("Failed to create input_ids tensor: {e}"))
            })?;
        let attention_mask_value =
            Value::from_array((tensor_shape, attention_mask)).map_err(|e| {
                AnalysisError::Inference(format!("Failed to create attention_mask tensor: {e}"))
            })?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| AnalysisError::Inference(format!("Text encoder lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_value,
                "attention_mask" => attention_mask_value
            ])
            .map_err(|e| AnalysisError::Inference(format!("Text encoder inference failed: {e}")))?;

        // text_embeds carries the cross-modal projection.
        let text_embeds = outputs
            .iter()
            .find(|(name, _)| *name == "text_embeds")
            .ok_or_else(|| {
                AnalysisError::Inference("Text encoder did not produce text_embeds".to_string())
            })?;

        let (shape, data) = text_embeds.1.try_extract_tensor::<f32>().map_err(|e| {
            AnalysisError::Inference(format!("Failed to extract text_embeds tensor: {e}"))
        })?;

        let embedding_dim = match shape.len() {
            2 => shape[1] as usize,
            _ => {
                return Err(AnalysisError::Inference(format!(
                    "Unexpected text_embeds shape: {shape:?}"
                )));
            }
        };

        // Split flat output into per-caption embeddings and L2-normalize.
        let embeddings: Vec<Vec<f32>> = data
            .chunks(embedding_dim)
            .take(batch_size)
            .map(math::l2_normalize)
            .collect();

        Ok(embeddings)
    }
}
