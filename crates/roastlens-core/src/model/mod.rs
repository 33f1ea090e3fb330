//! CLIP model loading and image-to-caption scoring.
//!
//! This module owns the pretrained checkpoint: a vision encoder session, a
//! text encoder session, and the paired tokenizer, all running locally via
//! ONNX Runtime. Loading happens once at startup; the engine is immutable
//! afterwards and shared read-only by all requests.

pub(crate) mod preprocess;
mod providers;
mod text;
mod vision;

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::config::ModelConfig;
use crate::error::{AnalysisError, ModelError};
use crate::math;

use self::preprocess::preprocess;
use self::text::TextEncoder;
use self::vision::VisionEncoder;

/// The vision encoder ONNX model filename.
const VISUAL_MODEL_FILENAME: &str = "visual.onnx";

/// The text encoder ONNX model filename.
const TEXT_MODEL_FILENAME: &str = "text_model.onnx";

/// The tokenizer filename.
const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// CLIP's exported temperature (exp of the learned logit scale).
///
/// Cosine similarities are multiplied by this before the softmax; without it
/// the probabilities over candidates are nearly uniform.
const LOGIT_SCALE: f32 = 100.0;

/// Engine pairing the CLIP vision and text encoders.
pub struct ClipEngine {
    vision: VisionEncoder,
    text: TextEncoder,
    image_size: u32,
}

impl ClipEngine {
    /// Load the checkpoint from the model directory.
    ///
    /// Expects `visual.onnx`, `text_model.onnx`, and `tokenizer.json` under
    /// `{model_dir}/{model_name}/`.
    pub fn load(config: &ModelConfig, model_dir: &Path) -> Result<Self, ModelError> {
        let checkpoint_dir = model_dir.join(&config.name);

        let visual_path = checkpoint_dir.join(VISUAL_MODEL_FILENAME);
        let text_path = checkpoint_dir.join(TEXT_MODEL_FILENAME);
        let tokenizer_path = checkpoint_dir.join(TOKENIZER_FILENAME);

        for path in [&visual_path, &text_path, &tokenizer_path] {
            if !path.exists() {
                return Err(ModelError::FileNotFound { path: path.clone() });
            }
        }

        tracing::info!("Loading CLIP checkpoint from {:?}", checkpoint_dir);
        let vision = VisionEncoder::load(&visual_path)?;
        let text = TextEncoder::load(&text_path, &tokenizer_path)?;
        tracing::info!("CLIP checkpoint loaded");

        Ok(Self {
            vision,
            text,
            image_size: config.image_size,
        })
    }

    /// Score an image against candidate captions.
    ///
    /// Preprocesses the image and captions, runs both encoders, and returns
    /// one probability per caption (softmax over temperature-scaled cosine
    /// similarities, in caption order).
    pub fn classify(
        &self,
        image: &RgbImage,
        captions: &[&str],
    ) -> Result<Vec<f32>, AnalysisError> {
        let tensor = preprocess(image, self.image_size);
        let image_embedding = self.vision.embed(&tensor)?;

        let prompts: Vec<String> = captions.iter().map(|c| c.to_string()).collect();
        let caption_embeddings = self.text.encode_batch(&prompts)?;

        if caption_embeddings.len() != captions.len() {
            return Err(AnalysisError::Inference(format!(
                "Expected {} caption embeddings, got {}",
                captions.len(),
                caption_embeddings.len()
            )));
        }

        // Both sides are L2-normalized, so dot product = cosine similarity.
        let mut scores: Vec<f32> = caption_embeddings
            .iter()
            .map(|caption_embedding| {
                let cosine: f32 = image_embedding
                    .iter()
                    .zip(caption_embedding.iter())
                    .map(|(a, b)| a * b)
                    .sum();
                LOGIT_SCALE * cosine
            })
            .collect();

        math::softmax_in_place(&mut scores);
        Ok(scores)
    }

    /// Check whether all checkpoint files exist on disk.
    pub fn model_exists(config: &ModelConfig, model_dir: &Path) -> bool {
        let checkpoint_dir = model_dir.join(&config.name);
        [VISUAL_MODEL_FILENAME, TEXT_MODEL_FILENAME, TOKENIZER_FILENAME]
            .iter()
            .all(|f| checkpoint_dir.join(f).exists())
    }

    /// Get the expected checkpoint directory path.
    pub fn checkpoint_dir(config: &ModelConfig, model_dir: &Path) -> PathBuf {
        model_dir.join(&config.name)
    }
}
