//! The analysis operation: image bytes in, roast sentence out.
//!
//! The analyzer is stateless across calls; the only shared state is the
//! read-only engine behind it. Each invocation decodes the upload, scores it
//! against the language's fixed captions, and renders the winner into the
//! language's template.

use image::RgbImage;

use crate::captions::{CaptionSet, Language};
use crate::decode::decode_image;
use crate::error::AnalysisError;
use crate::math;
use crate::model::ClipEngine;

/// The seam between the HTTP layer and the model handle.
///
/// The server holds `Option<Arc<dyn CaptionAnalyzer>>` — `None` when the
/// model failed to load at startup. Tests substitute a stub implementation.
pub trait CaptionAnalyzer: Send + Sync {
    /// Analyze one uploaded image against the captions for `language_tag`.
    fn analyze(&self, image_bytes: &[u8], language_tag: &str) -> Result<String, AnalysisError>;
}

/// Production analyzer backed by the CLIP engine.
pub struct Analyzer {
    engine: ClipEngine,
}

impl Analyzer {
    /// Wrap a loaded engine.
    pub fn new(engine: ClipEngine) -> Self {
        Self { engine }
    }

    /// Score a decoded image against a caption set and pick the winner.
    ///
    /// Returns the winning caption index. Ties keep the lowest index.
    fn best_caption_index(
        &self,
        image: &RgbImage,
        set: &CaptionSet,
    ) -> Result<usize, AnalysisError> {
        let probabilities = self.engine.classify(image, set.captions())?;

        math::argmax(&probabilities).ok_or_else(|| {
            AnalysisError::Inference("Classification produced no scores".to_string())
        })
    }
}

impl CaptionAnalyzer for Analyzer {
    fn analyze(&self, image_bytes: &[u8], language_tag: &str) -> Result<String, AnalysisError> {
        let image = decode_image(image_bytes)?;

        let language = Language::from_tag(language_tag);
        let set = CaptionSet::for_language(language);

        let index = self.best_caption_index(&image, set)?;
        let caption = set.captions()[index];
        tracing::debug!(?language, caption, "selected best-matching caption");

        Ok(set.render(index))
    }
}
