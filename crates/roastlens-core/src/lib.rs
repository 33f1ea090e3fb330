//! Roastlens Core - image analysis behind the roast service.
//!
//! The library turns an uploaded image into a localized "roast prompt"
//! sentence by scoring the image against a fixed candidate caption list with
//! a pretrained CLIP embedding model:
//!
//! ```text
//! Image bytes → Decode → Embed (CLIP) → Score vs captions → Argmax → Template
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use roastlens_core::{Analyzer, CaptionAnalyzer, ClipEngine, Config};
//!
//! let config = Config::load()?;
//! let engine = ClipEngine::load(&config.model, &config.model_dir())?;
//! let analyzer = Analyzer::new(engine);
//!
//! let sentence = analyzer.analyze(&image_bytes, "en")?;
//! ```
//!
//! The HTTP surface lives in the `roastlens` binary crate; this crate has no
//! web-framework dependency.

// Module declarations
pub mod analyzer;
pub mod captions;
pub mod config;
pub mod decode;
pub mod error;
pub mod math;
pub mod model;

// Re-exports for convenient access
pub use analyzer::{Analyzer, CaptionAnalyzer};
pub use captions::{CaptionSet, Language, CAPTION_COUNT};
pub use config::Config;
pub use error::{AnalysisError, ConfigError, ModelError, Result, RoastlensError};
pub use model::ClipEngine;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
