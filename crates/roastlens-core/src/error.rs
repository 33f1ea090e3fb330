//! Error types for the Roastlens analysis service.
//!
//! Failure kinds are typed so callers can map them onto distinct HTTP
//! conditions without string-matching messages: bad uploads, inference
//! failures, and model-load failures are separate enums.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Roastlens operations.
#[derive(Error, Debug)]
pub enum RoastlensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model loading errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Per-request analysis errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Startup model-loading errors.
///
/// These are logged once at startup; the server keeps running without an
/// analyzer and requests fail with the unavailable condition instead.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A required model file is missing from the model directory
    #[error("Model file not found: {path}. Run `roastlens models download` first.")]
    FileNotFound { path: PathBuf },

    /// ONNX Runtime session construction failed
    #[error("Failed to initialize ONNX session for {path}: {message}")]
    Session { path: PathBuf, message: String },

    /// Tokenizer file could not be loaded or parsed
    #[error("Failed to load tokenizer: {message}")]
    Tokenizer { message: String },
}

/// Per-request analysis errors.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Uploaded bytes could not be decoded as an image
    #[error("Invalid image file: {0}")]
    BadImage(String),

    /// Preprocessing or the forward pass failed
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Convenience type alias for Roastlens results.
pub type Result<T> = std::result::Result<T, RoastlensError>;
