//! Error types for the tagbox tagging toolkit.
//!
//! Errors are grouped by concern so that every failure carries the context
//! (file path, tag value, endpoint) needed for user display.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for tagbox operations.
#[derive(Error, Debug)]
pub enum TagboxError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model loading or inference errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Sidecar file read/write errors
    #[error("Sidecar error: {0}")]
    Sidecar(#[from] SidecarError),

    /// Clipping tool errors
    #[error("Clip error: {0}")]
    Clip(#[from] ClipError),

    /// Tag entry and vocabulary parse errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// An image not present in the loaded session
    #[error("Image not found in session: {0}")]
    ImageNotFound(PathBuf),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// A required credential is absent from the environment
    #[error("Missing credential: set the {var} environment variable")]
    MissingCredential { var: String },
}

/// Errors from loading or invoking a model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Required model files are not installed
    #[error("Model not found at {path}: {message}")]
    NotFound { path: PathBuf, message: String },

    /// Model files exist but could not be loaded
    #[error("Failed to load model from {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// The model backend did not answer its availability probe
    #[error("Model endpoint {endpoint} is not reachable")]
    Unavailable { endpoint: String },

    /// An input image could not be decoded for inference
    #[error("Failed to decode {path}: {message}")]
    Input { path: PathBuf, message: String },

    /// Inference failed after the model was loaded
    #[error("Inference failed: {message}")]
    Inference { message: String },

    /// A text generation call failed
    #[error("Text generation failed: {message}")]
    Generation {
        message: String,
        status_code: Option<u16>,
    },
}

/// Sidecar file read/write errors.
#[derive(Error, Debug)]
pub enum SidecarError {
    /// Failed to read a sidecar file
    #[error("Failed to read sidecar {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a sidecar file
    #[error("Failed to write sidecar {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sidecar file exists but does not parse
    #[error("Malformed sidecar {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// Clipping tool errors.
#[derive(Error, Debug)]
pub enum ClipError {
    /// The selection is below the minimum size
    #[error("Selection too small: {width}x{height} (minimum {min}x{min})")]
    SelectionTooSmall { width: u32, height: u32, min: u32 },

    /// The source image could not be decoded
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// The mapped selection does not overlap the image
    #[error("Selection lies outside the image bounds of {path}")]
    OutsideImage { path: PathBuf },

    /// The cropped image could not be written
    #[error("Failed to save clip {path}: {message}")]
    Save { path: PathBuf, message: String },
}

/// Decode/parse errors on tag entries and vocabulary rows.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A prefix-encoded tag entry is not `category:value`
    #[error("Malformed tag entry {entry:?}: expected \"category:value\"")]
    TagEntry { entry: String },

    /// The category prefix is not one of character/setting/action
    #[error("Unknown tag category {value:?}")]
    Category { value: String },

    /// A vocabulary CSV row is unusable
    #[error("Malformed vocabulary row {line}: {message}")]
    VocabularyRow { line: usize, message: String },
}

/// Convenience type alias for tagbox results.
pub type Result<T> = std::result::Result<T, TagboxError>;
