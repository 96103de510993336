//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where models are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.tagbox/models"),
        }
    }
}

/// Image library settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Supported image extensions
    pub supported_formats: Vec<String>,

    /// Separator between free-text tags in display and sidecar parsing
    pub tag_separator: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "bmp".to_string(),
                "gif".to_string(),
                "tiff".to_string(),
            ],
            tag_separator: ",".to_string(),
        }
    }
}

/// Tag classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Endpoint of the local text-generation server
    pub endpoint: String,

    /// Model identifier, for logging and request routing
    pub model: String,

    /// Maximum tokens to decode per classification
    pub max_new_tokens: u32,

    /// Beam width for deterministic decoding
    pub num_beams: u32,

    /// Sampling temperature (inert while sampling is disabled)
    pub temperature: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8085".to_string(),
            model: "google/flan-t5-large".to_string(),
            max_new_tokens: 10,
            num_beams: 2,
            temperature: 0.3,
        }
    }
}

/// WD tagger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WdTaggerConfig {
    /// Model variant name (directory under the model dir)
    pub model: String,

    /// Square input dimension of the model variant.
    /// All shipped WD v1.4 variants take 448.
    pub input_size: u32,

    /// Minimum probability for a tag to be kept
    pub min_probability: f32,

    /// Maximum number of tags per image
    pub max_tags: usize,

    /// Comma-separated tags to exclude; a literal comma is escaped as `\,`
    pub tags_to_exclude: String,
}

impl Default for WdTaggerConfig {
    fn default() -> Self {
        Self {
            model: "wd-v1-4-moat-tagger-v2".to_string(),
            input_size: 448,
            min_probability: 0.35,
            max_tags: 30,
            tags_to_exclude: String::new(),
        }
    }
}

/// Clipping tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Minimum selection edge in display pixels
    pub min_selection: u32,

    /// Copy the source image's sidecar files next to each new clip
    pub copy_sidecars: bool,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            min_selection: 10,
            copy_sidecars: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
