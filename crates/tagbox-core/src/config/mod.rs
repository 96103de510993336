//! Configuration management for tagbox.
//!
//! Configuration is loaded from a TOML file in the platform config
//! directory with sensible defaults; every section struct implements
//! `Default` and tolerates missing keys.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the hub access token for gated model
/// downloads.
pub const HUB_TOKEN_VAR: &str = "HUGGING_FACE_TOKEN";

/// Root configuration structure for tagbox.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Image library settings
    pub library: LibraryConfig,

    /// Tag classifier settings
    pub classifier: ClassifierConfig,

    /// WD tagger settings
    pub wd_tagger: WdTaggerConfig,

    /// Clipping tool settings
    pub clip: ClipConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/dev.tagbox.tagbox/config.toml
    /// - Linux: ~/.config/tagbox/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\tagbox\config\config.toml
    ///
    /// Falls back to ~/.tagbox/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "tagbox", "tagbox")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".tagbox").join("config.toml")
            })
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        let path_str = self.general.model_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Read the hub access token from the environment.
///
/// Gated model downloads cannot proceed without it.
pub fn hub_token() -> Result<String, ConfigError> {
    std::env::var(HUB_TOKEN_VAR)
        .ok()
        .filter(|token| !token.trim().is_empty())
        .ok_or(ConfigError::MissingCredential {
            var: HUB_TOKEN_VAR.to_string(),
        })
}
