//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.library.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "library.supported_formats must not be empty".into(),
            ));
        }
        if self.library.tag_separator.is_empty() {
            return Err(ConfigError::ValidationError(
                "library.tag_separator must not be empty".into(),
            ));
        }
        if self.classifier.max_new_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "classifier.max_new_tokens must be > 0".into(),
            ));
        }
        if self.classifier.num_beams == 0 {
            return Err(ConfigError::ValidationError(
                "classifier.num_beams must be > 0".into(),
            ));
        }
        if self.classifier.temperature < 0.0 || self.classifier.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "classifier.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.wd_tagger.input_size == 0 {
            return Err(ConfigError::ValidationError(
                "wd_tagger.input_size must be > 0".into(),
            ));
        }
        if self.wd_tagger.min_probability < 0.0 || self.wd_tagger.min_probability > 1.0 {
            return Err(ConfigError::ValidationError(
                "wd_tagger.min_probability must be between 0.0 and 1.0".into(),
            ));
        }
        if self.wd_tagger.max_tags == 0 {
            return Err(ConfigError::ValidationError(
                "wd_tagger.max_tags must be > 0".into(),
            ));
        }
        if self.clip.min_selection == 0 {
            return Err(ConfigError::ValidationError(
                "clip.min_selection must be > 0".into(),
            ));
        }
        Ok(())
    }
}
