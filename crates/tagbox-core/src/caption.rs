//! Caption token counting.
//!
//! Training pipelines cap captions at a fixed token budget; the editor
//! surfaces how much of it the current tags consume.

use std::path::Path;

use tokenizers::Tokenizer;

use crate::error::ModelError;

/// Token budget for a caption.
pub const MAX_TOKEN_COUNT: usize = 75;

/// Counts caption tokens with a local tokenizer file.
pub struct CaptionCounter {
    tokenizer: Tokenizer,
}

impl CaptionCounter {
    /// Load a `tokenizer.json` file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| ModelError::Load {
            path: path.to_path_buf(),
            message: format!("Failed to load tokenizer: {e}"),
        })?;
        Ok(Self { tokenizer })
    }

    /// Count the tokens in the caption built by joining tags with the
    /// separator.
    ///
    /// The start- and end-of-text markers are not charged to the caption.
    pub fn count(&self, tags: &[String], separator: &str) -> Result<usize, ModelError> {
        let caption = tags.join(separator);
        let encoding = self
            .tokenizer
            .encode(caption, true)
            .map_err(|e| ModelError::Inference {
                message: format!("Tokenization failed: {e}"),
            })?;
        Ok(encoding.get_ids().len().saturating_sub(2))
    }
}
