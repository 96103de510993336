//! WD tagger: multi-label tag probabilities for images.
//!
//! Wraps an ONNX image classifier that scores a fixed tag vocabulary
//! against an image, plus the filtering and ranking applied to its raw
//! probabilities.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tagbox_core::wd::WdTagger;
//!
//! let tagger = WdTagger::load(&config.model_dir(), &config.wd_tagger)?;
//! let tags = tagger.tag_file(&path, &config.wd_tagger)?;
//! ```

pub mod exclusion;
mod preprocess;
mod vocabulary;

pub use preprocess::preprocess;
pub use vocabulary::{TagKind, VocabTag, WdVocabulary, KAOMOJIS};

use std::path::Path;
use std::sync::Mutex;

use image::DynamicImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::config::WdTaggerConfig;
use crate::error::ModelError;
use crate::types::ScoredTag;

/// The tagger ONNX model filename.
const MODEL_FILENAME: &str = "model.onnx";

/// The vocabulary CSV filename.
const VOCABULARY_FILENAME: &str = "selected_tags.csv";

/// Wraps an ONNX Runtime session for WD tag scoring.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct WdTagger {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    vocabulary: WdVocabulary,
    input_size: u32,
}

impl WdTagger {
    /// Load the tagger from `{model_dir}/{model_name}/`.
    ///
    /// Expects `model.onnx` and `selected_tags.csv` side by side.
    pub fn load(model_dir: &Path, config: &WdTaggerConfig) -> Result<Self, ModelError> {
        let variant_dir = model_dir.join(&config.model);
        let model_path = variant_dir.join(MODEL_FILENAME);
        if !model_path.exists() {
            return Err(ModelError::NotFound {
                path: model_path,
                message: "Run `tagbox models download` first".to_string(),
            });
        }
        let vocabulary_path = variant_dir.join(VOCABULARY_FILENAME);
        if !vocabulary_path.exists() {
            return Err(ModelError::NotFound {
                path: vocabulary_path,
                message: "Run `tagbox models download` first".to_string(),
            });
        }

        tracing::info!("Loading WD tagger from {:?}", model_path);
        let session = Session::builder()
            .map_err(|e| ModelError::Load {
                path: model_path.clone(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(&model_path)
            .map_err(|e| ModelError::Load {
                path: model_path.clone(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input".to_string());

        let vocabulary = WdVocabulary::load(&vocabulary_path)?;
        tracing::info!("WD tagger loaded ({} vocabulary tags)", vocabulary.len());

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            vocabulary,
            input_size: config.input_size,
        })
    }

    /// The square input dimension this tagger resizes to.
    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    /// The loaded vocabulary.
    pub fn vocabulary(&self) -> &WdVocabulary {
        &self.vocabulary
    }

    /// Preprocess an image into the model's input tensor.
    pub fn prepare(&self, image: &DynamicImage) -> Array4<f32> {
        preprocess(image, self.input_size)
    }

    /// Score a prepared tensor against the vocabulary.
    pub fn generate_tags(
        &self,
        tensor: &Array4<f32>,
        config: &WdTaggerConfig,
    ) -> Result<Vec<ScoredTag>, ModelError> {
        let probabilities = self.run(tensor)?;
        if probabilities.len() != self.vocabulary.len() {
            return Err(ModelError::Inference {
                message: format!(
                    "Model produced {} probabilities for {} vocabulary tags",
                    probabilities.len(),
                    self.vocabulary.len()
                ),
            });
        }
        Ok(filter_and_rank(
            self.vocabulary.tags(),
            &probabilities,
            config,
        ))
    }

    /// Decode a file, preprocess it, and score it in one step.
    pub fn tag_file(
        &self,
        path: &Path,
        config: &WdTaggerConfig,
    ) -> Result<Vec<ScoredTag>, ModelError> {
        let image = image::open(path).map_err(|e| ModelError::Input {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let tensor = self.prepare(&image);
        self.generate_tags(&tensor, config)
    }

    fn run(&self, tensor: &Array4<f32>) -> Result<Vec<f32>, ModelError> {
        // Convert ndarray to (shape, flat_data) for ort.
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = tensor.iter().copied().collect();

        let input_value =
            Value::from_array((shape, flat_data)).map_err(|e| ModelError::Inference {
                message: format!("Failed to create input tensor: {e}"),
            })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self.session.lock().map_err(|e| ModelError::Inference {
            message: format!("Session lock poisoned: {e}"),
        })?;

        let outputs = session.run(inputs).map_err(|e| ModelError::Inference {
            message: format!("ONNX inference failed: {e}"),
        })?;

        let (name, value) = outputs.iter().next().ok_or_else(|| ModelError::Inference {
            message: "Model produced no outputs".to_string(),
        })?;

        let (_, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference {
                message: format!("Failed to extract {name} tensor: {e}"),
            })?;

        Ok(data.to_vec())
    }
}

/// Filter and rank raw per-tag probabilities.
///
/// Rating tags are dropped, then tags below the probability floor or in
/// the exclusion set. The sort is stable so equal probabilities keep
/// vocabulary order, and the result is truncated to `max_tags`.
pub fn filter_and_rank(
    tags: &[VocabTag],
    probabilities: &[f32],
    config: &WdTaggerConfig,
) -> Vec<ScoredTag> {
    let excluded = exclusion::parse(&config.tags_to_exclude);

    let mut scored: Vec<ScoredTag> = tags
        .iter()
        .zip(probabilities.iter())
        .filter(|(tag, _)| tag.kind != Some(TagKind::Rating))
        .filter(|(tag, probability)| {
            **probability >= config.min_probability && !excluded.contains(&tag.name)
        })
        .map(|(tag, probability)| ScoredTag {
            name: tag.name.clone(),
            probability: *probability,
        })
        .collect();

    scored.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    scored.truncate(config.max_tags);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(entries: &[(&str, Option<TagKind>)]) -> Vec<VocabTag> {
        entries
            .iter()
            .map(|(name, kind)| VocabTag {
                name: name.to_string(),
                kind: *kind,
            })
            .collect()
    }

    fn config(min_probability: f32, max_tags: usize, exclude: &str) -> WdTaggerConfig {
        WdTaggerConfig {
            min_probability,
            max_tags,
            tags_to_exclude: exclude.to_string(),
            ..WdTaggerConfig::default()
        }
    }

    #[test]
    fn test_threshold_and_truncation() {
        let tags = vocab(&[
            ("a", Some(TagKind::General)),
            ("b", Some(TagKind::General)),
            ("c", Some(TagKind::General)),
        ]);
        let result = filter_and_rank(&tags, &[0.9, 0.05, 0.5], &config(0.1, 1, ""));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "a");
        assert_eq!(result[0].probability, 0.9);
    }

    #[test]
    fn test_rating_tags_dropped() {
        let tags = vocab(&[
            ("general", Some(TagKind::Rating)),
            ("beach", Some(TagKind::General)),
        ]);
        let result = filter_and_rank(&tags, &[0.99, 0.8], &config(0.1, 10, ""));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "beach");
    }

    #[test]
    fn test_unknown_kind_treated_like_general() {
        let tags = vocab(&[("artist tag", None)]);
        let result = filter_and_rank(&tags, &[0.8], &config(0.1, 10, ""));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_exclusion_set_applied() {
        let tags = vocab(&[
            ("long hair", Some(TagKind::General)),
            ("smile", Some(TagKind::General)),
        ]);
        let result = filter_and_rank(&tags, &[0.9, 0.9], &config(0.1, 10, "long hair"));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "smile");
    }

    #[test]
    fn test_sorted_descending() {
        let tags = vocab(&[
            ("low", Some(TagKind::General)),
            ("high", Some(TagKind::General)),
            ("mid", Some(TagKind::General)),
        ]);
        let result = filter_and_rank(&tags, &[0.2, 0.9, 0.5], &config(0.1, 10, ""));
        let names: Vec<&str> = result.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_equal_probabilities_keep_vocabulary_order() {
        let tags = vocab(&[
            ("first", Some(TagKind::General)),
            ("second", Some(TagKind::General)),
            ("third", Some(TagKind::General)),
        ]);
        let result = filter_and_rank(&tags, &[0.5, 0.5, 0.5], &config(0.1, 10, ""));
        let names: Vec<&str> = result.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_nothing_passes_the_filter() {
        let tags = vocab(&[("a", Some(TagKind::General))]);
        let result = filter_and_rank(&tags, &[0.05], &config(0.1, 10, ""));
        assert!(result.is_empty());
    }
}
