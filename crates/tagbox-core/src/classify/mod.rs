//! Tag classification via a locally-hosted text model.
//!
//! A single classification is one generation call: the tag is embedded in
//! a fixed prompt, the decoded output is searched for a category keyword,
//! and tags the model does not settle fall back to surface-form
//! heuristics. Decoding is beam search with no sampling, so the same tag
//! classifies the same way across calls.

pub mod fallback;
mod generator;

pub use generator::{GenerationOptions, LocalGenerator, TextGenerator};

use crate::config::ClassifierConfig;
use crate::error::ModelError;
use crate::types::{Category, TagSet};

/// Classifies free-text tags into semantic categories.
pub struct TagClassifier {
    generator: Box<dyn TextGenerator>,
    options: GenerationOptions,
}

/// Outcome of sorting a batch of tags.
#[derive(Debug, Default)]
pub struct SortReport {
    /// Tags bucketed by category, in input order
    pub tags: TagSet,

    /// Tags whose classification failed, with the error that skipped them
    pub skipped: Vec<(String, ModelError)>,
}

impl TagClassifier {
    /// Build a classifier over an arbitrary generation backend.
    pub fn new(generator: Box<dyn TextGenerator>, options: GenerationOptions) -> Self {
        Self { generator, options }
    }

    /// Build a classifier against the configured local endpoint.
    ///
    /// A backend that is down surfaces at construction, not on the first
    /// tag.
    pub async fn connect(config: &ClassifierConfig) -> Result<Self, ModelError> {
        let generator = LocalGenerator::from_config(config);
        if !generator.is_available().await {
            return Err(ModelError::Unavailable {
                endpoint: generator.endpoint().to_string(),
            });
        }
        tracing::info!(
            "Connected to {} at {}",
            config.model,
            generator.endpoint()
        );
        Ok(Self::new(
            Box::new(generator),
            GenerationOptions::from_config(config),
        ))
    }

    /// Classify a single tag.
    ///
    /// The decoded output is searched for a category keyword in priority
    /// order CHARACTER, SETTING, ACTION; an output matching none of them
    /// falls through to the heuristic fallback, so every successful
    /// generation yields a category.
    pub async fn classify(&self, tag: &str) -> Result<Category, ModelError> {
        let prompt = classification_prompt(tag);
        let response = self.generator.generate(&prompt, &self.options).await?;
        let category = match match_category(&response) {
            Some(category) => category,
            None => {
                let category = fallback::classify(tag);
                tracing::debug!(
                    "Model output {response:?} matched no category; fallback classified \
                     {tag:?} as {category}"
                );
                category
            }
        };
        tracing::debug!("Classified {tag:?} as {category}");
        Ok(category)
    }

    /// Classify a batch of tags into a tag set.
    ///
    /// A failing tag is skipped and reported; the batch always completes.
    pub async fn sort_tags(&self, tags: &[String]) -> SortReport {
        let mut report = SortReport::default();
        for tag in tags {
            match self.classify(tag).await {
                Ok(category) => report.tags.category_mut(category).push(tag.clone()),
                Err(e) => {
                    tracing::warn!("Skipping tag {tag:?}: {e}");
                    report.skipped.push((tag.clone(), e));
                }
            }
        }
        report
    }
}

/// The classification prompt for a single tag.
fn classification_prompt(tag: &str) -> String {
    format!(
        "Task: Classify the word into one category.\n\
         \n\
         Word to classify: {tag}\n\
         \n\
         Categories and rules:\n\
         1. CHARACTER: living beings (examples: human, dog, alien, warrior)\n\
         2. SETTING: places or objects (examples: mountain, motorcycle, house, castle)\n\
         3. ACTION: verbs or activities (examples: running, jumping, fighting, explore)\n\
         \n\
         Choose exactly one category: CHARACTER, SETTING, or ACTION.\n\
         Output only the category name."
    )
}

/// Find the first category keyword in the decoded output.
fn match_category(response: &str) -> Option<Category> {
    let upper = response.to_uppercase();
    if upper.contains("CHARACTER") {
        Some(Category::Character)
    } else if upper.contains("SETTING") {
        Some(Category::Setting)
    } else if upper.contains("ACTION") {
        Some(Category::Action)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Test backend that always returns the same text.
    struct FixedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            _prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, ModelError> {
            Ok(self.0.to_string())
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    /// Test backend that fails whenever the prompt mentions a marker tag.
    struct FlakyGenerator {
        failing_tag: &'static str,
        response: &'static str,
    }

    #[async_trait]
    impl TextGenerator for FlakyGenerator {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, ModelError> {
            if prompt.contains(self.failing_tag) {
                return Err(ModelError::Inference {
                    message: "simulated failure".to_string(),
                });
            }
            Ok(self.response.to_string())
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    fn classifier(generator: impl TextGenerator + 'static) -> TagClassifier {
        TagClassifier::new(Box::new(generator), GenerationOptions::default())
    }

    #[test]
    fn test_match_category_priority() {
        // CHARACTER outranks the other keywords when several appear.
        assert_eq!(
            match_category("CHARACTER or maybe SETTING"),
            Some(Category::Character)
        );
        assert_eq!(match_category("the setting."), Some(Category::Setting));
        assert_eq!(match_category("Action!"), Some(Category::Action));
        assert_eq!(match_category("no idea"), None);
    }

    #[tokio::test]
    async fn test_classify_uses_model_keyword() {
        let classifier = classifier(FixedGenerator("character"));
        let category = classifier.classify("warrior").await.unwrap();
        assert_eq!(category, Category::Character);
    }

    #[tokio::test]
    async fn test_classify_is_deterministic() {
        let classifier = classifier(FixedGenerator("SETTING"));
        for _ in 0..3 {
            assert_eq!(
                classifier.classify("castle").await.unwrap(),
                Category::Setting
            );
        }
    }

    #[tokio::test]
    async fn test_unmatched_output_falls_back() {
        let classifier = classifier(FixedGenerator("???"));
        assert_eq!(
            classifier.classify("running").await.unwrap(),
            Category::Action
        );
        assert_eq!(
            classifier.classify("woman").await.unwrap(),
            Category::Character
        );
        assert_eq!(
            classifier.classify("castle").await.unwrap(),
            Category::Setting
        );
    }

    #[tokio::test]
    async fn test_sort_tags_buckets_in_input_order() {
        let classifier = classifier(FixedGenerator("garbage"));
        let tags = vec![
            "running".to_string(),
            "castle".to_string(),
            "woman".to_string(),
            "jumping".to_string(),
        ];
        let report = classifier.sort_tags(&tags).await;
        assert_eq!(report.tags.actions, vec!["running", "jumping"]);
        assert_eq!(report.tags.settings, vec!["castle"]);
        assert_eq!(report.tags.characters, vec!["woman"]);
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_sort_tags_skips_failures_without_aborting() {
        let classifier = classifier(FlakyGenerator {
            failing_tag: "cursed",
            response: "SETTING",
        });
        let tags = vec![
            "castle".to_string(),
            "cursed".to_string(),
            "garden".to_string(),
        ];
        let report = classifier.sort_tags(&tags).await;
        assert_eq!(report.tags.settings, vec!["castle", "garden"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "cursed");
    }
}
