//! Text generation backend for tag classification.
//!
//! Defines the interface the classifier calls plus the provider for a
//! seq2seq model served locally over HTTP.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ClassifierConfig;
use crate::error::ModelError;

/// Decoding parameters for a generation call.
///
/// Defaults are narrow beam search with no sampling, so repeated calls
/// with the same prompt decode identically.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Maximum tokens to decode
    pub max_new_tokens: u32,
    /// Beam width
    pub num_beams: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Whether to sample instead of decoding greedily
    pub sample: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_new_tokens: 10,
            num_beams: 2,
            temperature: 0.3,
            sample: false,
        }
    }
}

impl GenerationOptions {
    /// Build options from the classifier config section.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            num_beams: config.num_beams,
            temperature: config.temperature,
            sample: false,
        }
    }
}

/// Trait for text generation backends.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the classifier holds a `Box<dyn TextGenerator>`).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Check whether the backend is reachable.
    async fn is_available(&self) -> bool;

    /// Generate a completion for the prompt.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ModelError>;

    /// Per-request timeout.
    fn timeout(&self) -> Duration;
}

/// Provider for a locally-served seq2seq model speaking the
/// text-generation-inference API.
///
/// No authentication required; the server runs on this machine.
pub struct LocalGenerator {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

impl LocalGenerator {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(&config.endpoint, &config.model)
    }

    /// The endpoint this provider talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// `/generate` request body.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    num_beams: u32,
    temperature: f32,
    do_sample: bool,
}

/// `/generate` response body.
#[derive(Deserialize)]
struct GenerateResponse {
    generated_text: String,
}

#[async_trait]
impl TextGenerator for LocalGenerator {
    fn name(&self) -> &str {
        "local"
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/health", self.endpoint);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ModelError> {
        let url = format!("{}/generate", self.endpoint);

        let body = GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                max_new_tokens: options.max_new_tokens,
                num_beams: options.num_beams,
                temperature: options.temperature,
                do_sample: options.sample,
            },
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| ModelError::Generation {
                message: format!("Request to {} failed: {e}", self.model),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ModelError::Generation {
                message: format!("Generation HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let generated: GenerateResponse =
            resp.json().await.map_err(|e| ModelError::Generation {
                message: format!("Failed to parse generation response: {e}"),
                status_code: None,
            })?;

        let text = generated.generated_text.trim().to_string();
        if text.is_empty() {
            return Err(ModelError::Generation {
                message: "Model returned an empty generation".to_string(),
                status_code: None,
            });
        }

        Ok(text)
    }

    fn timeout(&self) -> Duration {
        // Seq2seq models running on CPU can be slow for the first call
        Duration::from_secs(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_deterministic() {
        let options = GenerationOptions::default();
        assert!(!options.sample);
        assert_eq!(options.num_beams, 2);
        assert_eq!(options.max_new_tokens, 10);
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let generator = LocalGenerator::new("http://localhost:8085/", "flan-t5");
        assert_eq!(generator.endpoint(), "http://localhost:8085");
    }
}
