//! EmbeddingModel trait definition.

use std::future::Future;

use secrecy::SecretString;

use embench_types::config::{HarnessConfig, RetryConfig};
use embench_types::error::EmbeddingError;
use embench_types::model::ModelMeta;

/// Trait for converting batches of text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations must return exactly one vector per input, in input order:
/// `output[i]` is the embedding of `texts[i]`.
pub trait EmbeddingModel: Send + Sync {
    /// Static descriptor this model was built from.
    fn metadata(&self) -> &ModelMeta;

    /// Embed a batch of texts.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send;

    /// Provider-side model name (e.g., "text-embedding-3-small").
    fn model_name(&self) -> &str {
        &self.metadata().model_name
    }

    /// Dimensionality of the output vectors.
    fn dimension(&self) -> usize {
        self.metadata().embd_dim
    }

    /// Token limit applied to each input, if any.
    fn max_tokens(&self) -> Option<usize> {
        self.metadata().max_tokens
    }
}

/// Construction-time options shared by all embedding models.
///
/// `extra` is an open passthrough: provider-specific settings (base URL,
/// organization, ...) are forwarded verbatim to the binding that reads them.
#[derive(Debug, Clone, Default)]
pub struct ModelOptions {
    pub api_key: Option<SecretString>,
    /// Overrides `retry.num_retries` when set.
    pub num_retries: Option<u32>,
    pub retry: Option<RetryConfig>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModelOptions {
    /// Options carrying the harness-wide retry configuration.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            retry: Some(config.retry),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub fn with_num_retries(mut self, num_retries: u32) -> Self {
        self.num_retries = Some(num_retries);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// String-valued passthrough option, if present.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// Effective retry configuration: `retry` (or defaults) with
    /// `num_retries` applied on top.
    pub fn retry_config(&self) -> RetryConfig {
        let mut config = self.retry.unwrap_or_default();
        if let Some(num_retries) = self.num_retries {
            config.num_retries = num_retries;
        }
        config
    }
}
