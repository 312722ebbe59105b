//! Provider binding traits for API-backed embedding models.
//!
//! A binding supplies the three things `ApiEmbeddingModel` cannot know on
//! its own: how to build a network client, how to tokenize text for the
//! provider's models, and which provider failures are worth retrying.

use std::future::Future;

use secrecy::SecretString;

use embench_types::error::{ProviderError, ProviderErrorKind};

/// Encodes text into the provider's token ids.
pub trait Tokenizer: Send + Sync {
    /// Encode `text` without rejecting special-token-like substrings.
    ///
    /// Benchmark text is arbitrary; a literal `<|endoftext|>` inside a
    /// document must be encoded as ordinary text, never refused.
    fn encode(&self, text: &str) -> Vec<u32>;
}

/// Network client for a provider's embedding endpoint.
pub trait EmbeddingClient: Send + Sync {
    /// Submit pre-tokenized inputs in one batched call.
    ///
    /// Returns one vector per input, in input order.
    fn create_embeddings(
        &self,
        model: &str,
        inputs: Vec<Vec<u32>>,
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, ProviderError>> + Send;
}

/// Everything provider-specific about an API-backed embedding model.
///
/// `build_client` and `build_tokenizer` are called lazily, once per model
/// instance, on the first non-empty `embed` call. The tokenizer is built on
/// the blocking pool from a clone of the binding.
pub trait ProviderBinding: Clone + Send + Sync + 'static {
    type Client: EmbeddingClient;
    type Tokenizer: Tokenizer + 'static;

    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    fn build_client(&self, api_key: Option<&SecretString>) -> Result<Self::Client, ProviderError>;

    fn build_tokenizer(&self) -> Result<Self::Tokenizer, ProviderError>;

    /// Error kinds this provider uses to signal client-side rate limiting.
    fn rate_limit_errors(&self) -> &[ProviderErrorKind] {
        &[ProviderErrorKind::RateLimited]
    }

    /// Error kinds this provider uses to signal transient service failure.
    fn service_errors(&self) -> &[ProviderErrorKind] {
        &[ProviderErrorKind::ServerError]
    }
}
