//! API-backed embedding model.
//!
//! [`ApiEmbeddingModel`] turns a [`ProviderBinding`] into an
//! [`EmbeddingModel`]: it tokenizes each input, clips it to the model's token
//! limit, submits the batch in one call, and retries rate-limit and
//! transient service failures with backoff.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::OnceCell;

use embench_types::error::{EmbeddingError, ProviderError, ProviderErrorKind};
use embench_types::model::ModelMeta;

use super::model::{EmbeddingModel, ModelOptions};
use super::provider::{EmbeddingClient, ProviderBinding, Tokenizer};
use super::retry::RetryPolicy;

/// Keep at most the first `max_tokens` tokens of every input.
///
/// Returns how many inputs were clipped. Clipping is silent policy, not an
/// error. A limit of zero means "no limit" and leaves inputs untouched.
pub fn clip_tokens(inputs: &mut [Vec<u32>], max_tokens: usize) -> usize {
    if max_tokens == 0 {
        return 0;
    }
    let mut clipped = 0;
    for tokens in inputs.iter_mut() {
        if tokens.len() > max_tokens {
            tokens.truncate(max_tokens);
            clipped += 1;
        }
    }
    clipped
}

/// Embedding model served by a remote provider.
///
/// The client and tokenizer are built on first use and reused for the
/// lifetime of the instance. Concurrent first calls build them once.
///
/// # API Key Security
///
/// Does NOT derive Debug; the credential is held as a [`SecretString`] and
/// only exposed to the binding when the client is built.
pub struct ApiEmbeddingModel<B: ProviderBinding> {
    meta: Arc<ModelMeta>,
    binding: B,
    api_key: Option<SecretString>,
    retry: RetryPolicy,
    client: OnceCell<B::Client>,
    tokenizer: OnceCell<Arc<B::Tokenizer>>,
}

impl<B: ProviderBinding> ApiEmbeddingModel<B> {
    pub fn new(meta: Arc<ModelMeta>, binding: B, options: &ModelOptions) -> Self {
        Self {
            meta,
            binding,
            api_key: options.api_key.clone(),
            retry: RetryPolicy::from_config(&options.retry_config()),
            client: OnceCell::new(),
            tokenizer: OnceCell::new(),
        }
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Whether the provider client has been built yet.
    pub fn client_initialized(&self) -> bool {
        self.client.initialized()
    }

    /// Provider client, built on first call.
    pub async fn client(&self) -> Result<&B::Client, EmbeddingError> {
        self.client
            .get_or_try_init(|| async {
                tracing::debug!(
                    provider = self.binding.name(),
                    model = %self.meta.model_name,
                    "Building embedding client"
                );
                self.binding
                    .build_client(self.api_key.as_ref())
                    .map_err(EmbeddingError::from)
            })
            .await
    }

    /// Provider tokenizer, built on first call.
    ///
    /// Loading BPE tables is CPU-bound, so it runs on the blocking pool.
    pub async fn tokenizer(&self) -> Result<&B::Tokenizer, EmbeddingError> {
        self.shared_tokenizer().await.map(|tokenizer| &**tokenizer)
    }

    async fn shared_tokenizer(&self) -> Result<&Arc<B::Tokenizer>, EmbeddingError> {
        self.tokenizer
            .get_or_try_init(|| async {
                let binding = self.binding.clone();
                let tokenizer = tokio::task::spawn_blocking(move || binding.build_tokenizer())
                    .await
                    .map_err(blocking_task_failed)??;
                Ok::<_, EmbeddingError>(Arc::new(tokenizer))
            })
            .await
    }

    /// Tokenize `texts` and clip each to the model's token limit.
    ///
    /// Encoding runs on the blocking pool so large batches do not stall the
    /// async workers.
    pub async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<u32>>, EmbeddingError> {
        let tokenizer = Arc::clone(self.shared_tokenizer().await?);
        let owned = texts.to_vec();
        let mut inputs = tokio::task::spawn_blocking(move || {
            owned
                .iter()
                .map(|text| tokenizer.encode(text))
                .collect::<Vec<_>>()
        })
        .await
        .map_err(blocking_task_failed)?;

        if let Some(max_tokens) = self.meta.max_tokens.filter(|&limit| limit > 0) {
            let clipped = clip_tokens(&mut inputs, max_tokens);
            if clipped > 0 {
                tracing::debug!(
                    model = %self.meta.model_name,
                    clipped,
                    max_tokens,
                    "Clipped inputs to token limit"
                );
            }
        }
        Ok(inputs)
    }
}

fn blocking_task_failed(err: tokio::task::JoinError) -> EmbeddingError {
    EmbeddingError::Provider(ProviderError::new(
        ProviderErrorKind::Other,
        format!("tokenizer task failed: {err}"),
    ))
}

impl<B: ProviderBinding> EmbeddingModel for ApiEmbeddingModel<B> {
    fn metadata(&self) -> &ModelMeta {
        &self.meta
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let inputs = self.encode(texts).await?;
        let client = self.client().await?;
        let model = self.meta.model_name.as_str();

        let vectors = self
            .retry
            .run(
                self.binding.rate_limit_errors(),
                self.binding.service_errors(),
                || client.create_embeddings(model, inputs.clone()),
            )
            .await?;

        if vectors.len() != texts.len() {
            return Err(EmbeddingError::ResponseMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }
        Ok(vectors)
    }
}
