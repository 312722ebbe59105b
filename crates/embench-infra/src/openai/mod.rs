//! OpenAI embedding provider binding.
//!
//! [`OpenAiBinding`] plugs the OpenAI embeddings endpoint into
//! `ApiEmbeddingModel`: an [`async_openai`] client for the network call, the
//! `cl100k_base` BPE from [`tiktoken_rs`] for token clipping, and a mapping
//! from OpenAI failures onto provider-neutral error kinds.
//!
//! Any server that speaks the OpenAI embeddings protocol can be targeted by
//! passing `base_url` through `ModelOptions::extra`.

pub mod catalog;

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::embeddings::{CreateEmbeddingRequestArgs, EmbeddingInput};
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use secrecy::{ExposeSecret, SecretString};
use tiktoken_rs::CoreBPE;
use tracing::Instrument;

use embench_core::embedding::{
    ApiEmbeddingModel, EmbeddingClient, ModelOptions, ProviderBinding, Tokenizer,
};
use embench_observe::genai_attrs::{self, GEN_AI_EMBEDDINGS_DIMENSION_COUNT};
use embench_types::error::{ProviderError, ProviderErrorKind};

use crate::secret::resolve_credential;

/// Default API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable consulted when no API key is passed explicitly.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// An API-backed embedding model served by OpenAI.
pub type OpenAiEmbeddingModel = ApiEmbeddingModel<OpenAiBinding>;

/// Provider binding for the OpenAI embeddings API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiBinding {
    base_url: String,
    organization: Option<String>,
    api_key_env: String,
}

impl OpenAiBinding {
    pub fn new() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            organization: None,
            api_key_env: OPENAI_API_KEY_ENV.to_string(),
        }
    }

    /// Build from passthrough options.
    ///
    /// Recognized `extra` keys: `base_url`, `organization`, `api_key_env`.
    pub fn from_options(options: &ModelOptions) -> Self {
        let mut binding = Self::new();
        if let Some(base_url) = options.extra_str("base_url") {
            binding.base_url = base_url.to_string();
        }
        if let Some(organization) = options.extra_str("organization") {
            binding.organization = Some(organization.to_string());
        }
        if let Some(var) = options.extra_str("api_key_env") {
            binding.api_key_env = var.to_string();
        }
        binding
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }
}

impl Default for OpenAiBinding {
    fn default() -> Self {
        Self::new()
    }
}

/// Embeddings client over [`async_openai::Client`].
///
/// Does NOT derive Debug to avoid exposing the API key held inside the
/// async-openai client.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
}

impl EmbeddingClient for OpenAiClient {
    async fn create_embeddings(
        &self,
        model: &str,
        inputs: Vec<Vec<u32>>,
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        let span = genai_attrs::embeddings_span("openai", model, inputs.len());
        let request = CreateEmbeddingRequestArgs::default()
            .model(model)
            .input(EmbeddingInput::ArrayOfIntegerArray(inputs))
            .build()
            .map_err(map_openai_error)?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .instrument(span.clone())
            .await
            .map_err(map_openai_error)?;

        if let Some(first) = response.data.first() {
            span.record(GEN_AI_EMBEDDINGS_DIMENSION_COUNT, first.embedding.len());
        }

        Ok(order_by_index(
            response
                .data
                .into_iter()
                .map(|item| (item.index, item.embedding))
                .collect(),
        ))
    }
}

/// `cl100k_base` tokenizer shared by the text-embedding-3 and ada-002 models.
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Tokenizer for Cl100kTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        // Ordinary encoding: special-token text is tokenized like any other.
        self.bpe.encode_ordinary(text)
    }
}

impl ProviderBinding for OpenAiBinding {
    type Client = OpenAiClient;
    type Tokenizer = Cl100kTokenizer;

    fn name(&self) -> &str {
        "openai"
    }

    fn build_client(&self, api_key: Option<&SecretString>) -> Result<OpenAiClient, ProviderError> {
        let api_key = resolve_credential(api_key, &self.api_key_env).ok_or_else(|| {
            ProviderError::new(
                ProviderErrorKind::Authentication,
                format!("no API key given and {} is not set", self.api_key_env),
            )
        })?;

        let mut config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(&self.base_url);
        if let Some(ref organization) = self.organization {
            config = config.with_org_id(organization);
        }

        Ok(OpenAiClient {
            client: Client::with_config(config).with_backoff(single_attempt_backoff()),
        })
    }

    fn build_tokenizer(&self) -> Result<Cl100kTokenizer, ProviderError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| {
            ProviderError::new(
                ProviderErrorKind::Other,
                format!("failed to load cl100k_base tokenizer: {e}"),
            )
        })?;
        Ok(Cl100kTokenizer { bpe })
    }

    fn rate_limit_errors(&self) -> &[ProviderErrorKind] {
        &[ProviderErrorKind::RateLimited]
    }

    fn service_errors(&self) -> &[ProviderErrorKind] {
        &[ProviderErrorKind::ServerError, ProviderErrorKind::Overloaded]
    }
}

/// Backoff for the async-openai client that never waits or retries.
///
/// `ApiEmbeddingModel` owns the retry budget; the client's own 429/5xx
/// retries would otherwise run underneath it, unbounded by `num_retries`.
fn single_attempt_backoff() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// Sort `(index, vector)` pairs by index and drop the indices.
fn order_by_index(mut items: Vec<(u32, Vec<f32>)>) -> Vec<Vec<f32>> {
    items.sort_by_key(|(index, _)| *index);
    items.into_iter().map(|(_, embedding)| embedding).collect()
}

/// Classify an OpenAI API error body by its `code`, `type`, and message.
fn classify_api_error(code: &str, error_type: &str, message: &str) -> ProviderErrorKind {
    if code == "invalid_api_key"
        || error_type == "authentication_error"
        || message.contains("Incorrect API key")
        || message.contains("Invalid API key")
    {
        ProviderErrorKind::Authentication
    } else if code == "insufficient_quota" {
        // Returned with a 429 but never clears by waiting.
        ProviderErrorKind::Other
    } else if code == "rate_limit_exceeded"
        || error_type == "rate_limit_error"
        || error_type == "requests"
    {
        ProviderErrorKind::RateLimited
    } else if code == "server_error" || error_type == "server_error" {
        ProviderErrorKind::ServerError
    } else if error_type == "overloaded_error" || code == "engine_overloaded" {
        ProviderErrorKind::Overloaded
    } else if error_type == "invalid_request_error" {
        ProviderErrorKind::InvalidRequest
    } else {
        ProviderErrorKind::Other
    }
}

/// Classify a bare HTTP status.
fn classify_status(status: u16) -> ProviderErrorKind {
    match status {
        400 | 404 | 422 => ProviderErrorKind::InvalidRequest,
        401 | 403 => ProviderErrorKind::Authentication,
        408 => ProviderErrorKind::Timeout,
        429 => ProviderErrorKind::RateLimited,
        503 | 529 => ProviderErrorKind::Overloaded,
        500..=599 => ProviderErrorKind::ServerError,
        _ => ProviderErrorKind::Other,
    }
}

/// Map an [`async_openai::error::OpenAIError`] to a [`ProviderError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> ProviderError {
    use async_openai::error::OpenAIError;

    let kind = match &err {
        OpenAIError::ApiError(api_err) => classify_api_error(
            api_err.code.as_deref().unwrap_or(""),
            api_err.r#type.as_deref().unwrap_or(""),
            &api_err.message,
        ),
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status() {
            Some(status) => classify_status(status.as_u16()),
            None if reqwest_err.is_timeout() => ProviderErrorKind::Timeout,
            None if reqwest_err.is_connect() => ProviderErrorKind::Connection,
            None => ProviderErrorKind::Other,
        },
        OpenAIError::JSONDeserialize(..) => ProviderErrorKind::Deserialization,
        OpenAIError::InvalidArgument(_) => ProviderErrorKind::InvalidRequest,
        _ => ProviderErrorKind::Other,
    };
    ProviderError::new(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSET_ENV: &str = "EMBENCH_TEST_OPENAI_KEY_THAT_IS_NEVER_SET";

    #[test]
    fn test_default_binding() {
        let binding = OpenAiBinding::default();
        assert_eq!(binding.name(), "openai");
        assert_eq!(binding.base_url(), OPENAI_BASE_URL);
        assert!(binding.organization().is_none());
    }

    #[test]
    fn test_from_options_reads_passthrough() {
        let options = ModelOptions::default()
            .with_extra("base_url", serde_json::json!("http://localhost:8000/v1"))
            .with_extra("organization", serde_json::json!("org-123"));
        let binding = OpenAiBinding::from_options(&options);
        assert_eq!(binding.base_url(), "http://localhost:8000/v1");
        assert_eq!(binding.organization(), Some("org-123"));
    }

    #[test]
    fn test_build_client_with_explicit_key() {
        let binding = OpenAiBinding::default();
        let key = SecretString::from("sk-test".to_string());
        assert!(binding.build_client(Some(&key)).is_ok());
    }

    #[test]
    fn test_build_client_without_any_key_fails_as_auth() {
        let options = ModelOptions::default().with_extra("api_key_env", serde_json::json!(UNSET_ENV));
        let binding = OpenAiBinding::from_options(&options);
        let err = match binding.build_client(None) {
            Ok(_) => panic!("expected missing key to fail"),
            Err(err) => err,
        };
        assert_eq!(err.kind, ProviderErrorKind::Authentication);
        assert!(err.message.contains(UNSET_ENV));
    }

    #[test]
    fn test_tokenizer_does_not_reject_special_tokens() {
        let tokenizer = OpenAiBinding::default().build_tokenizer().unwrap();
        let tokens = tokenizer.encode("before <|endoftext|> after");
        assert!(!tokens.is_empty());
        // 100257 is <|endoftext|> in cl100k_base.
        assert!(!tokens.contains(&100_257));
    }

    #[test]
    fn test_tokenizer_is_deterministic() {
        let tokenizer = OpenAiBinding::default().build_tokenizer().unwrap();
        assert_eq!(tokenizer.encode("hello world"), tokenizer.encode("hello world"));
        assert!(tokenizer.encode("").is_empty());
    }

    #[test]
    fn test_declared_retryable_kinds() {
        let binding = OpenAiBinding::default();
        assert_eq!(binding.rate_limit_errors(), &[ProviderErrorKind::RateLimited]);
        assert!(binding.service_errors().contains(&ProviderErrorKind::ServerError));
        assert!(!binding.service_errors().contains(&ProviderErrorKind::Authentication));
    }

    #[test]
    fn test_client_backoff_never_retries() {
        use backoff::backoff::Backoff;
        let mut backoff = single_attempt_backoff();
        backoff.reset();
        assert!(backoff.next_backoff().is_none());
    }

    #[test]
    fn test_order_by_index() {
        let ordered = order_by_index(vec![(2, vec![2.0]), (0, vec![0.0]), (1, vec![1.0])]);
        assert_eq!(ordered, vec![vec![0.0], vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_classify_api_error() {
        assert_eq!(
            classify_api_error("rate_limit_exceeded", "", "slow down"),
            ProviderErrorKind::RateLimited
        );
        assert_eq!(
            classify_api_error("insufficient_quota", "insufficient_quota", "quota"),
            ProviderErrorKind::Other
        );
        assert_eq!(
            classify_api_error("invalid_api_key", "invalid_request_error", "Incorrect API key provided"),
            ProviderErrorKind::Authentication
        );
        assert_eq!(
            classify_api_error("", "server_error", "oops"),
            ProviderErrorKind::ServerError
        );
        assert_eq!(
            classify_api_error("", "invalid_request_error", "too long"),
            ProviderErrorKind::InvalidRequest
        );
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(429), ProviderErrorKind::RateLimited);
        assert_eq!(classify_status(500), ProviderErrorKind::ServerError);
        assert_eq!(classify_status(503), ProviderErrorKind::Overloaded);
        assert_eq!(classify_status(401), ProviderErrorKind::Authentication);
        assert_eq!(classify_status(400), ProviderErrorKind::InvalidRequest);
        assert_eq!(classify_status(302), ProviderErrorKind::Other);
    }

    #[test]
    fn test_map_api_error_rate_limit() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "Rate limit reached for requests".to_string(),
            r#type: Some("requests".to_string()),
            param: None,
            code: Some("rate_limit_exceeded".to_string()),
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert_eq!(err.kind, ProviderErrorKind::RateLimited);
        assert!(err.retry_after_ms.is_none());
    }

    #[test]
    fn test_map_invalid_argument() {
        let err = map_openai_error(async_openai::error::OpenAIError::InvalidArgument(
            "missing model".to_string(),
        ));
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
        assert!(err.message.contains("missing model"));
    }
}
