use std::fmt;

use thiserror::Error;

/// Errors raised while constructing or materializing a retrieval dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Required declarative metadata is missing (e.g., no leaderboard tag).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A dataset source did not override a required hook.
    #[error("dataset hook `{hook}` is not implemented")]
    Unimplemented { hook: &'static str },

    #[error("failed to load {what}: {message}")]
    Load { what: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Provider-neutral category of a failed embedding call.
///
/// Provider bindings map their native errors onto these kinds and declare
/// which kinds count as rate limiting and which as transient service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    RateLimited,
    ServerError,
    Overloaded,
    Timeout,
    Connection,
    Authentication,
    InvalidRequest,
    Deserialization,
    Other,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderErrorKind::RateLimited => "rate limited",
            ProviderErrorKind::ServerError => "server error",
            ProviderErrorKind::Overloaded => "overloaded",
            ProviderErrorKind::Timeout => "timeout",
            ProviderErrorKind::Connection => "connection error",
            ProviderErrorKind::Authentication => "authentication failed",
            ProviderErrorKind::InvalidRequest => "invalid request",
            ProviderErrorKind::Deserialization => "deserialization error",
            ProviderErrorKind::Other => "provider error",
        };
        f.write_str(name)
    }
}

/// A single failed call to a remote embedding provider.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    /// Server-supplied hint for how long to wait before retrying.
    pub retry_after_ms: Option<u64>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after_ms: None,
        }
    }

    pub fn with_retry_after_ms(mut self, retry_after_ms: u64) -> Self {
        self.retry_after_ms = Some(retry_after_ms);
        self
    }
}

/// Errors surfaced by `EmbeddingModel::embed`.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Non-retryable provider failure, surfaced on first occurrence.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A retryable failure that persisted past the retry budget.
    #[error("provider call failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    #[error("provider returned {actual} embeddings for {expected} inputs")]
    ResponseMismatch { expected: usize, actual: usize },
}

impl EmbeddingError {
    /// The underlying provider failure, if this error came from the provider.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            EmbeddingError::Provider(err) => Some(err),
            EmbeddingError::RetriesExhausted { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_error_display() {
        let err = DatasetError::Unimplemented { hook: "corpus" };
        assert_eq!(err.to_string(), "dataset hook `corpus` is not implemented");
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new(ProviderErrorKind::RateLimited, "slow down");
        assert_eq!(err.to_string(), "rate limited: slow down");
        assert!(err.retry_after_ms.is_none());
    }

    #[test]
    fn test_retries_exhausted_exposes_last_error() {
        let err = EmbeddingError::RetriesExhausted {
            attempts: 4,
            source: ProviderError::new(ProviderErrorKind::ServerError, "boom"),
        };
        assert!(err.to_string().contains("4 attempts"));
        assert_eq!(
            err.provider_error().map(|e| e.kind),
            Some(ProviderErrorKind::ServerError)
        );
    }

    #[test]
    fn test_response_mismatch_display() {
        let err = EmbeddingError::ResponseMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "provider returned 2 embeddings for 3 inputs");
        assert!(err.provider_error().is_none());
    }
}
