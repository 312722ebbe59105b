//! Classified retry with exponential backoff for provider calls.
//!
//! Errors are classified by data, not by type: a binding declares which
//! [`ProviderErrorKind`]s mean rate limiting and which mean transient service
//! failure. Both classes are retried up to the budget; everything else is
//! returned on first occurrence.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use embench_types::config::RetryConfig;
use embench_types::error::{EmbeddingError, ProviderError, ProviderErrorKind};

/// How a provider failure is treated by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Client is being rate limited; retry after backoff.
    RateLimit,
    /// Provider-side transient failure; retry after backoff.
    Service,
    /// Retrying will not help (bad request, bad credentials, ...).
    Permanent,
}

impl RetryClass {
    /// Classify `kind` against a binding's declared error kinds.
    ///
    /// A kind listed in both sets is treated as rate limiting.
    pub fn classify(
        kind: ProviderErrorKind,
        rate_limit: &[ProviderErrorKind],
        service: &[ProviderErrorKind],
    ) -> Self {
        if rate_limit.contains(&kind) {
            RetryClass::RateLimit
        } else if service.contains(&kind) {
            RetryClass::Service
        } else {
            RetryClass::Permanent
        }
    }

    pub fn is_retryable(self) -> bool {
        !matches!(self, RetryClass::Permanent)
    }
}

/// Retry budget and backoff curve.
///
/// Retry `n` (0-based) sleeps `min(initial * 2^n, max)` plus uniform jitter
/// in `0..=jitter`. When the provider supplies a retry-after hint, the hint
/// (capped at `max`) is used instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub num_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            num_retries: config.num_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            jitter: Duration::from_millis(config.jitter_ms),
        }
    }

    /// Exponential delay before retry `retry`, without jitter.
    pub fn base_delay(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Delay before retry `retry` after `err`.
    pub fn delay_for(&self, retry: u32, err: &ProviderError) -> Duration {
        match err.retry_after_ms {
            Some(hint) => Duration::from_millis(hint).min(self.max_backoff),
            None => self.base_delay(retry) + self.random_jitter(),
        }
    }

    fn random_jitter(&self) -> Duration {
        let max_ms = self.jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }

    /// Run `op` until it succeeds, fails permanently, or the budget runs out.
    ///
    /// `op` is attempted at most `num_retries + 1` times. Permanent failures
    /// surface as [`EmbeddingError::Provider`]; a retryable failure on the
    /// last attempt surfaces as [`EmbeddingError::RetriesExhausted`] carrying
    /// that last error.
    pub async fn run<T, F, Fut>(
        &self,
        rate_limit: &[ProviderErrorKind],
        service: &[ProviderErrorKind],
        mut op: F,
    ) -> Result<T, EmbeddingError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut retries = 0u32;
        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let class = RetryClass::classify(err.kind, rate_limit, service);
            if !class.is_retryable() {
                tracing::debug!(error = %err, "Non-retryable provider error, returning immediately");
                return Err(EmbeddingError::Provider(err));
            }

            if retries >= self.num_retries {
                tracing::error!(
                    attempts = retries + 1,
                    error = %err,
                    "Provider retry budget exhausted"
                );
                return Err(EmbeddingError::RetriesExhausted {
                    attempts: retries + 1,
                    source: err,
                });
            }

            let delay = self.delay_for(retries, &err);
            tracing::warn!(
                ?class,
                attempt = retries + 1,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Transient provider error, backing off"
            );
            tokio::time::sleep(delay).await;
            retries += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    const RATE: &[ProviderErrorKind] = &[ProviderErrorKind::RateLimited];
    const SERVICE: &[ProviderErrorKind] = &[
        ProviderErrorKind::ServerError,
        ProviderErrorKind::Overloaded,
    ];

    fn policy(num_retries: u32) -> RetryPolicy {
        RetryPolicy {
            num_retries,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(1_000),
            jitter: Duration::ZERO,
        }
    }

    /// Fails with `kind` for the first `failures` calls, then succeeds.
    async fn flaky(
        calls: &AtomicU32,
        failures: u32,
        kind: ProviderErrorKind,
    ) -> Result<&'static str, ProviderError> {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        if call < failures {
            Err(ProviderError::new(kind, format!("failure {call}")))
        } else {
            Ok("ok")
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            RetryClass::classify(ProviderErrorKind::RateLimited, RATE, SERVICE),
            RetryClass::RateLimit
        );
        assert_eq!(
            RetryClass::classify(ProviderErrorKind::Overloaded, RATE, SERVICE),
            RetryClass::Service
        );
        assert_eq!(
            RetryClass::classify(ProviderErrorKind::Authentication, RATE, SERVICE),
            RetryClass::Permanent
        );
        assert!(!RetryClass::Permanent.is_retryable());
    }

    #[test]
    fn test_classification_is_per_binding() {
        // A binding that does not declare timeouts never retries them.
        assert_eq!(
            RetryClass::classify(ProviderErrorKind::Timeout, RATE, SERVICE),
            RetryClass::Permanent
        );
        assert_eq!(
            RetryClass::classify(
                ProviderErrorKind::Timeout,
                RATE,
                &[ProviderErrorKind::Timeout]
            ),
            RetryClass::Service
        );
    }

    #[test]
    fn test_backoff_curve_doubles_and_caps() {
        let p = policy(10);
        assert_eq!(p.base_delay(0), Duration::from_millis(100));
        assert_eq!(p.base_delay(1), Duration::from_millis(200));
        assert_eq!(p.base_delay(3), Duration::from_millis(800));
        assert_eq!(p.base_delay(4), Duration::from_millis(1_000));
        assert_eq!(p.base_delay(40), Duration::from_millis(1_000));
    }

    #[test]
    fn test_jitter_stays_within_bound() {
        let p = RetryPolicy {
            jitter: Duration::from_millis(50),
            ..policy(3)
        };
        let err = ProviderError::new(ProviderErrorKind::ServerError, "x");
        for _ in 0..100 {
            let delay = p.delay_for(1, &err);
            assert!(delay >= Duration::from_millis(200));
            assert!(delay <= Duration::from_millis(250));
        }
    }

    #[test]
    fn test_retry_after_hint_is_capped() {
        let p = policy(3);
        let err = ProviderError::new(ProviderErrorKind::RateLimited, "x").with_retry_after_ms(300);
        assert_eq!(p.delay_for(0, &err), Duration::from_millis(300));

        let err = ProviderError::new(ProviderErrorKind::RateLimited, "x").with_retry_after_ms(9_000);
        assert_eq!(p.delay_for(0, &err), Duration::from_millis(1_000));
    }

    #[test]
    fn test_from_config() {
        let p = RetryPolicy::default();
        assert_eq!(p.num_retries, 5);
        assert_eq!(p.initial_backoff, Duration::from_secs(1));
        assert_eq!(p.max_backoff, Duration::from_secs(60));
        assert_eq!(p.jitter, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_num_retries_failures() {
        let calls = AtomicU32::new(0);
        let result = policy(3)
            .run(RATE, SERVICE, || flaky(&calls, 3, ProviderErrorKind::RateLimited))
            .await
            .unwrap();
        assert_eq!(result, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_after_num_retries_plus_one_failures() {
        let calls = AtomicU32::new(0);
        let err = policy(3)
            .run(RATE, SERVICE, || flaky(&calls, 4, ProviderErrorKind::RateLimited))
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match err {
            EmbeddingError::RetriesExhausted { attempts, source } => {
                assert_eq!(attempts, 4);
                assert_eq!(source.kind, ProviderErrorKind::RateLimited);
                assert_eq!(source.message, "failure 3");
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_errors_are_retried() {
        let calls = AtomicU32::new(0);
        let result = policy(2)
            .run(RATE, SERVICE, || flaky(&calls, 2, ProviderErrorKind::Overloaded))
            .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let err = policy(5)
            .run(RATE, SERVICE, || {
                flaky(&calls, 10, ProviderErrorKind::InvalidRequest)
            })
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            err,
            EmbeddingError::Provider(ProviderError {
                kind: ProviderErrorKind::InvalidRequest,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_fails_on_first_transient_error() {
        let calls = AtomicU32::new(0);
        let err = policy(0)
            .run(RATE, SERVICE, || flaky(&calls, 1, ProviderErrorKind::ServerError))
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, EmbeddingError::RetriesExhausted { attempts: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_sleeps_follow_curve() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        policy(3)
            .run(RATE, SERVICE, || flaky(&calls, 3, ProviderErrorKind::ServerError))
            .await
            .unwrap();
        // 100ms + 200ms + 400ms with jitter disabled.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(700));
        assert!(elapsed < Duration::from_millis(710));
    }
}
