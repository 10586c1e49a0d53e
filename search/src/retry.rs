//! Caller-side policy around a single embedding call.
//!
//! Providers never retry. Each attempt here is bounded by the configured
//! timeout, and only errors the provider marks retryable are attempted again,
//! with exponential backoff. A rate limit's `retry-after` raises the next
//! delay; one longer than the configured maximum delay ends the retries.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::debug;

use snipsearch_embeddings::{Embedding, EmbeddingError, EmbeddingProvider};

use crate::config::RankingConfig;

/// Embed `text` with timeout and retry applied.
pub async fn embed_with_policy(
    provider: &dyn EmbeddingProvider,
    text: &str,
    config: &RankingConfig,
) -> Result<Embedding, EmbeddingError> {
    let timeout = config.request_timeout();
    let max_delay = Duration::from_millis(config.retry_max_delay_ms);
    let backoff = ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(config.retry_initial_delay_ms))
        .with_max_delay(max_delay)
        .with_max_times(config.max_retries);

    (move || async move { embed_once(provider, text, timeout).await })
        .retry(backoff)
        .when(EmbeddingError::is_retryable)
        .adjust(move |err, delay| honor_retry_after(err, delay, max_delay))
        .notify(|err, delay| {
            debug!("Retrying {} embedding in {delay:?}: {err}", provider.name());
        })
        .await
}

/// Raise `delay` to the server's requested wait, or stop when that wait
/// exceeds `max_delay`. `None` in or out means no further attempt.
fn honor_retry_after(
    err: &EmbeddingError,
    delay: Option<Duration>,
    max_delay: Duration,
) -> Option<Duration> {
    match err {
        EmbeddingError::RateLimited { retry_after_secs } => {
            let wait = Duration::from_secs(*retry_after_secs);
            if wait > max_delay {
                debug!("Server asked to wait {wait:?}, longer than {max_delay:?}; giving up");
                return None;
            }
            delay.map(|delay| delay.max(wait))
        }
        _ => delay,
    }
}

async fn embed_once(
    provider: &dyn EmbeddingProvider,
    text: &str,
    timeout: Duration,
) -> Result<Embedding, EmbeddingError> {
    match tokio::time::timeout(timeout, provider.embed(text)).await {
        Ok(result) => result,
        Err(_) => Err(EmbeddingError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails with the given error for the first `failures` calls.
    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
        retryable: bool,
        retry_after_secs: u64,
    }

    impl Flaky {
        fn new(failures: usize, retryable: bool) -> Self {
            Self {
                failures,
                calls: AtomicUsize::new(0),
                retryable,
                retry_after_secs: 0,
            }
        }

        fn rate_limited(failures: usize, retry_after_secs: u64) -> Self {
            Self {
                retry_after_secs,
                ..Self::new(failures, true)
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn model(&self) -> &str {
            "flaky-1"
        }

        async fn embed(&self, _text: &str) -> snipsearch_embeddings::Result<Embedding> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                if self.retryable {
                    return Err(EmbeddingError::RateLimited {
                        retry_after_secs: self.retry_after_secs,
                    });
                }
                return Err(EmbeddingError::InvalidResponse("bad".to_string()));
            }
            Ok(vec![1.0, 2.0])
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    /// Never answers within any reasonable timeout.
    struct Stalled;

    #[async_trait]
    impl EmbeddingProvider for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        fn model(&self) -> &str {
            "stalled-1"
        }

        async fn embed(&self, _text: &str) -> snipsearch_embeddings::Result<Embedding> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![1.0])
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn fast_config(max_retries: usize) -> RankingConfig {
        RankingConfig {
            retry_initial_delay_ms: 1,
            retry_max_delay_ms: 2,
            ..RankingConfig::default()
        }
        .with_max_retries(max_retries)
    }

    #[tokio::test]
    async fn test_retryable_errors_are_retried() {
        let provider = Flaky::new(2, true);

        let embedding = embed_with_policy(&provider, "x", &fast_config(2))
            .await
            .unwrap();
        assert_eq!(embedding, vec![1.0, 2.0]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_budget_is_bounded() {
        let provider = Flaky::new(10, true);

        let err = embed_with_policy(&provider, "x", &fast_config(1))
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::RateLimited { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_output_is_not_retried() {
        let provider = Flaky::new(1, false);

        let err = embed_with_policy(&provider, "x", &fast_config(3))
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_waits_for_retry_after() {
        let provider = Flaky::rate_limited(1, 5);
        let config = RankingConfig {
            retry_initial_delay_ms: 1,
            retry_max_delay_ms: 10_000,
            ..RankingConfig::default()
        }
        .with_max_retries(2);

        let started = tokio::time::Instant::now();
        let embedding = embed_with_policy(&provider, "x", &config).await.unwrap();

        assert_eq!(embedding, vec![1.0, 2.0]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_longer_than_max_delay_fails_fast() {
        let provider = Flaky::rate_limited(1, 60);
        let config = RankingConfig {
            retry_initial_delay_ms: 1,
            retry_max_delay_ms: 5_000,
            ..RankingConfig::default()
        }
        .with_max_retries(3);

        let started = tokio::time::Instant::now();
        let err = embed_with_policy(&provider, "x", &config).await.unwrap_err();

        assert!(matches!(
            err,
            EmbeddingError::RateLimited {
                retry_after_secs: 60
            }
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_other_errors_keep_backoff_delay() {
        let delay = Some(Duration::from_millis(200));
        let max = Duration::from_secs(5);

        assert_eq!(
            honor_retry_after(&EmbeddingError::Timeout(max), delay, max),
            delay
        );
        assert_eq!(
            honor_retry_after(
                &EmbeddingError::RateLimited {
                    retry_after_secs: 1
                },
                None,
                max
            ),
            None
        );
    }

    #[tokio::test]
    async fn test_timeout_becomes_provider_error() {
        let config = fast_config(0).with_request_timeout(Duration::from_millis(20));
        let err = embed_with_policy(&Stalled, "x", &config).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Timeout(_)));
        assert!(err.is_provider_error());
    }
}
