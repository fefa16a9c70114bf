//! Exponential back-off with jitter for the popularity feeds and Steam.

use std::future::Future;
use std::time::Duration;

use crate::error::DiscoveryError;

/// Transport failures, 429 and 5xx are worth another attempt. Parse failures,
/// missing credentials and 4xx statuses are not.
pub(crate) fn is_retriable(err: &DiscoveryError) -> bool {
    match err {
        DiscoveryError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        DiscoveryError::RateLimited { .. } => true,
        DiscoveryError::UnexpectedStatus { status, .. } => *status >= 500,
        DiscoveryError::Deserialize { .. }
        | DiscoveryError::NotConfigured(_)
        | DiscoveryError::Empty(_)
        | DiscoveryError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors. The n-th retry sleeps `backoff_base_ms × 2^(n-1)` ± 25 %, capped
/// at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, DiscoveryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DiscoveryError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient feed error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn rate_limited_is_retriable() {
        assert!(is_retriable(&DiscoveryError::RateLimited {
            url: "https://api.twitch.tv".to_owned()
        }));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&DiscoveryError::UnexpectedStatus {
            status: 401,
            url: "https://api.twitch.tv".to_owned()
        }));
        assert!(is_retriable(&DiscoveryError::UnexpectedStatus {
            status: 503,
            url: "https://api.twitch.tv".to_owned()
        }));
    }

    #[test]
    fn empty_directory_is_not_retriable() {
        assert!(!is_retriable(&DiscoveryError::Empty("directory".to_owned())));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err::<u32, _>(DiscoveryError::RateLimited {
                        url: "test".to_owned(),
                    })
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(DiscoveryError::UnexpectedStatus {
                    status: 502,
                    url: "test".to_owned(),
                })
            }
        })
        .await;
        assert!(matches!(
            result,
            Err(DiscoveryError::UnexpectedStatus { status: 502, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_not_configured() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(DiscoveryError::NotConfigured("twitch"))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
