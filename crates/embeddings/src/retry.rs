//! Generic retry-with-exponential-backoff executor
//!
//! The teacher's providers each inline their own retry loop; spec.md calls
//! for a single shared executor instead so every provider gets identical
//! backoff/cancellation behavior for free. The executor makes no judgement
//! about error kind: every failure is retried until attempts are exhausted
//! or `cancel` fires.
//!
//! Backoff starts at `cfg.base_delay_ms` and multiplies by `cfg.multiplier`
//! each attempt, capped at `cfg.max_delay_ms`.

use gocontext_core::config::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub async fn retry_with_backoff<T, E, F, Fut>(
    cfg: &RetryConfig,
    cancel: &CancellationToken,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0usize;
    let mut delay_ms = cfg.base_delay_ms;

    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                attempt += 1;
                if attempt >= cfg.max_attempts || cancel.is_cancelled() {
                    return Err(e);
                }
                warn!(attempt, delay_ms, "retrying after error");
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
                    _ = cancel.cancelled() => return Err(e),
                }
                delay_ms = ((delay_ms as f64) * cfg.multiplier) as u64;
                delay_ms = delay_ms.min(cfg.max_delay_ms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_cfg() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 2,
            multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let result: Result<i32, &str> = retry_with_backoff(&fast_cfg(), &cancel, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let result: Result<i32, &str> = retry_with_backoff(&fast_cfg(), &cancel, || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err("transient")
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
    async fn retries_every_error_kind_up_to_the_attempt_bound() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let result: Result<i32, &str> = retry_with_backoff(&fast_cfg(), &cancel, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("permanent")
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let result: Result<i32, &str> = retry_with_backoff(&fast_cfg(), &cancel, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("always fails")
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_immediately_when_already_cancelled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<i32, &str> = retry_with_backoff(&fast_cfg(), &cancel, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("transient")
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
