// src/utils/retry.rs

//! Generic retry with exponential backoff for outbound requests.
//!
//! Shared by the listing fetch and the detail fetch; knows nothing about
//! what it wraps beyond the error type.

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::RetryConfig;

/// Retry behavior for one call site.
#[derive(Debug, Clone, Copy)]
pub struct RetryOptions {
    /// Retries after the first attempt; the operation runs at most
    /// `max_retries + 1` times
    pub max_retries: u32,

    /// Base backoff; attempt `n` waits `backoff * 2^n`
    pub backoff: Duration,

    /// Predicate deciding whether an error is worth another attempt
    pub retryable: fn(&AppError) -> bool,
}

impl RetryOptions {
    /// Build options from the configured retry section.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
            ..Self::default()
        }
    }
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
            retryable: default_retryable,
        }
    }
}

/// Default transient-failure classifier.
///
/// Timeouts, connection-level failures (refused, DNS) and HTTP 5xx are
/// transient; everything else, 4xx and validation errors included,
/// propagates on the first attempt.
pub fn default_retryable(error: &AppError) -> bool {
    match error {
        AppError::Http(e) => e.is_timeout() || e.is_connect(),
        AppError::Status { status, .. } => status.is_server_error(),
        _ => false,
    }
}

/// Run `operation`, retrying transient failures with exponential backoff.
///
/// The delay before attempt `n + 1` is `backoff * 2^n`, uncapped and
/// without jitter. On exhaustion or a non-retryable error the last
/// underlying error is returned unchanged.
pub async fn with_retry<T, F, Fut>(options: &RetryOptions, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= options.max_retries || !(options.retryable)(&error) {
                    return Err(error);
                }
                let delay = options.backoff * 2u32.pow(attempt);
                log::warn!(
                    "Retry attempt {}/{} after {:?} due to: {}",
                    attempt + 1,
                    options.max_retries,
                    delay,
                    error
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use reqwest::StatusCode;

    use super::*;

    fn fast(max_retries: u32) -> RetryOptions {
        RetryOptions {
            max_retries,
            backoff: Duration::from_millis(1),
            retryable: default_retryable,
        }
    }

    fn server_error() -> AppError {
        AppError::status(StatusCode::INTERNAL_SERVER_ERROR, "https://example.com")
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<&str> = with_retry(&fast(3), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("success")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<&str> = with_retry(&fast(3), move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(server_error())
                } else {
                    Ok("success")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_retries_and_returns_last_error() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<()> = with_retry(&fast(2), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(server_error())
            }
        })
        .await;

        // max_retries = 2 means three invocations total
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        match result.unwrap_err() {
            AppError::Status { status, .. } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<()> = with_retry(&fast(3), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AppError::validation("Invalid input"))
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
    }

    #[tokio::test]
    async fn client_errors_are_permanent() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<()> = with_retry(&fast(3), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AppError::status(
                    StatusCode::FORBIDDEN,
                    "https://example.com",
                ))
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(result.is_err());
    }

    #[test]
    fn classifier_accepts_server_errors_only() {
        assert!(default_retryable(&server_error()));
        assert!(!default_retryable(&AppError::status(
            StatusCode::NOT_FOUND,
            "https://example.com"
        )));
        assert!(!default_retryable(&AppError::validation("bad record")));
    }
}
