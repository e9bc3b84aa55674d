//! Rate-limit aware retry wrapper for remote calls.
//!
//! Every search and detail request goes through [`with_retry`]. A
//! `403`/`429` that carries a quota signal (remaining count of zero, or a
//! body mentioning the rate limit) is treated as transient: the wrapper
//! sleeps until the advertised reset time plus padding and tries again.
//! Timeouts are retried after the minimum wait. Anything else is terminal
//! for that one call.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::{ApiResponse, RateLimitInfo};
use crate::error::ScrapeError;

/// Longest body excerpt carried in a terminal status error.
const MAX_EXCERPT_CHARS: usize = 200;

/// Retry budget and backoff timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Added to the time remaining until the quota reset, in milliseconds.
    pub padding_ms: u64,
    /// Lower bound for any backoff wait, in milliseconds.
    pub min_wait_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            padding_ms: 1000,
            min_wait_ms: 3000,
        }
    }
}

/// Whether a non-success response is a recoverable quota condition.
pub fn is_rate_limited(response: &ApiResponse) -> bool {
    if !matches!(response.status, 403 | 429) {
        return false;
    }
    response.rate_limit.remaining == Some(0)
        || response.body.to_ascii_lowercase().contains("rate limit")
}

/// How long to wait before retrying a rate-limited call.
///
/// `max(reset - now + padding, min_wait)`, raised further to any
/// `retry-after` the server sent. Without a reset time the minimum wait
/// applies.
pub fn rate_limit_wait(info: &RateLimitInfo, now_ms: i64, policy: &RetryPolicy) -> Duration {
    let min_wait = i64::try_from(policy.min_wait_ms).unwrap_or(i64::MAX);
    let padding = i64::try_from(policy.padding_ms).unwrap_or(i64::MAX);

    let until_reset = info
        .reset_epoch_secs
        .map(|reset| {
            reset
                .saturating_mul(1000)
                .saturating_sub(now_ms)
                .saturating_add(padding)
        })
        .unwrap_or(0);

    let mut wait_ms = until_reset.max(min_wait);
    if let Some(after) = info.retry_after_secs {
        let after_ms = i64::try_from(after.saturating_mul(1000)).unwrap_or(i64::MAX);
        wait_ms = wait_ms.max(after_ms);
    }
    Duration::from_millis(u64::try_from(wait_ms).unwrap_or(0))
}

/// Run `call`, retrying on rate limits and timeouts per `policy`.
///
/// `label` identifies the call in log events.
///
/// # Errors
///
/// - [`ScrapeError::Status`] for a non-success response that is not a rate limit
/// - [`ScrapeError::RetriesExhausted`] when every retry hit a rate limit or timeout
/// - transport errors other than timeouts are returned unchanged
pub async fn with_retry<F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut call: F,
) -> Result<ApiResponse, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ApiResponse, ScrapeError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;

        let (wait, reason) = match call().await {
            Ok(response) if response.is_success() => return Ok(response),
            Ok(response) if is_rate_limited(&response) => {
                let now_ms = chrono::Utc::now().timestamp_millis();
                (
                    rate_limit_wait(&response.rate_limit, now_ms, policy),
                    format!("rate limited ({})", response.status),
                )
            }
            Ok(response) => {
                return Err(ScrapeError::Status {
                    status: response.status,
                    message: excerpt(&response.body),
                });
            }
            Err(ScrapeError::Timeout(what)) => (
                Duration::from_millis(policy.min_wait_ms),
                format!("timed out: {what}"),
            ),
            Err(err) => return Err(err),
        };

        if attempt > policy.max_retries {
            return Err(ScrapeError::RetriesExhausted {
                attempts: attempt,
                last: reason,
            });
        }

        tracing::warn!(
            call = label,
            attempt,
            wait_ms = wait.as_millis() as u64,
            reason = %reason,
            "remote call throttled; backing off"
        );
        tokio::time::sleep(wait).await;
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_EXCERPT_CHARS {
        return trimmed.to_owned();
    }
    let mut cut: String = trimmed.chars().take(MAX_EXCERPT_CHARS).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn limited(status: u16, remaining: Option<u64>, reset: Option<i64>, body: &str) -> ApiResponse {
        ApiResponse {
            status,
            rate_limit: RateLimitInfo {
                remaining,
                reset_epoch_secs: reset,
                retry_after_secs: None,
            },
            body: body.into(),
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            padding_ms: 0,
            min_wait_ms: 10,
        }
    }

    #[test]
    fn forbidden_with_zero_remaining_is_rate_limited() {
        assert!(is_rate_limited(&limited(403, Some(0), None, "")));
    }

    #[test]
    fn too_many_requests_with_body_is_rate_limited() {
        let response = limited(429, Some(12), None, "API Rate Limit exceeded for 1.2.3.4");
        assert!(is_rate_limited(&response));
    }

    #[test]
    fn forbidden_without_quota_signal_is_terminal() {
        assert!(!is_rate_limited(&limited(403, Some(10), None, "Forbidden")));
    }

    #[test]
    fn other_status_never_rate_limited() {
        assert!(!is_rate_limited(&limited(500, Some(0), None, "rate limit")));
        assert!(!is_rate_limited(&limited(404, Some(0), None, "")));
    }

    #[test]
    fn wait_uses_reset_plus_padding() {
        let policy = RetryPolicy {
            max_retries: 3,
            padding_ms: 1000,
            min_wait_ms: 3000,
        };
        let info = RateLimitInfo {
            remaining: Some(0),
            reset_epoch_secs: Some(1_010),
            retry_after_secs: None,
        };
        let wait = rate_limit_wait(&info, 1_000_000, &policy);
        assert_eq!(wait, Duration::from_millis(11_000));
    }

    #[test]
    fn wait_never_below_minimum() {
        let policy = RetryPolicy::default();
        let info = RateLimitInfo {
            remaining: Some(0),
            reset_epoch_secs: Some(900),
            retry_after_secs: None,
        };
        let wait = rate_limit_wait(&info, 1_000_000, &policy);
        assert_eq!(wait, Duration::from_millis(policy.min_wait_ms));
    }

    #[test]
    fn wait_without_reset_is_minimum() {
        let policy = RetryPolicy::default();
        let wait = rate_limit_wait(&RateLimitInfo::default(), 5, &policy);
        assert_eq!(wait, Duration::from_millis(3000));
    }

    #[test]
    fn retry_after_raises_wait() {
        let policy = RetryPolicy::default();
        let info = RateLimitInfo {
            remaining: None,
            reset_epoch_secs: None,
            retry_after_secs: Some(60),
        };
        assert_eq!(rate_limit_wait(&info, 0, &policy), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_until_reset_then_succeeds() {
        let calls = AtomicU32::new(0);
        let reset = chrono::Utc::now().timestamp() + 10;
        let started = tokio::time::Instant::now();

        let result = with_retry(&RetryPolicy::default(), "user detail user2", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok::<_, ScrapeError>(limited(403, Some(0), Some(reset), "API rate limit exceeded"))
                } else {
                    Ok::<_, ScrapeError>(ApiResponse::ok(r#"{"login":"user2"}"#))
                }
            }
        })
        .await;

        let response = result.expect("retry should succeed");
        assert_eq!(response.status, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast_policy(), "search", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ScrapeError>(limited(429, Some(0), None, "")) }
        })
        .await;

        match result {
            Err(ScrapeError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 4);
                assert!(last.contains("429"));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn terminal_status_not_retried() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast_policy(), "detail", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ScrapeError>(limited(404, None, None, "{\"message\":\"Not Found\"}")) }
        })
        .await;

        match result {
            Err(ScrapeError::Status { status, message }) => {
                assert_eq!(status, 404);
                assert!(message.contains("Not Found"));
            }
            other => panic!("expected Status, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_retried() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast_policy(), "detail", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ScrapeError::Timeout("user detail".into()))
                } else {
                    Ok::<_, ScrapeError>(ApiResponse::ok("{}"))
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn transport_error_is_terminal() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast_policy(), "detail", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<ApiResponse, _>(ScrapeError::Http("connection refused".into())) }
        })
        .await;

        assert!(matches!(result, Err(ScrapeError::Http(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_retries_exhausts_on_first_limit() {
        let policy = RetryPolicy {
            max_retries: 0,
            ..fast_policy()
        };
        let result = with_retry(&policy, "detail", || async {
            Ok::<_, ScrapeError>(limited(403, Some(0), None, ""))
        })
        .await;
        assert!(matches!(
            result,
            Err(ScrapeError::RetriesExhausted { attempts: 1, .. })
        ));
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let body = "x".repeat(500);
        let cut = excerpt(&body);
        assert_eq!(cut.chars().count(), MAX_EXCERPT_CHARS + 1);
        assert!(cut.ends_with('…'));
    }
}
