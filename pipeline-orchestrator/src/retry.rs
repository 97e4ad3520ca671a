use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::error::CollaboratorError;

/// Bounded retry with exponential backoff for network-bound stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    200
}

fn default_max_backoff_ms() -> u64 {
    2_000
}

fn default_multiplier() -> u32 {
    2
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based), with up to
    /// 25% jitter, never above `max_backoff_ms`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let base = self
            .initial_backoff_ms
            .saturating_mul(u64::from(self.multiplier).saturating_pow(exponent))
            .min(self.max_backoff_ms);
        let jitter = rand::thread_rng().gen_range(0..=base / 4);
        Duration::from_millis(base.saturating_add(jitter).min(self.max_backoff_ms))
    }
}

/// Run `op` with a per-attempt timeout, retrying retryable failures.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    timeout: Duration,
    stage: &'static str,
    mut op: F,
) -> Result<T, CollaboratorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CollaboratorError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        let outcome = match tokio::time::timeout(timeout, op()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CollaboratorError::Timeout {
                after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };

        match outcome {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(stage, attempt, "External stage succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if error.is_retryable() && attempt < max_attempts => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    stage,
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    retryable = true,
                    "External stage failed; backing off"
                );
                tokio::time::sleep(delay).await;
                attempt = attempt.saturating_add(1);
            }
            Err(error) => {
                tracing::warn!(
                    stage,
                    attempt,
                    retryable = error.is_retryable(),
                    "External stage failed; giving up"
                );
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy::default();
        for _ in 0..50 {
            let first = policy.backoff(1).as_millis();
            let second = policy.backoff(2).as_millis();
            let tenth = policy.backoff(10).as_millis();
            assert!((200..=250).contains(&first));
            assert!((400..=500).contains(&second));
            assert_eq!(tenth, 2_000);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(&RetryPolicy::default(), Duration::from_secs(1), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(CollaboratorError::Unavailable("503".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejections_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            run_with_retry(&RetryPolicy::default(), Duration::from_secs(1), "test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(CollaboratorError::Rejected("bad".into())) }
            })
            .await;
        assert!(matches!(result, Err(CollaboratorError::Rejected(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_are_bounded() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            run_with_retry(&RetryPolicy::default(), Duration::from_secs(30), "test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                std::future::pending()
            })
            .await;
        assert_eq!(result, Err(CollaboratorError::Timeout { after_ms: 30_000 }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
