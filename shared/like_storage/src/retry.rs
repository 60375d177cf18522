//! Bounded retry for startup operations

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::{LikeStorageError, LikeStorageResult};

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Linear backoff policy: attempt `n` failing transiently waits `base_delay * n`.
///
/// Only errors for which [`LikeStorageError::is_transient`] holds are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay unit multiplied by the attempt number
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget and delay unit
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Runs `operation` until it succeeds, fails permanently or the budget runs out
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error unchanged, or
    /// `LikeStorageError::RetriesExhausted` wrapping the last transient error.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> LikeStorageResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LikeStorageResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{err}. Retrying in {}ms (attempt {attempt}/{max_attempts})",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if err.is_transient() => {
                    return Err(LikeStorageError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[test]
    fn test_delay_grows_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(3), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = &AtomicU32::new(0);

        let result = fast_policy(5)
            .run(move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(LikeStorageError::TableBeingDeleted("imagelikes".to_string()))
                } else {
                    Ok("ready")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ready");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = &AtomicU32::new(0);

        let result: LikeStorageResult<()> = fast_policy(3)
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LikeStorageError::TableBeingDeleted("imagelikes".to_string()))
            })
            .await;

        assert!(matches!(
            result,
            Err(LikeStorageError::RetriesExhausted { attempts: 3, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = &AtomicU32::new(0);

        let result: LikeStorageResult<()> = fast_policy(5)
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LikeStorageError::Backend("access denied".to_string()))
            })
            .await;

        assert!(matches!(result, Err(LikeStorageError::Backend(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
