//! Timeout plus bounded retry around a single remote call.

use std::{future::Future, time::Duration};

use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::{
    config::RetrySettings,
    dao::storage::{StorageError, StorageResult},
};

/// Delay schedule between two attempts; `attempt` is the zero-based index of
/// the attempt that just failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `min(base * 2^attempt, cap)`
    Exponential { base: Duration, cap: Duration },
    /// `base + attempt * step`
    Linear { base: Duration, step: Duration },
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Exponential { base, cap } => {
                base.saturating_mul(2u32.saturating_pow(attempt)).min(cap)
            }
            Backoff::Linear { base, step } => base.saturating_add(step.saturating_mul(attempt)),
        }
    }
}

/// Retry policy for one class of remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Delay schedule between attempts.
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Read path: 2 retries, 5 s per attempt, exponential backoff capped at 5 s.
    pub const fn read() -> Self {
        Self {
            max_retries: RetrySettings::READ.max_retries,
            timeout: RetrySettings::READ.timeout,
            backoff: Backoff::Exponential {
                base: Duration::from_millis(1_000),
                cap: Duration::from_millis(5_000),
            },
        }
    }

    /// Write path: 1 retry, 8 s per attempt, linear backoff from 2 s.
    pub const fn write() -> Self {
        Self {
            max_retries: RetrySettings::WRITE.max_retries,
            timeout: RetrySettings::WRITE.timeout,
            backoff: Backoff::Linear {
                base: Duration::from_millis(2_000),
                step: Duration::from_millis(1_000),
            },
        }
    }

    /// Override the retry count and per-attempt timeout, keeping the backoff.
    pub fn with_settings(self, settings: RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            timeout: settings.timeout,
            ..self
        }
    }

    /// Run `call` until it succeeds, fails fatally or exhausts the retries.
    ///
    /// Every attempt races the call against [`RetryPolicy::timeout`]; losing
    /// the race counts as a `deadline-exceeded` failure.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> StorageResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StorageResult<T>>,
    {
        let mut attempt = 0;
        loop {
            let outcome = match timeout(self.timeout, call()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(StorageError::deadline_exceeded(format!(
                    "{operation} timed out after {} ms",
                    self.timeout.as_millis()
                ))),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries && err.is_retryable() => {
                    let delay = self.backoff.delay(attempt);
                    debug!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "remote call failed; retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use tokio::time::Instant;

    use super::*;
    use crate::dao::storage::StorageErrorKind;

    #[test]
    fn read_backoff_doubles_up_to_the_cap() {
        let backoff = RetryPolicy::read().backoff;
        let delays: Vec<u64> = (0..5)
            .map(|attempt| backoff.delay(attempt).as_millis() as u64)
            .collect();
        assert_eq!(delays, [1_000, 2_000, 4_000, 5_000, 5_000]);
    }

    #[test]
    fn write_backoff_grows_linearly() {
        let backoff = RetryPolicy::write().backoff;
        assert_eq!(backoff.delay(0), Duration::from_millis(2_000));
        assert_eq!(backoff.delay(1), Duration::from_millis(3_000));
        assert_eq!(backoff.delay(4), Duration::from_millis(6_000));
    }

    #[tokio::test(start_paused = true)]
    async fn retryable_failures_use_every_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::read();

        let counter = calls.clone();
        let result: StorageResult<()> = policy
            .run("snapshot", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(StorageError::new(StorageErrorKind::Unavailable, "down")) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::Unavailable);
        assert_eq!(calls.load(Ordering::SeqCst), policy.max_retries + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_failures_are_attempted_once() {
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let result: StorageResult<()> = RetryPolicy::read()
            .run("fetch", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(StorageError::permission_denied("missing role")) }
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), StorageErrorKind::PermissionDenied);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_a_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let value = RetryPolicy::write()
            .run("create", move || {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err(StorageError::new(
                            StorageErrorKind::Unknown,
                            "network request failed",
                        ))
                    } else {
                        Ok("abc123")
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, "abc123");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_call_is_cut_at_the_timeout() {
        let policy = RetryPolicy {
            max_retries: 0,
            ..RetryPolicy::read()
        };
        let started = Instant::now();

        let result: StorageResult<()> = policy
            .run("fetch", || futures::future::pending::<StorageResult<()>>())
            .await;

        assert_eq!(result.unwrap_err().kind(), StorageErrorKind::DeadlineExceeded);
        assert!(started.elapsed() <= policy.timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn each_retry_gets_its_own_timeout() {
        let policy = RetryPolicy::write().with_settings(RetrySettings {
            max_retries: 1,
            timeout: Duration::from_millis(100),
        });
        let started = Instant::now();

        let result: StorageResult<()> = policy
            .run("replace", || futures::future::pending::<StorageResult<()>>())
            .await;

        assert!(result.is_err());
        // two timed-out attempts plus one linear backoff step
        let budget = policy.timeout * 2 + policy.backoff.delay(0);
        assert!(started.elapsed() <= budget);
    }
}
