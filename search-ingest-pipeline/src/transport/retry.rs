//! Fixed-interval retry policy.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry a failing operation a fixed number of times with a fixed delay.
///
/// There is no backoff and no jitter; imports run as scheduled batch jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Sleep between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    /// Two retries with 5 second intervals, i.e. at most three attempts.
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Run `operation` until it succeeds or the retries are used up.
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_if(operation, |_| true).await
    }

    /// Like [`run`](Self::run), but errors for which `retryable` is false
    /// are returned at once.
    pub async fn run_if<T, E, F, Fut, R>(&self, mut operation: F, retryable: R) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        R: Fn(&E) -> bool,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt > self.max_retries || !retryable(&e) => return Err(e),
                Err(e) => {
                    warn!(
                        attempt = attempt,
                        max_attempts = self.max_retries + 1,
                        delay_secs = self.delay.as_secs_f64(),
                        error = %e,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
