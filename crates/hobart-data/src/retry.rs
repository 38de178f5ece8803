//! Bounded backoff for transient fetch failures.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Retry schedule for a fallible fetch.
///
/// An operation gets one initial attempt plus at most one retry per
/// backoff entry. Only transient failures (see
/// [`DataError::is_transient`](crate::DataError::is_transient)) are
/// retried; anything else surfaces immediately, and exhausting the
/// schedule surfaces the last transient error as terminal.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    backoff: Vec<Duration>,
}

impl RetryPolicy {
    /// Policy with an explicit backoff schedule.
    pub const fn new(backoff: Vec<Duration>) -> Self {
        Self { backoff }
    }

    /// Policy that never retries.
    pub const fn none() -> Self {
        Self {
            backoff: Vec::new(),
        }
    }

    /// Maximum number of retries after the initial attempt.
    pub fn max_retries(&self) -> usize {
        self.backoff.len()
    }

    /// Run `operation` under this policy.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.backoff.len() => {
                    let delay = self.backoff[attempt];
                    attempt += 1;
                    warn!(
                        attempt,
                        delay_secs = delay.as_secs(),
                        error = %err,
                        "transient fetch failure, backing off"
                    );
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    /// The observed upstream throttle pattern: waits of 5, 10 and 20
    /// minutes, then give up.
    fn default() -> Self {
        Self::new(vec![
            Duration::from_secs(300),
            Duration::from_secs(600),
            Duration::from_secs(1200),
        ])
    }
}
