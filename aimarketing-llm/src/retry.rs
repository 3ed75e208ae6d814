//! Bounded retry with randomized exponential backoff.
//!
//! The delay before attempt `n + 1` is drawn uniformly from
//! `[min, min(max, min * 2^(n-1))]`. Only transport failures
//! ([`ClientError::is_retryable`]) are retried; anything else is returned
//! straight away.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::ClientError;

/// Total attempts made by the default policy.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Lower bound of every backoff delay by default.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(1);

/// Upper bound of every backoff delay by default.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// How often, and how patiently, a request is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A policy making at most `max_attempts` attempts (at least one).
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Set the backoff bounds. `max` is raised to `min` if smaller.
    #[must_use]
    pub fn delays(mut self, min: Duration, max: Duration) -> Self {
        self.min_delay = min;
        self.max_delay = max.max(min);
        self
    }

    /// Total number of attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound of the delay that follows failed attempt `attempt` (1-based).
    pub fn delay_ceiling(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.min_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Random delay to wait after failed attempt `attempt` (1-based).
    pub fn backoff<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let ceiling = self.delay_ceiling(attempt);
        if ceiling <= self.min_delay {
            return self.min_delay;
        }
        rng.gen_range(self.min_delay..=ceiling)
    }

    /// Run `op` until it succeeds, fails terminally, or attempts run out.
    ///
    /// `op` receives the 1-based attempt number. When the last attempt fails
    /// with a retryable error the result is [`ClientError::RetriesExhausted`].
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ClientError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= self.max_attempts => {
                    tracing::error!(attempts = attempt, error = %err, "giving up on LLM request");
                    return Err(ClientError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    let wait = self.backoff(attempt, &mut rand::thread_rng());
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "LLM request failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }
}
