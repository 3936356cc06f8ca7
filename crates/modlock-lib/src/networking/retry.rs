//! Bounded retry with linearly increasing waits
//!
//! Attempt `k` (1-based) is preceded by a sleep of `(k - 1) / 2` units, so the
//! default policy waits 0, 0.5 and 1.0 seconds before its three attempts and
//! returns immediately after the last failure.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Default number of attempts per network operation
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default wait unit
pub const DEFAULT_UNIT: Duration = Duration::from_secs(1);

/// Retry policy shared by registry lookups and downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    unit: Duration,
}

/// Every attempt failed; carries the last error seen
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E: Display> Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gave up after {} attempt(s): {}",
            self.attempts, self.last_error
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS, DEFAULT_UNIT)
    }
}

impl RetryPolicy {
    /// At least one attempt is always made
    pub fn new(attempts: u32, unit: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            unit,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }

    /// Wait before 1-based `attempt`
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.unit
            .mul_f64(f64::from(attempt.saturating_sub(1)) / 2.0)
    }

    /// Sum of all waits when every attempt fails
    pub fn total_delay(&self) -> Duration {
        (1..=self.attempts).map(|a| self.delay_before(a)).sum()
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            let delay = self.delay_before(attempt);
            if !delay.is_zero() {
                debug!(label, attempt, ?delay, "Waiting before retry");
                tokio::time::sleep(delay).await;
            }

            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(last_error) if attempt >= self.attempts => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error,
                    });
                }
                Err(e) => {
                    warn!("{label}: attempt {attempt}/{} failed: {e}", self.attempts);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    include!("retry.test.rs");
}
