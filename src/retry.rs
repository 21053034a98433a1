//! Bounded retry with exponential backoff for store contention.
//!
//! Only failures the caller marks as transient are retried. Everything else
//! is returned on the first attempt.

use std::thread;
use std::time::Duration;

use tracing::debug;

/// How many times to try, and how long to wait in between.
///
/// # Default Values
///
/// - `max_attempts`: 3
/// - `initial_delay`: 20ms
/// - `max_delay`: 200ms
///
/// The delay doubles after each failed attempt, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves like one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based): `initial_delay * 2^attempt`, capped.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Runs `op` until it succeeds, fails with a non-transient error, or runs out of attempts.
    pub fn run<T, E>(
        &self,
        is_transient: impl Fn(&E) -> bool,
        mut op: impl FnMut() -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: std::fmt::Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) && attempt + 1 < attempts => {
                    let delay = self.delay_for_attempt(attempt);
                    debug!(attempt = attempt + 1, ?delay, error = %e, "transient failure, retrying");
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
