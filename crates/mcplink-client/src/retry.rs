//! Bounded retry with backoff for MCP connection attempts
//!
//! Connecting right after a scale-up races the server's boot: a short
//! timeout spuriously fails healthy wake-ups, an unconditionally long one
//! makes every warm connection slow to fail. The config therefore takes an
//! optional first-attempt timeout override that callers set only when a
//! scale-up just happened.

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::time::{sleep, timeout};
use tracing::debug;

/// Retry schedule for one connection acquisition
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempt budget (not wall-clock)
    pub max_attempts: u32,

    /// Delay before the second attempt
    pub initial_delay: Duration,

    /// Multiplier applied to the delay after each failed attempt
    pub backoff_factor: f64,

    /// Cap on the inter-attempt delay
    pub max_delay: Duration,

    /// Timeout applied to each connect attempt
    pub attempt_timeout: Duration,

    /// Overrides `attempt_timeout` for the first attempt only. Set when a
    /// scale-up just happened and the server may still be booting.
    pub startup_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(30),
            attempt_timeout: Duration::from_secs(5),
            startup_timeout: None,
        }
    }
}

impl RetryConfig {
    /// Delay slept before the given 1-based attempt. No delay before the first.
    pub fn delay_before_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = self.backoff_factor.powi(attempt as i32 - 2);
        self.initial_delay.mul_f64(factor).min(self.max_delay)
    }

    /// Timeout budget for the given 1-based attempt
    pub fn timeout_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 1 {
            self.startup_timeout.unwrap_or(self.attempt_timeout)
        } else {
            self.attempt_timeout
        }
    }
}

/// Run `operation` up to `config.max_attempts` times, sleeping the backoff
/// schedule between attempts and bounding each attempt by its timeout.
///
/// Returns the first success, or the final attempt's error once the budget
/// is exhausted. Every error counts as an attempt failure; no transient vs.
/// permanent classification is made here.
///
/// The closure receives the 1-based attempt number and must build a fresh
/// transport per call: a half-established transport from a failed attempt
/// cannot be reused.
pub async fn retry_with_backoff<T, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = anyhow!("no connection attempts were made");

    for attempt in 1..=config.max_attempts {
        let delay = config.delay_before_attempt(attempt);
        if !delay.is_zero() {
            sleep(delay).await;
        }

        let budget = config.timeout_for_attempt(attempt);
        match timeout(budget, operation(attempt)).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => {
                debug!(
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %e,
                    "[Retry] Connection attempt failed"
                );
                last_error = e;
            }
            Err(_) => {
                debug!(attempt, ?budget, "[Retry] Connection attempt timed out");
                last_error = anyhow!("attempt {} timed out after {:?}", attempt, budget);
            }
        }
    }

    Err(last_error.context(format!(
        "all {} connection attempts failed",
        config.max_attempts
    )))
}
