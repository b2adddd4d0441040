//! Exponential backoff retry for transient provider failures.

use crate::RetryConfig;
use reelforge_error::RetryableError;
use std::future::Future;
use std::time::Duration;
use tokio_retry2::strategy::jitter;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

/// Attempt ceiling and backoff schedule for one external call.
///
/// A call that keeps failing with a retryable error is attempted exactly
/// `max_attempts` times. Non-retryable errors return after the first attempt.
///
/// # Examples
///
/// ```
/// use reelforge_rate_limit::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(4, Duration::from_millis(100), Duration::from_millis(250), false);
/// let delays: Vec<Duration> = policy.delays().collect();
/// assert_eq!(
///     delays,
///     vec![Duration::from_millis(100), Duration::from_millis(200), Duration::from_millis(250)]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    initial_backoff: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` below one is treated as one.
    pub fn new(
        max_attempts: usize,
        initial_backoff: Duration,
        max_delay: Duration,
        jitter: bool,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_delay,
            jitter,
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, false)
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Delays between attempts: `initial * 2^n`, capped at `max_delay`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let initial = self.initial_backoff;
        let max_delay = self.max_delay;
        let apply_jitter = self.jitter;
        (0..self.max_attempts.saturating_sub(1)).map(move |n| {
            let factor = 1u32.checked_shl(n as u32).unwrap_or(u32::MAX);
            let delay = initial.saturating_mul(factor).min(max_delay);
            if apply_jitter { jitter(delay) } else { delay }
        })
    }

    /// Run `operation` until it succeeds, fails permanently or runs out of attempts.
    ///
    /// `label` names the call in retry logs, usually a capability key.
    pub async fn run<F, Fut, R, E>(&self, label: &str, operation: F) -> Result<R, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: RetryableError + std::fmt::Display,
    {
        let max_attempts = self.max_attempts;
        let attempt = std::sync::atomic::AtomicUsize::new(0);
        let operation = &operation;
        let attempt = &attempt;

        Retry::spawn(self.delays(), move || async move {
            let n = attempt.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            match operation().await {
                Ok(value) => {
                    if n > 1 {
                        debug!(call = label, attempt = n, "Call succeeded after retry");
                    }
                    Ok(value)
                }
                Err(e) if e.is_retryable() => {
                    warn!(call = label, attempt = n, max_attempts, error = %e, "Transient error, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(call = label, attempt = n, error = %e, "Permanent error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_delay_ms),
            config.jitter,
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}
