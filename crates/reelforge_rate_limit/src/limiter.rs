//! Per-capability-type rate limiter using governor and a Tokio semaphore.

use crate::{CapabilityTypeConfig, RetryPolicy};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use reelforge_error::RetryableError;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::Semaphore;

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Requests-per-minute and concurrency limits for one capability type.
///
/// Cloning shares the underlying quota and semaphore.
#[derive(Clone)]
pub struct RateLimiter {
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
}

impl RateLimiter {
    /// Create a limiter. `None` means unlimited.
    pub fn new(rpm: Option<u32>, max_concurrent: Option<u32>) -> Self {
        let rpm_limiter = rpm.and_then(NonZeroU32::new).map(|n| {
            let quota = Quota::per_minute(n);
            Arc::new(GovernorRateLimiter::direct(quota))
        });

        let permits = max_concurrent
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(Semaphore::MAX_PERMITS);

        Self {
            rpm_limiter,
            concurrent_semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self::new(None, None)
    }

    /// Build from a `[capabilities.<type>]` section.
    pub fn from_config(config: &CapabilityTypeConfig) -> Self {
        Self::new(config.rpm, config.max_concurrent)
    }

    /// Concurrency slots currently free.
    pub fn available_permits(&self) -> usize {
        self.concurrent_semaphore.available_permits()
    }

    /// Wait for the per-minute quota, then take a concurrency slot.
    ///
    /// The slot is released when the guard drops.
    pub async fn acquire(&self) -> RateLimiterGuard {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        // Acquire the slot last so it is not held while waiting on quota.
        let permit = self.concurrent_semaphore.clone().acquire_owned().await.ok();

        RateLimiterGuard { _permit: permit }
    }

    /// Execute an operation under this limiter with the given retry policy.
    ///
    /// Each attempt acquires the limiter separately, so a backoff sleep
    /// never holds a concurrency slot.
    pub async fn execute<F, Fut, R, E>(
        &self,
        policy: &RetryPolicy,
        label: &str,
        operation: F,
    ) -> Result<R, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: RetryableError + std::fmt::Display,
    {
        let operation = &operation;
        policy
            .run(label, move || async move {
                let _guard = self.acquire().await;
                operation().await
            })
            .await
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rpm_limited", &self.rpm_limiter.is_some())
            .field("available_permits", &self.available_permits())
            .finish()
    }
}

/// RAII guard releasing the concurrency slot when dropped.
pub struct RateLimiterGuard {
    _permit: Option<tokio::sync::OwnedSemaphorePermit>,
}
