//! Retry policy, rate limiting and configuration.
//!
//! Every external call in a run goes through a [`RetryPolicy`] (exponential
//! backoff up to an attempt ceiling, transient errors only) and a
//! per-capability-type [`RateLimiter`] (requests per minute plus a
//! concurrency cap). Both are configured from [`ReelforgeConfig`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;
mod retry;

pub use config::{
    CapabilityTypeConfig, ImageConfig, OutputConfig, PipelineConfig, ReelforgeConfig,
    RetryConfig, VideoConfig,
};
pub use limiter::{RateLimiter, RateLimiterGuard};
pub use retry::RetryPolicy;
