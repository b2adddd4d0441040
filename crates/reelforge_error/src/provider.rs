//! Provider call errors and retry classification.

/// Failure conditions reported by an LLM, TTS or image provider.
///
/// Every variant carries the capability key (`type/id`) of the provider
/// that failed so errors stay attributable after they are collected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderErrorKind {
    /// Provider could not be reached or reported a transient outage
    #[display("Provider {} unavailable: {}", key, message)]
    Unavailable {
        /// Capability key of the failing provider
        key: String,
        /// Provider supplied detail
        message: String,
    },
    /// Provider did not answer in time
    #[display("Provider {} timed out", key)]
    Timeout {
        /// Capability key of the failing provider
        key: String,
    },
    /// Provider refused the input or returned an unusable payload
    #[display("Provider {} rejected request: {}", key, message)]
    Rejected {
        /// Capability key of the failing provider
        key: String,
        /// Provider supplied detail
        message: String,
    },
}

impl ProviderErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderErrorKind::Unavailable { .. } | ProviderErrorKind::Timeout { .. }
        )
    }

    /// Capability key of the provider that produced the error.
    pub fn key(&self) -> &str {
        match self {
            ProviderErrorKind::Unavailable { key, .. }
            | ProviderErrorKind::Timeout { key }
            | ProviderErrorKind::Rejected { key, .. } => key,
        }
    }
}

/// Provider error with source location tracking.
///
/// # Examples
///
/// ```
/// use reelforge_error::{ProviderError, ProviderErrorKind, RetryableError};
///
/// let err = ProviderError::new(ProviderErrorKind::Timeout { key: "llm/local".to_string() });
/// assert!(err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// Transient conditions (unavailable, timeout) return true. Rejections
/// and every non-provider error return false and are never retried.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
