//! Top-level error wrapper types.

use crate::{
    BuilderError, CapabilityError, ConfigError, JsonError, PipelineError, ProviderError,
    RetryableError, StorageError,
};

/// Every error family produced inside the workspace.
///
/// # Examples
///
/// ```
/// use reelforge_error::{ConfigError, ReelforgeError};
///
/// let err: ReelforgeError = ConfigError::new("bad fps").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ReelforgeErrorKind {
    /// Capability registry error
    #[from(CapabilityError)]
    Capability(CapabilityError),
    /// Provider call error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Workflow pipeline error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Artifact storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Structured LLM output error
    #[from(JsonError)]
    Json(JsonError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
}

/// Reelforge error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Reelforge Error: {}", _0)]
pub struct ReelforgeError(Box<ReelforgeErrorKind>);

impl ReelforgeError {
    /// Create a new error from a kind.
    pub fn new(kind: ReelforgeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ReelforgeErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to ReelforgeErrorKind
impl<T> From<T> for ReelforgeError
where
    T: Into<ReelforgeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

impl RetryableError for ReelforgeError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            ReelforgeErrorKind::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Result type for Reelforge operations.
pub type ReelforgeResult<T> = std::result::Result<T, ReelforgeError>;
