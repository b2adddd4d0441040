//! Capability registry error types.

/// Registry lookup and registration failures.
///
/// Keys are rendered as `type/id`, e.g. `llm/openai`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CapabilityErrorKind {
    /// A capability with the same type and id is already registered
    #[display("Capability already registered: {}", _0)]
    DuplicateCapability(String),
    /// No capability registered under the requested key
    #[display("Capability not found: {}", _0)]
    CapabilityNotFound(String),
    /// No capability of the requested type is registered at all
    #[display("No capability registered for type '{}'", _0)]
    NoCapabilityRegistered(String),
}

/// Capability error with location tracking.
///
/// # Examples
///
/// ```
/// use reelforge_error::{CapabilityError, CapabilityErrorKind};
///
/// let err = CapabilityError::new(CapabilityErrorKind::DuplicateCapability("tts/edge".to_string()));
/// assert!(format!("{}", err).contains("already registered"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Capability Error: {} at line {} in {}", kind, line, file)]
pub struct CapabilityError {
    /// The kind of error that occurred
    pub kind: CapabilityErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CapabilityError {
    /// Create a new capability error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CapabilityErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
