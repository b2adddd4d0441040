//! Structured LLM output errors.

/// Why a structured reply could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum JsonErrorKind {
    /// The reply contained no JSON value at all
    #[display("no JSON in {} reply", _0)]
    Missing(String),
    /// JSON was found but did not match the expected shape
    #[display("malformed {}: {}", what, detail)]
    Malformed {
        /// What was being parsed
        what: String,
        /// Deserializer message
        detail: String,
    },
}

/// Structured output error with location tracking.
///
/// # Examples
///
/// ```
/// use reelforge_error::{JsonError, JsonErrorKind};
///
/// let err = JsonError::new(JsonErrorKind::Missing("book info".to_string()));
/// assert!(format!("{}", err).contains("no JSON in book info reply"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", kind, line, file)]
pub struct JsonError {
    /// The kind of error that occurred
    pub kind: JsonErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl JsonError {
    /// Create an error at the caller's location.
    #[track_caller]
    pub fn new(kind: JsonErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// A `Malformed` error for `what`, carrying the deserializer's message.
    #[track_caller]
    pub fn malformed(what: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::new(JsonErrorKind::Malformed {
            what: what.into(),
            detail: detail.to_string(),
        })
    }
}
