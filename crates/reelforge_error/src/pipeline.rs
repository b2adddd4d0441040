//! Workflow pipeline error types.

/// Specific error conditions for a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// LLM output could not be parsed into the requested scene list
    #[display("Failed to parse storyboard: {}", _0)]
    StoryboardParse(String),
    /// A single scene could not be produced
    #[display("Scene {} failed: {}", index, reason)]
    SceneGenerationFailed {
        /// Scene index
        index: usize,
        /// Failure detail
        reason: String,
    },
    /// The run cannot produce a video
    #[display("Run aborted: {}", _0)]
    RunAborted(String),
    /// The run was cancelled by the caller
    #[display("Run cancelled")]
    Cancelled,
    /// Request failed validation before any work started
    #[display("Invalid request: {}", _0)]
    InvalidRequest(String),
    /// Frame template id could not be loaded
    #[display("Frame template not found: {}", _0)]
    TemplateNotFound(String),
    /// Frame rendering failed
    #[display("Frame rendering failed: {}", _0)]
    Render(String),
    /// Video encoder reported a failure
    #[display("Video composition failed: {}", _0)]
    Composition(String),
    /// A run stage was moved backwards or skipped a state
    #[display("Illegal stage transition: {}", _0)]
    StageTransition(String),
}

/// Pipeline error with location tracking.
///
/// # Examples
///
/// ```
/// use reelforge_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::RunAborted("no usable scenes".to_string()));
/// assert!(format!("{}", err).contains("no usable scenes"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new pipeline error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
