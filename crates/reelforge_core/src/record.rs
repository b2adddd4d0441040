//! Stage bookkeeping and itemized error records.

use reelforge_error::{
    CapabilityErrorKind, PipelineErrorKind, ProviderErrorKind, ReelforgeError, ReelforgeErrorKind,
};
use serde::{Deserialize, Serialize};

/// The three pipeline stages, in execution order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum StageName {
    /// Storyboard generation
    #[display("storyboard")]
    Storyboard,
    /// Per-scene generation and frame composition
    #[display("scenes")]
    Scenes,
    /// Video composition
    #[display("composition")]
    Composition,
}

/// Lifecycle of a stage. Transitions only move forward.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Not started
    #[default]
    #[display("pending")]
    Pending,
    /// In progress
    #[display("running")]
    Running,
    /// Finished successfully
    #[display("succeeded")]
    Succeeded,
    /// Finished with a failure
    #[display("failed")]
    Failed,
}

impl StageStatus {
    /// True for succeeded or failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StageStatus::Succeeded | StageStatus::Failed)
    }
}

/// Serializable classification of an error for result reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Capability registered twice
    #[display("duplicate_capability")]
    DuplicateCapability,
    /// Capability lookup failed
    #[display("capability_not_found")]
    CapabilityNotFound,
    /// Provider unavailable after retries
    #[display("provider_unavailable")]
    ProviderUnavailable,
    /// Provider timed out after retries
    #[display("provider_timeout")]
    ProviderTimeout,
    /// Provider rejected the request
    #[display("provider_rejected")]
    ProviderRejected,
    /// Storyboard output unparseable
    #[display("storyboard_parse")]
    StoryboardParse,
    /// Scene could not be produced
    #[display("scene_generation_failed")]
    SceneGenerationFailed,
    /// No video could be produced
    #[display("run_aborted")]
    RunAborted,
    /// Cancelled by the caller
    #[display("cancelled")]
    Cancelled,
    /// Request failed validation
    #[display("invalid_request")]
    InvalidRequest,
    /// Template could not be loaded
    #[display("template_not_found")]
    TemplateNotFound,
    /// Frame rendering failed
    #[display("render")]
    Render,
    /// Encoder failure
    #[display("composition")]
    Composition,
    /// Artifact storage failure
    #[display("storage")]
    Storage,
    /// Anything else
    #[display("other")]
    Other,
}

impl FailureKind {
    /// Classify an error.
    pub fn classify(error: &ReelforgeError) -> Self {
        match error.kind() {
            ReelforgeErrorKind::Capability(e) => match e.kind {
                CapabilityErrorKind::DuplicateCapability(_) => FailureKind::DuplicateCapability,
                CapabilityErrorKind::CapabilityNotFound(_)
                | CapabilityErrorKind::NoCapabilityRegistered(_) => {
                    FailureKind::CapabilityNotFound
                }
            },
            ReelforgeErrorKind::Provider(e) => match e.kind {
                ProviderErrorKind::Unavailable { .. } => FailureKind::ProviderUnavailable,
                ProviderErrorKind::Timeout { .. } => FailureKind::ProviderTimeout,
                ProviderErrorKind::Rejected { .. } => FailureKind::ProviderRejected,
            },
            ReelforgeErrorKind::Pipeline(e) => match e.kind {
                PipelineErrorKind::StoryboardParse(_) => FailureKind::StoryboardParse,
                PipelineErrorKind::SceneGenerationFailed { .. } => {
                    FailureKind::SceneGenerationFailed
                }
                PipelineErrorKind::RunAborted(_) => FailureKind::RunAborted,
                PipelineErrorKind::Cancelled => FailureKind::Cancelled,
                PipelineErrorKind::InvalidRequest(_) => FailureKind::InvalidRequest,
                PipelineErrorKind::TemplateNotFound(_) => FailureKind::TemplateNotFound,
                PipelineErrorKind::Render(_) => FailureKind::Render,
                PipelineErrorKind::Composition(_) => FailureKind::Composition,
                PipelineErrorKind::StageTransition(_) => FailureKind::Other,
            },
            ReelforgeErrorKind::Storage(_) => FailureKind::Storage,
            ReelforgeErrorKind::Builder(_) => FailureKind::InvalidRequest,
            ReelforgeErrorKind::Config(_) | ReelforgeErrorKind::Json(_) => FailureKind::Other,
        }
    }
}

/// One entry of a run's ordered error list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ErrorRecord {
    stage: StageName,
    scene_index: Option<usize>,
    kind: FailureKind,
    message: String,
}

impl ErrorRecord {
    /// Create a record from parts.
    pub fn new(
        stage: StageName,
        scene_index: Option<usize>,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            scene_index,
            kind,
            message: message.into(),
        }
    }

    /// Record an error raised in a stage, optionally tied to a scene.
    pub fn from_error(stage: StageName, scene_index: Option<usize>, error: &ReelforgeError) -> Self {
        Self::new(stage, scene_index, FailureKind::classify(error), error.to_string())
    }
}
