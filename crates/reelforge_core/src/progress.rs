//! Progress notifications.

use crate::{SceneStatus, StageName, StageStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressKind {
    /// A stage began
    StageStarted {
        /// Stage
        stage: StageName,
    },
    /// A stage reached a terminal status
    StageFinished {
        /// Stage
        stage: StageName,
        /// Terminal status
        status: StageStatus,
    },
    /// A scene task acquired a concurrency slot
    SceneStarted {
        /// Scene index
        index: usize,
    },
    /// A scene task is about to release its slot
    SceneFinished {
        /// Scene index
        index: usize,
        /// Settled scene status
        status: SceneStatus,
    },
    /// The run finished
    Completed {
        /// Whether a video was produced
        success: bool,
    },
}

/// A progress notification for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Run id
    pub request_id: Uuid,
    /// What happened
    pub kind: ProgressKind,
    /// Overall completion fraction in `0.0..=1.0`
    pub progress: f32,
    /// Scenes finished so far
    pub scenes_done: usize,
    /// Total scenes in the storyboard (zero before it exists)
    pub scenes_total: usize,
}
