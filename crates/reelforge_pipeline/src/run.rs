//! The mutable execution record of one generation request.

use chrono::{DateTime, Utc};
use reelforge_core::{
    BookInfo, ErrorRecord, GenerationResult, Scene, SceneStatus, StageName, StageStatus, Storyboard,
};
use reelforge_error::{PipelineError, PipelineErrorKind, ReelforgeError, ReelforgeResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use strum::IntoEnumIterator;
use tracing::{debug, info};
use uuid::Uuid;

/// Stage status, storyboard and ordered error list for one run.
///
/// Owned by the engine's run loop; scene tasks report back to it instead of
/// mutating it directly.
#[derive(Debug, Clone, Serialize, derive_getters::Getters)]
pub struct WorkflowRun {
    request_id: Uuid,
    title: Option<String>,
    book: Option<BookInfo>,
    storyboard: Option<Storyboard>,
    stage_status: BTreeMap<StageName, StageStatus>,
    errors: Vec<ErrorRecord>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl WorkflowRun {
    /// Start a run with every stage pending.
    pub fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            title: None,
            book: None,
            storyboard: None,
            stage_status: StageName::iter().map(|s| (s, StageStatus::Pending)).collect(),
            errors: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Current status of a stage.
    pub fn stage(&self, stage: StageName) -> StageStatus {
        self.stage_status
            .get(&stage)
            .copied()
            .unwrap_or_default()
    }

    /// Move a stage forward.
    ///
    /// Allowed: pending to running, running to succeeded or failed, and
    /// pending to failed for checks that fail before the stage starts.
    ///
    /// # Errors
    ///
    /// Returns `StageTransition` for any other move.
    pub fn transition(&mut self, stage: StageName, to: StageStatus) -> ReelforgeResult<()> {
        let from = self.stage(stage);
        let allowed = matches!(
            (from, to),
            (StageStatus::Pending, StageStatus::Running)
                | (StageStatus::Running, StageStatus::Succeeded)
                | (StageStatus::Running, StageStatus::Failed)
                | (StageStatus::Pending, StageStatus::Failed)
        );
        if !allowed {
            return Err(PipelineError::new(PipelineErrorKind::StageTransition(format!(
                "{} cannot move from {} to {}",
                stage, from, to
            )))
            .into());
        }
        info!(request_id = %self.request_id, %stage, %from, %to, "Stage transition");
        self.stage_status.insert(stage, to);
        Ok(())
    }

    /// Append an error to the ordered list.
    pub fn record_error(
        &mut self,
        stage: StageName,
        scene_index: Option<usize>,
        error: &ReelforgeError,
    ) {
        debug!(request_id = %self.request_id, %stage, ?scene_index, error = %error, "Recording error");
        self.errors
            .push(ErrorRecord::from_error(stage, scene_index, error));
    }

    /// Set the resolved title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Set what is known about the book being summarized.
    pub fn set_book(&mut self, book: BookInfo) {
        self.book = Some(book);
    }

    /// Extension fields for frames: book fields overlaid by the request's own.
    pub fn frame_ext(
        &self,
        request_ext: &BTreeMap<String, serde_json::Value>,
    ) -> BTreeMap<String, serde_json::Value> {
        let mut ext = self
            .book
            .as_ref()
            .map(BookInfo::frame_fields)
            .unwrap_or_default();
        ext.extend(request_ext.iter().map(|(k, v)| (k.clone(), v.clone())));
        ext
    }

    /// Attach the storyboard produced by the first stage.
    ///
    /// # Errors
    ///
    /// Returns `StageTransition` if a storyboard is already attached.
    pub fn set_storyboard(&mut self, storyboard: Storyboard) -> ReelforgeResult<()> {
        if self.storyboard.is_some() {
            return Err(PipelineError::new(PipelineErrorKind::StageTransition(
                "storyboard already set".to_string(),
            ))
            .into());
        }
        self.storyboard = Some(storyboard);
        Ok(())
    }

    /// Write back a processed scene. Returns false if there is no matching scene.
    pub fn update_scene(&mut self, scene: Scene) -> bool {
        self.storyboard
            .as_mut()
            .is_some_and(|board| board.update_scene(scene))
    }

    /// Scenes of the storyboard, empty before it exists.
    pub fn scenes(&self) -> &[Scene] {
        self.storyboard
            .as_ref()
            .map(|b| b.scenes().as_slice())
            .unwrap_or_default()
    }

    /// Status of every scene by index.
    pub fn scene_statuses(&self) -> BTreeMap<usize, SceneStatus> {
        self.scenes()
            .iter()
            .map(|s| (*s.index(), *s.status()))
            .collect()
    }

    /// Scenes that can go into the video.
    pub fn usable_scene_count(&self) -> usize {
        self.scenes()
            .iter()
            .filter(|s| s.status().is_usable())
            .count()
    }

    /// Storyboard succeeded and at least one scene is usable.
    pub fn is_successful(&self) -> bool {
        self.stage(StageName::Storyboard) == StageStatus::Succeeded
            && self.usable_scene_count() > 0
    }

    /// Stamp the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Report the run as a result.
    ///
    /// `video` is the output path and duration when composition succeeded;
    /// without it the result is a failure.
    pub fn to_result(&self, video: Option<(PathBuf, f64, Vec<usize>)>) -> GenerationResult {
        match video {
            Some((path, duration_seconds, scenes_included)) if self.is_successful() => {
                let per_scene_errors = self
                    .errors
                    .iter()
                    .filter(|e| e.scene_index().is_some())
                    .cloned()
                    .collect();
                GenerationResult {
                    request_id: self.request_id,
                    title: self.title.clone(),
                    video_path: Some(path),
                    duration_seconds,
                    scenes_included,
                    per_scene_errors,
                    errors: self.errors.clone(),
                    success: true,
                }
            }
            _ => GenerationResult::failed(self.request_id, self.title.clone(), self.errors.clone()),
        }
    }
}
