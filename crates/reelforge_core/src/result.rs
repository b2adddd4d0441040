//! Generation result.

use crate::ErrorRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Outcome of one generation request.
///
/// Failures are reported here as data, never as a raw provider error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Run id
    pub request_id: Uuid,
    /// Resolved title, when the storyboard stage got that far
    pub title: Option<String>,
    /// Path of the produced video
    pub video_path: Option<PathBuf>,
    /// Total video duration in seconds
    pub duration_seconds: f64,
    /// Indices of scenes in the video, ascending
    pub scenes_included: Vec<usize>,
    /// Errors tied to a specific scene
    pub per_scene_errors: Vec<ErrorRecord>,
    /// Every recorded error, in the order it was recorded
    pub errors: Vec<ErrorRecord>,
    /// True when a video was produced
    pub success: bool,
}

impl GenerationResult {
    /// A failed result carrying the itemized errors.
    pub fn failed(request_id: Uuid, title: Option<String>, errors: Vec<ErrorRecord>) -> Self {
        let per_scene_errors = errors
            .iter()
            .filter(|e| e.scene_index().is_some())
            .cloned()
            .collect();
        Self {
            request_id,
            title,
            video_path: None,
            duration_seconds: 0.0,
            scenes_included: Vec::new(),
            per_scene_errors,
            errors,
            success: false,
        }
    }
}
