//! Collaborator request and response types.

use reelforge_core::{ArtifactRef, BackgroundMusic, VideoSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A bound template ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct RenderRequest {
    template_id: String,
    markup: String,
    fields: BTreeMap<String, String>,
    width: u32,
    height: u32,
}

impl RenderRequest {
    /// Create a render request.
    pub fn new(
        template_id: impl Into<String>,
        markup: impl Into<String>,
        fields: BTreeMap<String, String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            markup: markup.into(),
            fields,
            width,
            height,
        }
    }
}

/// One scene's slot in the final video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct VideoSegment {
    scene_index: usize,
    frame: ArtifactRef,
    audio: Option<ArtifactRef>,
    duration_seconds: f64,
}

impl VideoSegment {
    /// Create a segment.
    pub fn new(
        scene_index: usize,
        frame: ArtifactRef,
        audio: Option<ArtifactRef>,
        duration_seconds: f64,
    ) -> Self {
        Self {
            scene_index,
            frame,
            audio,
            duration_seconds,
        }
    }
}

/// Everything the encoder needs, segments already in playback order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct EncodeJob {
    segments: Vec<VideoSegment>,
    bgm: Option<BackgroundMusic>,
    settings: VideoSettings,
    output_path: PathBuf,
}

impl EncodeJob {
    /// Create an encode job.
    pub fn new(
        segments: Vec<VideoSegment>,
        bgm: Option<BackgroundMusic>,
        settings: VideoSettings,
        output_path: PathBuf,
    ) -> Self {
        Self {
            segments,
            bgm,
            settings,
            output_path,
        }
    }

    /// Sum of segment durations.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_seconds).sum()
    }
}

/// Encoder output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedVideo {
    /// Where the video was written
    pub path: PathBuf,
    /// Video length in seconds
    pub duration_seconds: f64,
}
