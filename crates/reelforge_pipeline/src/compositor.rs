//! Video composition: ordered segments handed to the encoder.

use crate::storyboard::truncate_chars;
use chrono::{DateTime, Local};
use reelforge_core::{BackgroundMusic, Scene, VideoSettings};
use reelforge_error::{PipelineError, PipelineErrorKind, ReelforgeError, ReelforgeResult};
use reelforge_interface::{EncodeJob, EncodedVideo, VideoEncoder, VideoSegment};
use reelforge_rate_limit::ReelforgeConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Title characters kept in a generated file name.
const FILE_TITLE_CHARS: usize = 10;

/// Segments for every usable scene, in ascending index order.
///
/// Failed and pending scenes are skipped. A scene plays for the length of
/// its narration audio, or `default_seconds` when it is silent.
pub fn plan_segments(scenes: &[Scene], default_seconds: f64) -> Vec<VideoSegment> {
    let mut usable: Vec<&Scene> = scenes
        .iter()
        .filter(|s| s.status().is_usable())
        .collect();
    usable.sort_by_key(|s| *s.index());

    usable
        .into_iter()
        .filter_map(|scene| {
            let frame = scene.frame_image().clone()?;
            let duration = match (scene.narration_audio(), scene.audio_duration()) {
                (Some(_), Some(seconds)) if *seconds > 0.0 => *seconds,
                _ => default_seconds,
            };
            Some(VideoSegment::new(
                *scene.index(),
                frame,
                scene.narration_audio().clone(),
                duration,
            ))
        })
        .collect()
}

/// `{dir}/{YYYYmmdd_HHMMSS}_{title prefix}.mp4`, with `/` and spaces in the
/// title replaced by `_`.
pub fn default_output_path(dir: &Path, title: &str, now: DateTime<Local>) -> PathBuf {
    let prefix: String = truncate_chars(title, FILE_TITLE_CHARS)
        .chars()
        .map(|c| if c == '/' || c.is_whitespace() { '_' } else { c })
        .collect();
    dir.join(format!("{}_{}.mp4", now.format("%Y%m%d_%H%M%S"), prefix))
}

/// Result of a successful composition.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Encoder output
    pub video: EncodedVideo,
    /// Scene indices in the video, ascending
    pub scenes_included: Vec<usize>,
}

/// Builds the encode job from the finished scenes.
#[derive(Clone)]
pub struct VideoCompositor {
    encoder: Arc<dyn VideoEncoder>,
    settings: VideoSettings,
    default_scene_seconds: f64,
    output_dir: PathBuf,
}

impl VideoCompositor {
    /// Create a compositor.
    pub fn new(
        encoder: Arc<dyn VideoEncoder>,
        settings: VideoSettings,
        default_scene_seconds: f64,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            encoder,
            settings,
            default_scene_seconds,
            output_dir: output_dir.into(),
        }
    }

    /// Build from `[video]`, `[pipeline]` and `[output]` configuration.
    pub fn from_config(encoder: Arc<dyn VideoEncoder>, config: &ReelforgeConfig) -> Self {
        Self::new(
            encoder,
            config.video_settings(),
            config.pipeline.default_scene_seconds,
            config.output.directory.clone(),
        )
    }

    /// Output path for a title when the request does not name one.
    pub fn output_path_for(&self, title: &str) -> PathBuf {
        default_output_path(&self.output_dir, title, Local::now())
    }

    /// Encode the usable scenes into one video.
    ///
    /// # Errors
    ///
    /// Returns `RunAborted` without calling the encoder when no scene is
    /// usable, or `Composition` when the encoder fails.
    #[instrument(skip_all, fields(output = %output_path.display()))]
    pub async fn compose(
        &self,
        scenes: &[Scene],
        bgm: Option<BackgroundMusic>,
        output_path: PathBuf,
    ) -> ReelforgeResult<Composition> {
        let segments = plan_segments(scenes, self.default_scene_seconds);
        if segments.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::RunAborted(
                "no usable scenes to compose".to_string(),
            ))
            .into());
        }

        let scenes_included: Vec<usize> = segments.iter().map(|s| *s.scene_index()).collect();
        let job = EncodeJob::new(segments, bgm, self.settings, output_path);
        info!(
            segments = scenes_included.len(),
            duration = job.total_duration(),
            "Encoding video"
        );

        let video = self.encoder.encode(&job).await.map_err(|e| {
            ReelforgeError::from(PipelineError::new(PipelineErrorKind::Composition(
                e.to_string(),
            )))
        })?;

        Ok(Composition {
            video,
            scenes_included,
        })
    }
}
