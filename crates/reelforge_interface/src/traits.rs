//! Provider and collaborator traits.

use crate::{EncodeJob, EncodedVideo, RenderRequest};
use async_trait::async_trait;
use reelforge_core::{AudioClip, CompletionOptions, ImageAsset, ImageOptions, VoiceOptions};
use reelforge_error::ReelforgeResult;

/// Text completion capability.
///
/// Implementations report either text or a typed provider error. The
/// response format in `options` is a hint; callers validate structure.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a prompt.
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> ReelforgeResult<String>;
}

/// Text-to-speech capability.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Synthesize narration audio for `text`.
    async fn synthesize(&self, text: &str, voice: &VoiceOptions) -> ReelforgeResult<AudioClip>;
}

/// Image generation capability.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate an image for `prompt`.
    async fn generate(&self, prompt: &str, options: &ImageOptions) -> ReelforgeResult<ImageAsset>;
}

/// Rendering service that turns bound template markup into an image.
#[async_trait]
pub trait FrameRenderer: Send + Sync {
    /// Render one frame.
    ///
    /// Transient failures should be reported as `ProviderError` with the
    /// `Unavailable` or `Timeout` kind so they are retried.
    async fn render(&self, request: &RenderRequest) -> ReelforgeResult<ImageAsset>;
}

/// Resolves template identifiers to template content.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Load the template text for `template_id`.
    async fn load(&self, template_id: &str) -> ReelforgeResult<String>;
}

/// Muxes ordered frames, narration and music into a video file.
#[async_trait]
pub trait VideoEncoder: Send + Sync {
    /// Encode the job and report where the video was written.
    async fn encode(&self, job: &EncodeJob) -> ReelforgeResult<EncodedVideo>;
}
