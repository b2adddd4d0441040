//! Scene generation: narration, image prompt, then TTS and image side by side.

use crate::prompts::{WordLimits, image_prompt_prompt, refine_narration_prompt};
use crate::{ArtifactTracker, ProviderCaller, clean_text};
use reelforge_core::{
    ArtifactKind, CompletionOptions, ImageOptions, ImageStyle, Scene, VoiceOptions,
};
use reelforge_error::{PipelineError, PipelineErrorKind, ReelforgeError};
use reelforge_rate_limit::ReelforgeConfig;
use reelforge_storage::ArtifactStore;
use tracing::{debug, instrument, warn};

/// Shared inputs for generating the scenes of one run.
#[derive(Clone, Copy)]
pub struct SceneContext<'a> {
    /// Providers selected for the run
    pub caller: &'a ProviderCaller,
    /// Where audio and images are stored
    pub store: &'a dyn ArtifactStore,
    /// Artifacts stored by the current scene task
    pub tracker: &'a ArtifactTracker,
    /// Voice forwarded to TTS
    pub voice: &'a VoiceOptions,
    /// Optional style prefix for image prompts
    pub style: Option<&'a ImageStyle>,
    /// Video title, used as context for image prompts
    pub title: &'a str,
}

/// Produces narration audio and an illustration for one scene.
#[derive(Debug, Clone)]
pub struct SceneGenerator {
    refine_narration: bool,
    narration_words: WordLimits,
    image_prompt_words: WordLimits,
    image_options: ImageOptions,
}

impl SceneGenerator {
    /// Create a generator.
    pub fn new(
        refine_narration: bool,
        narration_words: WordLimits,
        image_prompt_words: WordLimits,
        image_options: ImageOptions,
    ) -> Self {
        Self {
            refine_narration,
            narration_words,
            image_prompt_words,
            image_options,
        }
    }

    /// Build from `[pipeline]` and `[image]` configuration.
    pub fn from_config(config: &ReelforgeConfig) -> Self {
        let pipeline = &config.pipeline;
        Self::new(
            pipeline.refine_narration,
            WordLimits::new(pipeline.min_narration_words, pipeline.max_narration_words),
            WordLimits::new(
                pipeline.min_image_prompt_words,
                pipeline.max_image_prompt_words,
            ),
            config.image_options(),
        )
    }

    /// Fill in narration, image prompt, audio and illustration for `scene`.
    ///
    /// Returns the errors to record against the scene. A TTS failure leaves
    /// the scene without audio; an image failure marks it failed.
    #[instrument(skip(self, ctx, scene), fields(scene = scene.index()))]
    pub async fn generate(&self, ctx: &SceneContext<'_>, scene: &mut Scene) -> Vec<ReelforgeError> {
        let mut errors = Vec::new();
        let index = *scene.index();

        if self.refine_narration {
            let narration = self.refine(ctx, scene).await;
            scene.set_narration(narration);
        }

        let prompt = self.derive_image_prompt(ctx, scene).await;
        let prompt = match ctx.style {
            Some(style) => style.apply(&prompt),
            None => prompt,
        };
        scene.set_image_prompt(prompt);

        let narrate = async {
            let clip = ctx.caller.synthesize(scene.spoken_text(), ctx.voice).await?;
            let reference = ctx
                .tracker
                .store(ctx.store, clip.data(), ArtifactKind::Audio, clip.mime_type())
                .await?;
            Ok::<_, ReelforgeError>((reference, *clip.duration_seconds()))
        };
        let illustrate = async {
            let asset = ctx
                .caller
                .generate_image(scene.image_prompt(), &self.image_options)
                .await?;
            ctx.tracker
                .store(ctx.store, asset.data(), ArtifactKind::Image, asset.mime_type())
                .await
        };
        let (audio, image) = tokio::join!(narrate, illustrate);

        match audio {
            Ok((reference, duration)) => scene.attach_audio(reference, duration),
            Err(e) => {
                warn!(scene = index, error = %e, "Narration failed, scene will be silent");
                errors.push(e);
            }
        }

        match image {
            Ok(reference) => scene.attach_illustration(reference),
            Err(e) => {
                warn!(scene = index, error = %e, "Illustration failed, scene excluded");
                scene.mark_failed();
                errors.push(scene_failed(index, &e));
            }
        }

        errors
    }

    async fn refine(&self, ctx: &SceneContext<'_>, scene: &Scene) -> String {
        let prompt = refine_narration_prompt(scene.narrative_text(), self.narration_words);
        match ctx.caller.complete(&prompt, &CompletionOptions::text()).await {
            Ok(response) => {
                let narration = clean_text(&response);
                if narration.is_empty() {
                    scene.narrative_text().clone()
                } else {
                    narration
                }
            }
            Err(e) => {
                warn!(scene = scene.index(), error = %e, "Narration refinement failed, using scene text");
                scene.narrative_text().clone()
            }
        }
    }

    async fn derive_image_prompt(&self, ctx: &SceneContext<'_>, scene: &Scene) -> String {
        let prompt = image_prompt_prompt(
            ctx.title,
            scene.spoken_text(),
            scene.visual_hint().as_deref(),
            self.image_prompt_words,
        );
        match ctx.caller.complete(&prompt, &CompletionOptions::text()).await {
            Ok(response) => {
                let derived = clean_text(&response);
                if derived.is_empty() {
                    scene.narrative_text().clone()
                } else {
                    debug!(scene = scene.index(), prompt_len = derived.len(), "Derived image prompt");
                    derived
                }
            }
            Err(e) => {
                warn!(scene = scene.index(), error = %e, "Image prompt derivation failed, using scene text");
                scene.narrative_text().clone()
            }
        }
    }
}

/// Wrap a failure that excludes a scene from the video.
pub(crate) fn scene_failed(index: usize, cause: &ReelforgeError) -> ReelforgeError {
    PipelineError::new(PipelineErrorKind::SceneGenerationFailed {
        index,
        reason: cause.to_string(),
    })
    .into()
}
