//! Frame composition: bind a template to scene data and render it.

use crate::ArtifactTracker;
use crate::scene::scene_failed;
use reelforge_core::{ArtifactKind, ArtifactRef, Scene, VideoSettings};
use reelforge_error::{PipelineError, PipelineErrorKind, ReelforgeError, ReelforgeResult};
use reelforge_interface::{FrameRenderer, RenderRequest, TemplateStore};
use reelforge_rate_limit::RetryPolicy;
use reelforge_storage::ArtifactStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Placeholder for the topic or book title.
pub const FIELD_TOPIC: &str = "topic";
/// Placeholder for the scene narration.
pub const FIELD_TEXT: &str = "text";
/// Placeholder for the illustration location.
pub const FIELD_IMAGE: &str = "image";

/// Substitute `{{name}}` placeholders in `template`.
///
/// Whitespace inside the braces is ignored. Placeholders without a value
/// render as empty strings.
///
/// # Errors
///
/// Returns a `Render` error if the placeholder pattern cannot be compiled.
///
/// # Examples
///
/// ```
/// use reelforge_pipeline::bind_template;
/// use std::collections::BTreeMap;
///
/// let mut fields = BTreeMap::new();
/// fields.insert("topic".to_string(), "Rust".to_string());
/// let bound = bind_template("<h1>{{ topic }}</h1><p>{{rating}}</p>", &fields).unwrap();
/// assert_eq!(bound, "<h1>Rust</h1><p></p>");
/// ```
pub fn bind_template(template: &str, fields: &BTreeMap<String, String>) -> ReelforgeResult<String> {
    let re = regex::Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").map_err(|e| {
        PipelineError::new(PipelineErrorKind::Render(format!(
            "Invalid placeholder regex: {}",
            e
        )))
    })?;

    let bound = re.replace_all(template, |caps: &regex::Captures<'_>| {
        fields.get(&caps[1]).cloned().unwrap_or_default()
    });
    Ok(bound.into_owned())
}

/// Field map for one frame: `topic`, `text` and `image`, then extension fields.
///
/// Extension values that are JSON strings are used as-is, `null` becomes
/// empty and anything else is rendered as JSON. An extension field with the
/// same name as a core field replaces it.
pub fn frame_fields(
    topic: &str,
    text: &str,
    image: &str,
    ext: &BTreeMap<String, serde_json::Value>,
) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::from([
        (FIELD_TOPIC.to_string(), topic.to_string()),
        (FIELD_TEXT.to_string(), text.to_string()),
        (FIELD_IMAGE.to_string(), image.to_string()),
    ]);
    fields.extend(ext.iter().map(|(key, value)| {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        (key.clone(), value)
    }));
    fields
}

/// Template and extension data shared by every frame of a run.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Template identifier
    pub template_id: &'a str,
    /// Loaded template content
    pub template: &'a str,
    /// Topic or book title
    pub topic: &'a str,
    /// Extension fields
    pub ext: &'a BTreeMap<String, serde_json::Value>,
}

/// Loads templates and renders one frame per scene.
#[derive(Clone)]
pub struct FrameComposer {
    templates: Arc<dyn TemplateStore>,
    renderer: Arc<dyn FrameRenderer>,
    policy: RetryPolicy,
    settings: VideoSettings,
}

impl FrameComposer {
    /// Create a composer.
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        renderer: Arc<dyn FrameRenderer>,
        policy: RetryPolicy,
        settings: VideoSettings,
    ) -> Self {
        Self {
            templates,
            renderer,
            policy,
            settings,
        }
    }

    /// Resolve a template id to its content.
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound` when the store fails or returns an empty template.
    #[instrument(skip(self))]
    pub async fn load_template(&self, template_id: &str) -> ReelforgeResult<String> {
        let template = self.templates.load(template_id).await.map_err(|e| {
            ReelforgeError::from(PipelineError::new(PipelineErrorKind::TemplateNotFound(
                format!("{}: {}", template_id, e),
            )))
        })?;
        if template.trim().is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::TemplateNotFound(format!(
                "{}: template is empty",
                template_id
            )))
            .into());
        }
        debug!(template_len = template.len(), "Loaded frame template");
        Ok(template)
    }

    /// Render and store the frame for `scene`.
    ///
    /// On failure the scene is marked failed and the returned error is a
    /// `SceneGenerationFailed` for its index.
    ///
    /// # Errors
    ///
    /// Returns `SceneGenerationFailed` when the scene has no illustration or
    /// rendering or storage fails after retries.
    #[instrument(skip_all, fields(scene = scene.index(), template = ctx.template_id))]
    pub async fn compose(
        &self,
        ctx: &FrameContext<'_>,
        store: &dyn ArtifactStore,
        tracker: &ArtifactTracker,
        scene: &mut Scene,
    ) -> ReelforgeResult<ArtifactRef> {
        let index = *scene.index();
        match self.render_frame(ctx, store, tracker, scene).await {
            Ok(frame) => {
                scene.attach_frame(frame.clone());
                Ok(frame)
            }
            Err(e) => {
                warn!(scene = index, error = %e, "Frame composition failed, scene excluded");
                scene.mark_failed();
                Err(scene_failed(index, &e))
            }
        }
    }

    async fn render_frame(
        &self,
        ctx: &FrameContext<'_>,
        store: &dyn ArtifactStore,
        tracker: &ArtifactTracker,
        scene: &Scene,
    ) -> ReelforgeResult<ArtifactRef> {
        let illustration = scene.illustration().as_ref().ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::Render(
                "scene has no illustration".to_string(),
            ))
        })?;
        let image = store
            .local_path(illustration)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| illustration.location().clone());

        let fields = frame_fields(ctx.topic, scene.spoken_text(), &image, ctx.ext);
        let markup = bind_template(ctx.template, &fields)?;
        let request = RenderRequest::new(
            ctx.template_id,
            markup,
            fields,
            *self.settings.width(),
            *self.settings.height(),
        );

        let label = format!("render/{}", ctx.template_id);
        let renderer = &self.renderer;
        let request = &request;
        let asset = self
            .policy
            .run(&label, move || async move { renderer.render(request).await })
            .await?;

        if asset.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::Render(
                "renderer returned an empty image".to_string(),
            ))
            .into());
        }

        tracker
            .store(store, asset.data(), ArtifactKind::Frame, asset.mime_type())
            .await
    }
}
