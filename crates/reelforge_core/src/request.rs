//! Generation requests.

use crate::{BackgroundMusic, CapabilityType, ContentSource, ImageStyle, VoiceOptions};
use reelforge_error::{BuilderError, BuilderErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Per-type capability id overrides for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilitySelection {
    /// LLM capability id
    pub llm: Option<String>,
    /// TTS capability id
    pub tts: Option<String>,
    /// Image capability id
    pub image: Option<String>,
}

impl CapabilitySelection {
    /// The override for a capability type, if any.
    pub fn get(&self, capability_type: CapabilityType) -> Option<&str> {
        match capability_type {
            CapabilityType::Llm => self.llm.as_deref(),
            CapabilityType::Tts => self.tts.as_deref(),
            CapabilityType::Image => self.image.as_deref(),
        }
    }
}

/// A request to turn a topic, book or text into a video.
///
/// # Examples
///
/// ```
/// use reelforge_core::{ContentSource, GenerationRequest};
///
/// let request = GenerationRequest::builder()
///     .source(ContentSource::Topic("Why the sky is blue".to_string()))
///     .n_storyboard(3usize)
///     .frame_template("default")
///     .build()
///     .unwrap();
///
/// assert_eq!(*request.n_storyboard(), 3);
/// ```
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder, derive_getters::Getters,
)]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct GenerationRequest {
    /// Unique id of the run started by this request.
    #[builder(default = Uuid::new_v4())]
    request_id: Uuid,
    /// What the video is about.
    source: ContentSource,
    /// Explicit video title; resolved from the source when absent.
    #[builder(default)]
    title: Option<String>,
    /// Number of storyboard scenes.
    #[builder(default = 5)]
    n_storyboard: usize,
    /// Frame template identifier.
    frame_template: String,
    /// Capability id overrides.
    #[builder(default)]
    capability_selection: CapabilitySelection,
    /// Extra template fields (author, cover, rating, ...).
    #[builder(default)]
    ext: BTreeMap<String, serde_json::Value>,
    /// TTS voice options.
    #[builder(default)]
    voice: VoiceOptions,
    /// Image style prefix.
    #[builder(default)]
    image_style: Option<ImageStyle>,
    /// Background music.
    #[builder(default)]
    bgm: Option<BackgroundMusic>,
    /// Output video path; generated when absent.
    #[builder(default)]
    output_path: Option<PathBuf>,
}

impl GenerationRequest {
    /// Start building a request.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }

    /// Check the request before any work starts.
    ///
    /// # Errors
    ///
    /// Returns an error when the scene count is zero, the source is blank
    /// or the frame template id is empty.
    pub fn validate(&self) -> Result<(), BuilderError> {
        if self.n_storyboard == 0 {
            return Err(BuilderError::new(BuilderErrorKind::ValidationFailed(
                "n_storyboard must be greater than zero".to_string(),
            )));
        }
        if self.source.is_blank() {
            return Err(BuilderError::new(BuilderErrorKind::ValidationFailed(
                "content source is empty".to_string(),
            )));
        }
        if self.frame_template.trim().is_empty() {
            return Err(BuilderError::new(BuilderErrorKind::MissingField(
                "frame_template".to_string(),
            )));
        }
        Ok(())
    }
}

impl GenerationRequestBuilder {
    /// Build and validate the request.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or validation fails.
    pub fn build(&self) -> Result<GenerationRequest, BuilderError> {
        let request = self
            .build_internal()
            .map_err(|e| BuilderError::new(BuilderErrorKind::MissingField(e.to_string())))?;
        request.validate()?;
        Ok(request)
    }
}
