//! Storyboard and scene records.

use crate::ArtifactRef;
use serde::{Deserialize, Serialize};

/// One beat of LLM output before it becomes a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneBeat {
    /// Narrative text of the beat
    pub narration: String,
    /// Optional visual implied by the beat
    #[serde(default)]
    pub visual: Option<String>,
}

impl SceneBeat {
    /// Create a beat without a visual hint.
    pub fn new(narration: impl Into<String>) -> Self {
        Self {
            narration: narration.into(),
            visual: None,
        }
    }
}

/// Where a scene stands in generation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum SceneStatus {
    /// Not yet generated
    #[default]
    #[display("pending")]
    Pending,
    /// Audio and frame present
    #[display("complete")]
    Complete,
    /// Frame present, narration failed; shown without audio
    #[display("silent")]
    Silent,
    /// No usable frame; excluded from the video
    #[display("failed")]
    Failed,
}

impl SceneStatus {
    /// Scenes that end up in the video.
    pub fn is_usable(&self) -> bool {
        matches!(self, SceneStatus::Complete | SceneStatus::Silent)
    }
}

/// One unit of the storyboard.
///
/// Created empty by the storyboard stage, then filled by scene generation
/// and frame composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Scene {
    index: usize,
    narrative_text: String,
    visual_hint: Option<String>,
    narration: Option<String>,
    image_prompt: String,
    narration_audio: Option<ArtifactRef>,
    audio_duration: Option<f64>,
    illustration: Option<ArtifactRef>,
    frame_image: Option<ArtifactRef>,
    status: SceneStatus,
}

impl Scene {
    /// Create a pending scene stub.
    pub fn new(index: usize, narrative_text: impl Into<String>) -> Self {
        Self {
            index,
            narrative_text: narrative_text.into(),
            visual_hint: None,
            narration: None,
            image_prompt: String::new(),
            narration_audio: None,
            audio_duration: None,
            illustration: None,
            frame_image: None,
            status: SceneStatus::Pending,
        }
    }

    /// Text handed to TTS: the refined narration, else the narrative text.
    pub fn spoken_text(&self) -> &str {
        self.narration.as_deref().unwrap_or(&self.narrative_text)
    }

    /// Store the TTS-ready narration.
    pub fn set_narration(&mut self, narration: impl Into<String>) {
        self.narration = Some(narration.into());
    }

    /// Store the derived image prompt.
    pub fn set_image_prompt(&mut self, prompt: impl Into<String>) {
        self.image_prompt = prompt.into();
    }

    /// Attach stored narration audio and its length.
    pub fn attach_audio(&mut self, audio: ArtifactRef, duration_seconds: f64) {
        self.narration_audio = Some(audio);
        self.audio_duration = Some(duration_seconds);
    }

    /// Attach the stored illustration.
    pub fn attach_illustration(&mut self, image: ArtifactRef) {
        self.illustration = Some(image);
    }

    /// Attach the rendered frame.
    pub fn attach_frame(&mut self, frame: ArtifactRef) {
        self.frame_image = Some(frame);
    }

    /// Exclude the scene from composition.
    pub fn mark_failed(&mut self) {
        self.status = SceneStatus::Failed;
    }

    /// Settle the status from the attached artifacts.
    ///
    /// A failed scene stays failed. Otherwise a frame with audio is complete,
    /// a frame without audio is silent and a missing frame is failed.
    pub fn settle(&mut self) -> SceneStatus {
        if self.status != SceneStatus::Failed {
            self.status = match (&self.frame_image, &self.narration_audio) {
                (Some(_), Some(_)) => SceneStatus::Complete,
                (Some(_), None) => SceneStatus::Silent,
                (None, _) => SceneStatus::Failed,
            };
        }
        self.status
    }

    /// Every artifact currently attached to the scene.
    pub fn artifacts(&self) -> Vec<&ArtifactRef> {
        [&self.narration_audio, &self.illustration, &self.frame_image]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Drop every attached artifact, e.g. after cancellation.
    pub fn clear_artifacts(&mut self) {
        self.narration_audio = None;
        self.audio_duration = None;
        self.illustration = None;
        self.frame_image = None;
    }
}

/// The ordered narrative decomposition of a topic.
///
/// Indices are always `0..len` in order; construction goes through
/// [`Storyboard::from_beats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Storyboard {
    title: String,
    scenes: Vec<Scene>,
}

impl Storyboard {
    /// Build a storyboard, assigning sequential indices to the beats.
    ///
    /// # Examples
    ///
    /// ```
    /// use reelforge_core::{SceneBeat, Storyboard};
    ///
    /// let board = Storyboard::from_beats("Rust", vec![SceneBeat::new("a"), SceneBeat::new("b")]);
    /// let indices: Vec<usize> = board.scenes().iter().map(|s| *s.index()).collect();
    /// assert_eq!(indices, vec![0, 1]);
    /// ```
    pub fn from_beats(title: impl Into<String>, beats: Vec<SceneBeat>) -> Self {
        let scenes = beats
            .into_iter()
            .enumerate()
            .map(|(index, beat)| {
                let mut scene = Scene::new(index, beat.narration.trim());
                scene.visual_hint = beat.visual.filter(|v| !v.trim().is_empty());
                scene
            })
            .collect();
        Self {
            title: title.into(),
            scenes,
        }
    }

    /// Replace the scene with the same index. Returns false for an unknown index.
    pub fn update_scene(&mut self, scene: Scene) -> bool {
        match self.scenes.get_mut(scene.index) {
            Some(slot) if slot.index == scene.index => {
                *slot = scene;
                true
            }
            _ => false,
        }
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// True when the storyboard has no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}
