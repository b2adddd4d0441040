//! Per-call options for providers and output settings.

use serde::{Deserialize, Serialize};

/// Hint to the LLM about the expected response shape.
///
/// Providers may ignore the hint; callers always validate the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Free text
    #[default]
    Text,
    /// A JSON document
    Json,
}

/// Options for an LLM completion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_getters::Getters)]
pub struct CompletionOptions {
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    response_format: ResponseFormat,
}

impl CompletionOptions {
    /// Options asking for plain text.
    pub fn text() -> Self {
        Self::default()
    }

    /// Options asking for a JSON document.
    pub fn json() -> Self {
        Self {
            response_format: ResponseFormat::Json,
            ..Self::default()
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the token ceiling.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Voice selection forwarded to the TTS provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_getters::Getters)]
pub struct VoiceOptions {
    voice_id: Option<String>,
    /// Speech rate multiplier, 1.0 is normal speed.
    rate: Option<f32>,
}

impl VoiceOptions {
    /// Create voice options.
    pub fn new(voice_id: Option<String>, rate: Option<f32>) -> Self {
        Self { voice_id, rate }
    }
}

/// Requested image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ImageOptions {
    width: u32,
    height: u32,
}

impl ImageOptions {
    /// Create image options.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self::new(1024, 1024)
    }
}

/// Output video geometry and frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct VideoSettings {
    width: u32,
    height: u32,
    fps: u32,
}

impl VideoSettings {
    /// Create video settings.
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self { width, height, fps }
    }
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self::new(1080, 1920, 30)
    }
}

/// Built-in image style descriptions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum StylePreset {
    /// Black and white matchstick drawings
    #[display("stick_figure")]
    StickFigure,
    /// Clean, uncluttered, soft colors
    #[display("minimal")]
    Minimal,
    /// Sci-fi city, neon, blue and silver
    #[display("futuristic")]
    Futuristic,
    /// Film still look
    #[display("cinematic")]
    Cinematic,
}

impl StylePreset {
    /// The style description prefixed onto image prompts.
    pub fn description(&self) -> &'static str {
        match self {
            StylePreset::StickFigure => {
                "Pure white background, minimalist illustration, matchstick figure style, black and white line drawing, simple clean lines"
            }
            StylePreset::Minimal => {
                "Simple and clean background, minimal design, soft colors, professional look, modern aesthetic, uncluttered composition"
            }
            StylePreset::Futuristic => {
                "Futuristic sci-fi style, high-tech city background, blue and silver tones, technology sense, soft neon lights, cyberpunk aesthetics, digital art, advanced technology"
            }
            StylePreset::Cinematic => {
                "Cinematic lighting, dramatic composition, film grain, professional photography, depth of field, movie still quality"
            }
        }
    }
}

/// Image style requested for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStyle {
    /// One of the built-in presets
    Preset(StylePreset),
    /// Caller supplied description
    Custom(String),
}

impl ImageStyle {
    /// The style description text.
    pub fn description(&self) -> &str {
        match self {
            ImageStyle::Preset(preset) => preset.description(),
            ImageStyle::Custom(text) => text,
        }
    }

    /// Prefix the style onto an image prompt, style first.
    ///
    /// # Examples
    ///
    /// ```
    /// use reelforge_core::ImageStyle;
    ///
    /// let styled = ImageStyle::Custom("watercolor".to_string()).apply("a fox");
    /// assert_eq!(styled, "watercolor, a fox");
    /// ```
    pub fn apply(&self, prompt: &str) -> String {
        let style = self.description().trim();
        if style.is_empty() {
            prompt.to_string()
        } else {
            format!("{}, {}", style, prompt)
        }
    }
}

/// How background music is laid under the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BgmMode {
    /// Play once; silence after the track ends
    #[default]
    Once,
    /// Repeat the track until the video ends
    Loop,
}

/// Optional background music track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct BackgroundMusic {
    path: String,
    volume: f32,
    mode: BgmMode,
}

impl BackgroundMusic {
    /// Create a background track. Volume is clamped to `0.0..=1.0`.
    pub fn new(path: impl Into<String>, volume: f32, mode: BgmMode) -> Self {
        Self {
            path: path.into(),
            volume: volume.clamp(0.0, 1.0),
            mode,
        }
    }

    /// A track played once at the default volume of 0.2.
    pub fn with_defaults(path: impl Into<String>) -> Self {
        Self::new(path, 0.2, BgmMode::Once)
    }
}
