//! Layered configuration.
//!
//! Sources, later ones overriding earlier ones:
//! - Bundled defaults (include_str! from reelforge.toml)
//! - User config in the home directory (~/.config/reelforge/reelforge.toml)
//! - User config in the current directory (./reelforge.toml)

use config::{Config, File, FileFormat};
use reelforge_core::{CapabilityType, ImageOptions, VideoSettings};
use reelforge_error::{ConfigError, ReelforgeError, ReelforgeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../reelforge.toml");

/// Pipeline behavior.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Scene tasks allowed in flight at once
    pub max_concurrent_scenes: usize,
    /// LLM attempts for the storyboard, counting reformat retries
    pub storyboard_attempts: usize,
    /// Whether narration text is refined by the LLM before TTS
    pub refine_narration: bool,
    /// Whether book requests ask the LLM for summary, genre and year first
    pub fetch_book_info: bool,
    /// Display time of a scene without narration audio
    pub default_scene_seconds: f64,
    /// Lower word bound for narration
    pub min_narration_words: usize,
    /// Upper word bound for narration
    pub max_narration_words: usize,
    /// Lower word bound for image prompts
    pub min_image_prompt_words: usize,
    /// Upper word bound for image prompts
    pub max_image_prompt_words: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_scenes: 3,
            storyboard_attempts: 3,
            refine_narration: true,
            fetch_book_info: true,
            default_scene_seconds: 3.0,
            min_narration_words: 20,
            max_narration_words: 40,
            min_image_prompt_words: 50,
            max_image_prompt_words: 100,
        }
    }
}

/// Retry schedule for external calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first
    pub max_attempts: usize,
    /// First backoff delay
    pub initial_backoff_ms: u64,
    /// Backoff cap
    pub max_delay_ms: u64,
    /// Randomize delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 1000,
            max_delay_ms: 30_000,
            jitter: true,
        }
    }
}

/// Output video geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frames per second
    pub fps: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
        }
    }
}

/// Generated image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

/// Where videos and intermediate artifacts are written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated videos
    pub directory: PathBuf,
    /// Directory for stored audio, images and frames
    pub artifacts: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            artifacts: PathBuf::from("output/artifacts"),
        }
    }
}

/// Settings for one capability type.
///
/// ```toml
/// [capabilities.llm]
/// default = "openai"
/// rpm = 60
/// max_concurrent = 4
///
/// [capabilities.llm.settings.openai]
/// model = "gpt-4o-mini"
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CapabilityTypeConfig {
    /// Default capability id for this type
    pub default: Option<String>,
    /// Requests per minute across all providers of this type
    pub rpm: Option<u32>,
    /// Concurrent calls across all providers of this type
    pub max_concurrent: Option<u32>,
    /// Opaque settings per capability id
    pub settings: BTreeMap<String, serde_json::Value>,
}

/// Top-level Reelforge configuration.
///
/// # Example
///
/// ```no_run
/// use reelforge_rate_limit::ReelforgeConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ReelforgeConfig::load()?;
/// println!("scene concurrency: {}", config.pipeline.max_concurrent_scenes);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReelforgeConfig {
    /// Pipeline behavior
    pub pipeline: PipelineConfig,
    /// Retry schedule
    pub retry: RetryConfig,
    /// Output video geometry
    pub video: VideoConfig,
    /// Generated image size
    pub image: ImageConfig,
    /// Output locations
    pub output: OutputConfig,
    /// Per capability type settings, keyed by `llm`, `tts` or `image`
    pub capabilities: BTreeMap<String, CapabilityTypeConfig>,
}

impl ReelforgeConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ReelforgeResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ReelforgeError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ReelforgeError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or the merged
    /// configuration fails validation.
    #[instrument]
    pub fn load() -> ReelforgeResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/reelforge/reelforge.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("reelforge").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                ReelforgeError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ReelforgeError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pipeline = &self.pipeline;
        if pipeline.max_concurrent_scenes == 0 {
            return Err(ConfigError::new("pipeline.max_concurrent_scenes must be at least 1"));
        }
        if pipeline.max_concurrent_scenes > Semaphore::MAX_PERMITS {
            return Err(ConfigError::new(format!(
                "pipeline.max_concurrent_scenes must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if pipeline.storyboard_attempts == 0 {
            return Err(ConfigError::new("pipeline.storyboard_attempts must be at least 1"));
        }
        if !(pipeline.default_scene_seconds > 0.0) {
            return Err(ConfigError::new("pipeline.default_scene_seconds must be positive"));
        }
        if pipeline.min_narration_words > pipeline.max_narration_words {
            return Err(ConfigError::new(
                "pipeline.min_narration_words exceeds pipeline.max_narration_words",
            ));
        }
        if pipeline.min_image_prompt_words > pipeline.max_image_prompt_words {
            return Err(ConfigError::new(
                "pipeline.min_image_prompt_words exceeds pipeline.max_image_prompt_words",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::new("retry.max_attempts must be at least 1"));
        }
        if self.video.width == 0 || self.video.height == 0 || self.video.fps == 0 {
            return Err(ConfigError::new("video width, height and fps must be non-zero"));
        }
        if self.image.width == 0 || self.image.height == 0 {
            return Err(ConfigError::new("image width and height must be non-zero"));
        }
        for (name, section) in &self.capabilities {
            if name.parse::<CapabilityType>().is_err() {
                return Err(ConfigError::new(format!(
                    "unknown capability type '{}' in [capabilities]",
                    name
                )));
            }
            if section.max_concurrent == Some(0) {
                return Err(ConfigError::new(format!(
                    "capabilities.{}.max_concurrent must be at least 1",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Settings for a capability type, if configured.
    pub fn capability(&self, capability_type: CapabilityType) -> Option<&CapabilityTypeConfig> {
        self.capabilities.get(&capability_type.to_string())
    }

    /// Configured default id for a capability type.
    pub fn default_capability(&self, capability_type: CapabilityType) -> Option<&str> {
        self.capability(capability_type)
            .and_then(|c| c.default.as_deref())
    }

    /// Opaque settings for one capability.
    pub fn capability_settings(
        &self,
        capability_type: CapabilityType,
        id: &str,
    ) -> Option<&serde_json::Value> {
        self.capability(capability_type)
            .and_then(|c| c.settings.get(id))
    }

    /// Output video settings.
    pub fn video_settings(&self) -> VideoSettings {
        VideoSettings::new(self.video.width, self.video.height, self.video.fps)
    }

    /// Generated image options.
    pub fn image_options(&self) -> ImageOptions {
        ImageOptions::new(self.image.width, self.image.height)
    }
}
