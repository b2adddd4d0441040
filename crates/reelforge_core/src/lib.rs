//! Core data types for the Reelforge workflow engine.
//!
//! This crate provides the plain data model shared by every other crate:
//! capability keys, storyboards and scenes, generation requests and results,
//! run bookkeeping records and progress events.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod capability;
mod media;
mod options;
mod progress;
mod record;
mod request;
mod result;
mod scene;
mod source;

pub use capability::{CapabilityKey, CapabilityType};
pub use media::{ArtifactKind, ArtifactRef, AudioClip, ImageAsset};
pub use options::{
    BackgroundMusic, BgmMode, CompletionOptions, ImageOptions, ImageStyle, ResponseFormat,
    StylePreset, VideoSettings, VoiceOptions,
};
pub use progress::{ProgressEvent, ProgressKind};
pub use record::{ErrorRecord, FailureKind, StageName, StageStatus};
pub use request::{CapabilitySelection, GenerationRequest, GenerationRequestBuilder};
pub use result::GenerationResult;
pub use scene::{Scene, SceneBeat, SceneStatus, Storyboard};
pub use source::{BookInfo, ContentSource};
