//! Trait definitions for the Reelforge workflow engine.
//!
//! Providers implement exactly one operation per capability type:
//! [`LlmProvider::complete`], [`TtsProvider::synthesize`] and
//! [`ImageProvider::generate`]. Rendering, template lookup and video
//! encoding are collaborators consumed through their own traits.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod capability;
mod traits;
mod types;

pub use capability::{Capability, RegisteredCapability};
pub use traits::{
    FrameRenderer, ImageProvider, LlmProvider, TemplateStore, TtsProvider, VideoEncoder,
};
pub use types::{EncodeJob, EncodedVideo, RenderRequest, VideoSegment};
