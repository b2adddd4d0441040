//! Capability registry and workflow engine for Reelforge.
//!
//! A run takes a [`GenerationRequest`](reelforge_core::GenerationRequest)
//! through three stages:
//!
//! 1. **Storyboard**: the selected LLM turns the topic, book or content into
//!    exactly `n` scene stubs ([`StoryboardProcessor`]). Books are described
//!    first ([`fetch_book_info`]) so the prompt and frames can use the details.
//! 2. **Scenes**: each scene is processed by its own task, at most
//!    `max_concurrent_scenes` at a time. A task refines narration, derives an
//!    image prompt, runs TTS and image generation side by side
//!    ([`SceneGenerator`]) and renders the frame ([`FrameComposer`]).
//! 3. **Composition**: usable scenes are handed to the encoder in index
//!    order ([`VideoCompositor`]).
//!
//! The [`WorkflowEngine`] owns the [`WorkflowRun`] record; scene tasks report
//! back to it and never mutate it directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifacts;
mod caller;
mod compositor;
mod extraction;
mod frame;
pub mod prompts;
mod registry;
mod run;
mod scene;
mod storyboard;
mod workflow;

pub use artifacts::ArtifactTracker;
pub use caller::{CapabilityLimiters, ProviderCaller};
pub use compositor::{Composition, VideoCompositor, default_output_path, plan_segments};
pub use extraction::{clean_text, extract_json, parse_beats, parse_book_info};
pub use frame::{
    FIELD_IMAGE, FIELD_TEXT, FIELD_TOPIC, FrameComposer, FrameContext, bind_template,
    frame_fields,
};
pub use registry::CapabilityRegistry;
pub use run::WorkflowRun;
pub use scene::{SceneContext, SceneGenerator};
pub use storyboard::{StoryboardProcessor, fetch_book_info, resolve_title};
pub use workflow::{WorkflowEngine, WorkflowEngineBuilder};
