//! Reelforge - short vertical videos from a topic, a book or a block of text.
//!
//! Reelforge pairs a capability registry (LLM, TTS and image providers behind
//! common traits) with a workflow engine that turns one request into a video:
//!
//! - **Storyboard**: the LLM splits the source into exactly `n` scenes
//! - **Scenes**: narration audio and an illustration per scene, rendered into
//!   a frame, with bounded concurrency and cancellation
//! - **Composition**: usable frames and audio handed to a video encoder in
//!   scene order
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use reelforge::{
//!     CapabilityRegistry, ContentSource, GenerationRequest, InMemoryArtifactStore,
//!     RegisteredCapability, WorkflowEngine, init_tracing,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_tracing(false)?;
//!
//!     let mut registry = CapabilityRegistry::new();
//!     registry.register(RegisteredCapability::llm("my-llm", Arc::new(MyLlm)))?;
//!     registry.register(RegisteredCapability::tts("my-tts", Arc::new(MyTts)))?;
//!     registry.register(RegisteredCapability::image("my-images", Arc::new(MyImages)))?;
//!
//!     let engine = WorkflowEngine::builder()
//!         .registry(Arc::new(registry))
//!         .templates(Arc::new(MyTemplates))
//!         .renderer(Arc::new(MyRenderer))
//!         .encoder(Arc::new(MyEncoder))
//!         .store(Arc::new(InMemoryArtifactStore::new()))
//!         .build()?;
//!
//!     let request = GenerationRequest::builder()
//!         .source(ContentSource::Topic("How bees dance".to_string()))
//!         .frame_template("default")
//!         .build()?;
//!
//!     let result = engine.generate(request).await;
//!     println!("{:?}", result.video_path);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `reelforge_error` - Error kinds and `ReelforgeError`
//! - `reelforge_core` - Scenes, storyboards, requests, results, progress events
//! - `reelforge_interface` - Provider and collaborator traits
//! - `reelforge_rate_limit` - Retry policy, rate limiter, configuration
//! - `reelforge_storage` - Content-addressed artifact storage
//! - `reelforge_pipeline` - Capability registry and workflow engine
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]

mod telemetry;

pub use reelforge_core::*;
pub use reelforge_error::*;
pub use reelforge_interface::*;
pub use reelforge_rate_limit::*;
pub use reelforge_storage::*;

pub use reelforge_pipeline::{
    ArtifactTracker, CapabilityLimiters, CapabilityRegistry, Composition, FIELD_IMAGE,
    FIELD_TEXT, FIELD_TOPIC, FrameComposer, FrameContext, ProviderCaller, SceneContext,
    SceneGenerator, StoryboardProcessor, VideoCompositor, WorkflowEngine,
    WorkflowEngineBuilder, WorkflowRun, bind_template, clean_text, default_output_path,
    extract_json, fetch_book_info, frame_fields, parse_beats, parse_book_info, plan_segments,
    resolve_title,
};

pub use telemetry::{TryInitError, init_tracing, init_tracing_with_filter};
