//! Artifact storage for narration audio, illustrations, frames and videos.
//!
//! Scenes hold [`ArtifactRef`](reelforge_core::ArtifactRef) handles instead
//! of raw bytes; the bytes live in an [`ArtifactStore`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod memory;
mod storage;

pub use filesystem::FileSystemArtifactStore;
pub use memory::InMemoryArtifactStore;
pub use storage::{ArtifactStore, content_hash};
