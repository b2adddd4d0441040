//! Provider payloads and stored artifact handles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Synthesized speech returned by a TTS provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct AudioClip {
    data: Vec<u8>,
    mime_type: String,
    duration_seconds: f64,
}

impl AudioClip {
    /// Create an audio clip.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            duration_seconds,
        }
    }

    /// True when the provider returned no audio.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Image bytes returned by an image provider or the frame renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ImageAsset {
    data: Vec<u8>,
    mime_type: String,
    width: u32,
    height: u32,
}

impl ImageAsset {
    /// Create an image asset.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            width,
            height,
        }
    }

    /// True when the provider returned no image data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// What a stored artifact contains.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Generated illustration
    #[display("image")]
    Image,
    /// Narration audio
    #[display("audio")]
    Audio,
    /// Rendered frame
    #[display("frame")]
    Frame,
    /// Final video
    #[display("video")]
    Video,
}

/// Handle to an artifact held by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ArtifactRef {
    id: Uuid,
    kind: ArtifactKind,
    mime_type: String,
    content_hash: String,
    size_bytes: u64,
    backend: String,
    location: String,
}

impl ArtifactRef {
    /// Create a reference with a fresh id.
    pub fn new(
        kind: ArtifactKind,
        mime_type: impl Into<String>,
        content_hash: impl Into<String>,
        size_bytes: u64,
        backend: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            mime_type: mime_type.into(),
            content_hash: content_hash.into(),
            size_bytes,
            backend: backend.into(),
            location: location.into(),
        }
    }
}
