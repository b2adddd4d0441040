//! Storage trait definition.

use reelforge_core::{ArtifactKind, ArtifactRef};
use reelforge_error::ReelforgeResult;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Trait for pluggable artifact storage backends.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Backend name recorded on every reference.
    fn backend_name(&self) -> &'static str;

    /// Store bytes and return a reference.
    async fn store(
        &self,
        data: &[u8],
        kind: ArtifactKind,
        mime_type: &str,
    ) -> ReelforgeResult<ArtifactRef>;

    /// Read the bytes behind a reference.
    async fn retrieve(&self, reference: &ArtifactRef) -> ReelforgeResult<Vec<u8>>;

    /// Delete the bytes behind a reference. Deleting a missing artifact is not an error.
    async fn delete(&self, reference: &ArtifactRef) -> ReelforgeResult<()>;

    /// Check whether the bytes behind a reference exist.
    async fn exists(&self, reference: &ArtifactRef) -> ReelforgeResult<bool>;

    /// Local filesystem path of an artifact, for collaborators that read files.
    ///
    /// Backends without local files return `None`.
    fn local_path(&self, reference: &ArtifactRef) -> Option<PathBuf>;
}

/// SHA-256 of `data` as lowercase hex.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
