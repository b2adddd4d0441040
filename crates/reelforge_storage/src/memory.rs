//! In-memory artifact storage, used for tests and dry runs.

use crate::{ArtifactStore, content_hash};
use reelforge_core::{ArtifactKind, ArtifactRef};
use reelforge_error::{ReelforgeResult, StorageError, StorageErrorKind};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

const BACKEND: &str = "memory";

/// Artifact store keyed by content hash, held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    artifacts: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryArtifactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct artifacts held.
    pub async fn len(&self) -> usize {
        self.artifacts.read().await.len()
    }

    /// True when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.artifacts.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn store(
        &self,
        data: &[u8],
        kind: ArtifactKind,
        mime_type: &str,
    ) -> ReelforgeResult<ArtifactRef> {
        let hash = content_hash(data);
        self.artifacts
            .write()
            .await
            .entry(hash.clone())
            .or_insert_with(|| data.to_vec());

        Ok(ArtifactRef::new(
            kind,
            mime_type,
            hash.clone(),
            data.len() as u64,
            BACKEND,
            hash,
        ))
    }

    async fn retrieve(&self, reference: &ArtifactRef) -> ReelforgeResult<Vec<u8>> {
        self.artifacts
            .read()
            .await
            .get(reference.location())
            .cloned()
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound(reference.location().clone())).into()
            })
    }

    async fn delete(&self, reference: &ArtifactRef) -> ReelforgeResult<()> {
        self.artifacts.write().await.remove(reference.location());
        Ok(())
    }

    async fn exists(&self, reference: &ArtifactRef) -> ReelforgeResult<bool> {
        Ok(self
            .artifacts
            .read()
            .await
            .contains_key(reference.location()))
    }

    fn local_path(&self, _reference: &ArtifactRef) -> Option<PathBuf> {
        None
    }
}
