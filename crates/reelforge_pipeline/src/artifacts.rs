//! Per-scene artifact bookkeeping so cancelled work can be discarded.

use reelforge_core::{ArtifactKind, ArtifactRef};
use reelforge_error::ReelforgeResult;
use reelforge_storage::ArtifactStore;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Remembers every artifact stored on behalf of one scene task.
#[derive(Debug, Default)]
pub struct ArtifactTracker {
    stored: Mutex<Vec<ArtifactRef>>,
}

impl ArtifactTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bytes and remember the reference.
    ///
    /// # Errors
    ///
    /// Returns the storage backend's error.
    pub async fn store(
        &self,
        store: &dyn ArtifactStore,
        data: &[u8],
        kind: ArtifactKind,
        mime_type: &str,
    ) -> ReelforgeResult<ArtifactRef> {
        let reference = store.store(data, kind, mime_type).await?;
        // No await between the store returning and the push.
        self.entries().push(reference.clone());
        Ok(reference)
    }

    /// Number of artifacts tracked so far.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// True when nothing was stored.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<ArtifactRef>> {
        self.stored.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delete every tracked artifact. Returns how many were deleted.
    ///
    /// Delete failures are logged and skipped.
    pub async fn release(&self, store: &dyn ArtifactStore) -> usize {
        let references: Vec<ArtifactRef> = self.entries().drain(..).collect();
        let mut released = 0;
        for reference in &references {
            match store.delete(reference).await {
                Ok(()) => released += 1,
                Err(e) => warn!(
                    artifact = %reference.id(),
                    error = %e,
                    "Failed to release artifact"
                ),
            }
        }
        debug!(released, "Released scene artifacts");
        released
    }
}
