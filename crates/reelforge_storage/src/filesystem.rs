//! Filesystem-based artifact storage.

use crate::{ArtifactStore, content_hash};
use reelforge_core::{ArtifactKind, ArtifactRef};
use reelforge_error::{ReelforgeResult, StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};

const BACKEND: &str = "filesystem";

/// Filesystem storage backend.
///
/// Stores artifacts in a content-addressable structure:
/// `{base_path}/{kind}/{hash[0:2]}/{hash[2:4]}/{hash}.{ext}`
///
/// Identical bytes map to the same file, so storing twice is cheap.
#[derive(Debug, Clone)]
pub struct FileSystemArtifactStore {
    base_path: PathBuf,
}

impl FileSystemArtifactStore {
    /// Create a new filesystem store, creating the base directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> ReelforgeResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem artifact store");
        Ok(Self { base_path })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, hash: &str, kind: ArtifactKind, mime_type: &str) -> PathBuf {
        let type_dir = match kind {
            ArtifactKind::Image => "images",
            ArtifactKind::Audio => "audio",
            ArtifactKind::Frame => "frames",
            ArtifactKind::Video => "video",
        };

        let file_name = match extension_for(mime_type) {
            Some(ext) => format!("{}.{}", hash, ext),
            None => hash.to_string(),
        };

        self.base_path
            .join(type_dir)
            .join(&hash[0..2])
            .join(&hash[2..4])
            .join(file_name)
    }

    fn check_backend(reference: &ArtifactRef) -> ReelforgeResult<()> {
        if reference.backend() != BACKEND {
            return Err(StorageError::new(StorageErrorKind::BackendMismatch(format!(
                "expected {}, got {}",
                BACKEND,
                reference.backend()
            )))
            .into());
        }
        Ok(())
    }
}

fn extension_for(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/wav" | "audio/x-wav" => Some("wav"),
        "video/mp4" => Some("mp4"),
        _ => None,
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FileSystemArtifactStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    #[tracing::instrument(skip(self, data), fields(size = data.len(), kind = %kind))]
    async fn store(
        &self,
        data: &[u8],
        kind: ArtifactKind,
        mime_type: &str,
    ) -> ReelforgeResult<ArtifactRef> {
        let hash = content_hash(data);
        let path = self.path_for(&hash, kind, mime_type);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(hash = %hash, path = %path.display(), "Artifact already stored");
        } else {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                        "{}: {}",
                        parent.display(),
                        e
                    )))
                })?;
            }

            // Temp file + rename keeps readers from seeing partial writes.
            let temp_path = path.with_extension("tmp");
            tokio::fs::write(&temp_path, data).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    temp_path.display(),
                    e
                )))
            })?;

            tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "rename {} to {}: {}",
                    temp_path.display(),
                    path.display(),
                    e
                )))
            })?;

            tracing::debug!(hash = %hash, path = %path.display(), "Stored artifact");
        }

        Ok(ArtifactRef::new(
            kind,
            mime_type,
            hash,
            data.len() as u64,
            BACKEND,
            path.to_string_lossy().to_string(),
        ))
    }

    #[tracing::instrument(skip(self, reference), fields(path = %reference.location()))]
    async fn retrieve(&self, reference: &ArtifactRef) -> ReelforgeResult<Vec<u8>> {
        Self::check_backend(reference)?;
        let path = Path::new(reference.location());

        tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(reference.location().clone())).into()
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
                .into()
            }
        })
    }

    #[tracing::instrument(skip(self, reference), fields(path = %reference.location()))]
    async fn delete(&self, reference: &ArtifactRef) -> ReelforgeResult<()> {
        Self::check_backend(reference)?;
        match tokio::fs::remove_file(reference.location()).await {
            Ok(()) => {
                tracing::debug!("Deleted artifact");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileDelete(format!(
                "{}: {}",
                reference.location(),
                e
            )))
            .into()),
        }
    }

    async fn exists(&self, reference: &ArtifactRef) -> ReelforgeResult<bool> {
        Self::check_backend(reference)?;
        Ok(tokio::fs::try_exists(reference.location())
            .await
            .unwrap_or(false))
    }

    fn local_path(&self, reference: &ArtifactRef) -> Option<PathBuf> {
        (reference.backend() == BACKEND).then(|| PathBuf::from(reference.location()))
    }
}
