use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::get_extension_from_content_type;

/// Subdirectory for in-progress writes. Files only move into a served
/// location after they are fully written and synced.
const TMP_DIR: &str = ".tmp";

/// Reference to a stored artifact, as persisted alongside the owning record
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Public URL the artifact is served under
    pub url: String,
    /// Original filename as uploaded
    pub filename: String,
    /// Path relative to the upload root; the handle used for delete/read
    pub storage_path: String,
}

/// Local-disk artifact store for uploaded PDFs and images
pub struct LocalStore {
    root: PathBuf,
    public_url_prefix: String,
    max_file_size: usize,
}

impl LocalStore {
    pub fn new(config: &StorageConfig, public_base_url: &str) -> Self {
        Self {
            root: config.upload_dir.clone(),
            public_url_prefix: format!("{}{}", public_base_url, config.public_path),
            max_file_size: config.max_file_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Create the upload directory tree if absent. Safe to call repeatedly.
    pub async fn ensure_upload_dir(&self) -> Result<()> {
        let tmp = self.root.join(TMP_DIR);
        fs::create_dir_all(&tmp)
            .await
            .map_err(|e| AppError::storage("create_dir", tmp.display().to_string(), e))?;
        info!("Upload directory ready at {}", self.root.display());
        Ok(())
    }

    /// Persist an uploaded file under `{kind}/{generated name}` and return its
    /// reference. The content is written to a temp name and renamed into
    /// place; callers never observe a partially-written artifact.
    pub async fn store(
        &self,
        kind: &str,
        original_filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredFile> {
        if data.len() > self.max_file_size {
            return Err(AppError::Validation(format!(
                "File too large. Maximum size is {} bytes ({} MB)",
                self.max_file_size,
                self.max_file_size / 1024 / 1024
            )));
        }

        let extension = get_extension_from_content_type(content_type)
            .map(str::to_string)
            .unwrap_or_else(|| {
                original_filename
                    .rsplit('.')
                    .next()
                    .unwrap_or("bin")
                    .to_ascii_lowercase()
            });

        // Timestamp plus UUID keeps names collision-resistant without
        // trusting anything client-supplied.
        let name = format!(
            "{}-{}.{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            Uuid::new_v4(),
            extension
        );
        let storage_path = format!("{}/{}", kind, name);

        let dir = self.root.join(kind);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::storage("create_dir", dir.display().to_string(), e))?;

        let tmp_path = self.root.join(TMP_DIR).join(Uuid::new_v4().to_string());
        let final_path = dir.join(&name);

        let write_result = Self::write_durably(&tmp_path, &data).await;
        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(AppError::storage("write", tmp_path.display().to_string(), e));
        }

        if let Err(e) = fs::rename(&tmp_path, &final_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(AppError::storage(
                "rename",
                final_path.display().to_string(),
                e,
            ));
        }

        debug!("Stored artifact {} ({} bytes)", storage_path, data.len());

        Ok(StoredFile {
            url: format!("{}/{}", self.public_url_prefix, storage_path),
            filename: original_filename.to_string(),
            storage_path,
        })
    }

    async fn write_durably(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Read a stored artifact back. `NotFound` when the file is gone.
    pub async fn read(&self, storage_path: &str) -> Result<Vec<u8>> {
        let path = self.resolve(storage_path)?;
        fs::read(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::NotFound(format!("Stored file {} not found", storage_path))
            } else {
                AppError::storage("read", path.display().to_string(), e)
            }
        })
    }

    /// Remove a stored artifact. A missing file counts as success so cleanup
    /// paths stay idempotent.
    pub async fn delete(&self, storage_path: &str) -> Result<()> {
        let path = self.resolve(storage_path)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted artifact {}", storage_path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::storage("remove", path.display().to_string(), e)),
        }
    }

    /// Remove a stored artifact, logging instead of failing. Used when the
    /// owning database record is already gone and a dangling file is a
    /// cleanup-only concern.
    pub async fn delete_best_effort(&self, storage_path: &str) {
        if let Err(e) = self.delete(storage_path).await {
            warn!("Could not delete artifact {}: {}", storage_path, e);
        }
    }

    /// Map a relative storage path back to a location under the upload root,
    /// rejecting anything that would escape it.
    fn resolve(&self, storage_path: &str) -> Result<PathBuf> {
        let relative = Path::new(storage_path);
        let escapes = relative.components().any(|c| {
            !matches!(c, Component::Normal(_))
        });
        if escapes || storage_path.is_empty() {
            return Err(AppError::Internal(format!(
                "Invalid storage path: {}",
                storage_path
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StorageConfig;

    fn temp_store() -> LocalStore {
        let root = std::env::temp_dir().join(format!("jumpstart-store-{}", Uuid::new_v4()));
        let config = StorageConfig {
            upload_dir: root,
            public_path: "/uploads".to_string(),
            max_file_size: 1024,
        };
        LocalStore::new(&config, "http://localhost:4000")
    }

    #[tokio::test]
    async fn test_store_read_delete_roundtrip() {
        let store = temp_store();
        store.ensure_upload_dir().await.unwrap();

        let stored = store
            .store("newsletters", "june.pdf", "application/pdf", b"%PDF-1.4".to_vec())
            .await
            .unwrap();

        assert!(stored.storage_path.starts_with("newsletters/"));
        assert!(stored.storage_path.ends_with(".pdf"));
        assert_eq!(stored.filename, "june.pdf");
        assert_eq!(
            stored.url,
            format!("http://localhost:4000/uploads/{}", stored.storage_path)
        );

        let data = store.read(&stored.storage_path).await.unwrap();
        assert_eq!(data, b"%PDF-1.4");

        store.delete(&stored.storage_path).await.unwrap();
        assert!(matches!(
            store.read(&stored.storage_path).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_store_generates_unique_names() {
        let store = temp_store();
        store.ensure_upload_dir().await.unwrap();

        let a = store
            .store("sections", "photo.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();
        let b = store
            .store("sections", "photo.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();

        assert_ne!(a.storage_path, b.storage_path);
    }

    #[tokio::test]
    async fn test_store_rejects_oversized_file() {
        let store = temp_store();
        store.ensure_upload_dir().await.unwrap();

        let result = store
            .store("sections", "big.png", "image/png", vec![0u8; 2048])
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_absent_file_is_ok() {
        let store = temp_store();
        store.ensure_upload_dir().await.unwrap();

        store.delete("newsletters/nope.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_resolve_rejects_path_traversal() {
        let store = temp_store();
        store.ensure_upload_dir().await.unwrap();

        assert!(store.read("../outside.txt").await.is_err());
        assert!(store.delete("/etc/passwd").await.is_err());
    }
}
