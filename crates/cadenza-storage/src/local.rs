use crate::traits::{
    sanitize_extension, StagedUpload, Storage, StorageError, StorageResult, StoredObject,
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

const TEMP_PREFIX: &str = ".upload-";

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Directory uploads are written to (e.g., "./uploads")
    /// * `base_url` - Base URL the directory is served under (e.g., "https://relay.example.com/uploads")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Convert storage key to filesystem path. Keys are flat filenames.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.contains('/')
            || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    fn generate_key(extension: Option<&str>) -> String {
        match sanitize_extension(extension) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn stage(&self, max_bytes: u64) -> StorageResult<StagedUpload> {
        let named = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.base_path)
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create temp file in {}: {}",
                    self.base_path.display(),
                    e
                ))
            })?;

        let (file, path) = named.into_parts();
        tracing::debug!(temp_path = %path.display(), max_bytes, "Staging upload");

        Ok(StagedUpload::new(fs::File::from_std(file), path, max_bytes))
    }

    async fn commit(
        &self,
        staged: StagedUpload,
        extension: Option<&str>,
    ) -> StorageResult<StoredObject> {
        let start = std::time::Instant::now();
        let key = Self::generate_key(extension);
        let target = self.key_to_path(&key)?;

        let (temp_path, size_bytes) = staged.finish().await?;

        // Same directory, so this is a rename rather than a copy.
        temp_path.persist(&target).map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to move upload to {}: {}",
                target.display(),
                e.error
            ))
        })?;

        tracing::info!(
            key = %key,
            size_bytes,
            duration_ms = start.elapsed().as_millis(),
            "File stored locally"
        );

        Ok(StoredObject {
            url: self.public_url(&key),
            key,
            size_bytes,
        })
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %storage_key, "File deleted from local storage");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", self.base_url, storage_key)
    }

    fn backend_type(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage_in(dir: &std::path::Path) -> LocalStorage {
        LocalStorage::new(dir, "http://relay.test/uploads/".to_string())
            .await
            .unwrap()
    }

    fn entries(dir: &std::path::Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_stage_and_commit_preserves_extension() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let mut staged = storage.stage(1024).await.unwrap();
        staged.write_chunk(b"ID3").await.unwrap();
        staged.write_chunk(b"audio-bytes").await.unwrap();
        assert_eq!(staged.bytes_written(), 14);

        let stored = storage.commit(staged, Some("mp3")).await.unwrap();
        assert!(stored.key.ends_with(".mp3"));
        assert_eq!(stored.size_bytes, 14);
        assert_eq!(stored.url, format!("http://relay.test/uploads/{}", stored.key));

        let contents = std::fs::read(dir.path().join(&stored.key)).unwrap();
        assert_eq!(contents, b"ID3audio-bytes");
        assert_eq!(entries(dir.path()), vec![stored.key.clone()]);
        assert!(dir.path().join(&stored.key).is_file());
    }

    #[tokio::test]
    async fn test_oversize_chunk_is_rejected_and_temp_file_removed() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let mut staged = storage.stage(8).await.unwrap();
        staged.write_chunk(b"12345").await.unwrap();
        let err = staged.write_chunk(b"6789").await.unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { limit_bytes: 8 }));

        let temp = staged.temp_path().to_path_buf();
        assert!(temp.exists());
        drop(staged);
        assert!(!temp.exists());
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_exact_ceiling_is_accepted() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let mut staged = storage.stage(4).await.unwrap();
        staged.write_chunk(b"abcd").await.unwrap();
        let stored = storage.commit(staged, None).await.unwrap();
        assert!(!stored.key.contains('.'));
        assert_eq!(stored.size_bytes, 4);
    }

    #[tokio::test]
    async fn test_unsafe_extension_is_dropped() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let staged = storage.stage(4).await.unwrap();
        let stored = storage.commit(staged, Some("mp3/../../x")).await.unwrap();
        assert!(!stored.key.contains('.'));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("nested/file.mp3").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_tolerates_missing() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let mut staged = storage.stage(16).await.unwrap();
        staged.write_chunk(b"data").await.unwrap();
        let stored = storage.commit(staged, Some("wav")).await.unwrap();

        storage.delete(&stored.key).await.unwrap();
        assert!(!dir.path().join(&stored.key).exists());
        assert!(storage.delete(&stored.key).await.is_ok());
    }
}
