//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement,
//! and the staged upload handle used to stream request bodies to disk.

use async_trait::async_trait;
use cadenza_core::AppError;
use tempfile::TempPath;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File size exceeds maximum allowed size of {limit_bytes} bytes")]
    FileTooLarge { limit_bytes: u64 },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::FileTooLarge { limit_bytes } => AppError::PayloadTooLarge(format!(
                "File size exceeds maximum allowed size of {}MB",
                limit_bytes / (1024 * 1024)
            )),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// A permanently stored upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size_bytes: u64,
}

/// An in-progress upload written to a scoped temp file.
///
/// The temp file is deleted when this value is dropped, unless it has been
/// handed to [`Storage::commit`].
pub struct StagedUpload {
    file: File,
    path: TempPath,
    written: u64,
    max_bytes: u64,
}

impl StagedUpload {
    pub(crate) fn new(file: File, path: TempPath, max_bytes: u64) -> Self {
        Self {
            file,
            path,
            written: 0,
            max_bytes,
        }
    }

    /// Append a chunk, failing as soon as the cumulative size crosses the ceiling.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> StorageResult<()> {
        let next = self.written + chunk.len() as u64;
        if next > self.max_bytes {
            return Err(StorageError::FileTooLarge {
                limit_bytes: self.max_bytes,
            });
        }

        self.file.write_all(chunk).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write to {}: {}",
                self.path.display(),
                e
            ))
        })?;
        self.written = next;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    #[cfg(test)]
    pub(crate) fn temp_path(&self) -> &std::path::Path {
        &self.path
    }

    /// Flush and close the file, returning the path guard and size.
    pub(crate) async fn finish(mut self) -> StorageResult<(TempPath, u64)> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        drop(self.file);
        Ok((self.path, self.written))
    }
}

impl std::fmt::Debug for StagedUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedUpload")
            .field("path", &self.path.display().to_string())
            .field("written", &self.written)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

/// Storage abstraction trait
///
/// Backends hand out [`StagedUpload`]s for streaming writes and publish them
/// under a generated key once the caller has validated the rest of the request.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Open a scoped temp file that accepts at most `max_bytes`.
    async fn stage(&self, max_bytes: u64) -> StorageResult<StagedUpload>;

    /// Move a staged upload to its permanent key.
    ///
    /// `extension` is the original file's extension without the dot; it is kept
    /// only when it is a short alphanumeric suffix.
    async fn commit(
        &self,
        staged: StagedUpload,
        extension: Option<&str>,
    ) -> StorageResult<StoredObject>;

    /// Delete a file by its storage key. Deleting a missing key succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Publicly reachable URL for a key
    fn public_url(&self, storage_key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> &'static str;
}

/// Keep an extension only if it is 1-10 ASCII alphanumeric characters.
pub fn sanitize_extension(extension: Option<&str>) -> Option<String> {
    let ext = extension?.trim().trim_start_matches('.');
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_core::ErrorMetadata;

    #[test]
    fn extension_sanitizing() {
        assert_eq!(sanitize_extension(Some("mp3")), Some("mp3".to_string()));
        assert_eq!(sanitize_extension(Some(".WAV")), Some("wav".to_string()));
        assert_eq!(sanitize_extension(Some("tar.gz")), None);
        assert_eq!(sanitize_extension(Some("../x")), None);
        assert_eq!(sanitize_extension(Some("")), None);
        assert_eq!(sanitize_extension(Some("averyverylongext")), None);
        assert_eq!(sanitize_extension(None), None);
    }

    #[test]
    fn file_too_large_maps_to_413() {
        let err: AppError = StorageError::FileTooLarge {
            limit_bytes: 10 * 1024 * 1024,
        }
        .into();
        assert_eq!(err.http_status_code(), 413);
        assert!(err.client_message().contains("10MB"));
    }
}
