//! Storage setup and initialization

use anyhow::{Context, Result};
use cadenza_core::Config;
use cadenza_storage::{LocalStorage, Storage};
use std::sync::Arc;

use crate::constants::UPLOADS_PATH;

/// Create the upload directory and the storage backend serving it.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let base_url = format!("{}{}", config.public_base_url(), UPLOADS_PATH);
    let storage = LocalStorage::new(config.upload_dir(), base_url)
        .await
        .context("Failed to initialize upload storage")?;

    tracing::info!(
        backend = storage.backend_type(),
        upload_dir = %config.upload_dir(),
        "Storage initialized"
    );

    Ok(Arc::new(storage))
}
