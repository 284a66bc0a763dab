//! Application setup and initialization
//!
//! Everything `main` needs to turn a [`Config`] into a running router, kept
//! here so integration tests can build the same application.

pub mod provider;
pub mod routes;
pub mod server;
pub mod storage;

use crate::services::{spawn_retention_task, CallbackStore};
use crate::state::AppState;
use anyhow::{Context, Result};
use cadenza_core::Config;
use std::sync::Arc;
use std::time::Duration;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment(),
        public_base_url = %config.public_base_url(),
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&config).await?;
    let provider = provider::setup_provider(&config)?;

    let callbacks = CallbackStore::new();
    if config.callback_retention_secs() > 0 {
        spawn_retention_task(
            callbacks.clone(),
            Duration::from_secs(config.callback_retention_secs()),
        );
    }

    let state = Arc::new(AppState::new(config.clone(), storage, provider, callbacks));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
