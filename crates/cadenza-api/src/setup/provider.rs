//! Provider client setup

use anyhow::Result;
use cadenza_core::Config;
use cadenza_provider::{GenerationProvider, SunoClient};
use std::sync::Arc;
use std::time::Duration;

pub fn setup_provider(config: &Config) -> Result<Arc<dyn GenerationProvider>> {
    let client = SunoClient::new(
        config.suno_api_base_url(),
        config.suno_api_key(),
        Duration::from_secs(config.provider_timeout_secs()),
    )?;

    tracing::info!(
        base_url = %client.base_url(),
        timeout_secs = config.provider_timeout_secs(),
        "Provider client initialized"
    );

    Ok(Arc::new(client))
}
