//! Application state and sub-state extractors.
//!
//! Handlers extract only the sub-state they need via Axum's `FromRef`.

use axum::extract::FromRef;
use cadenza_core::Config;
use cadenza_provider::GenerationProvider;
use cadenza_storage::Storage;
use std::sync::Arc;

use crate::services::{CallbackStore, StatusReconciler, UploadRelayService};

/// Upload storage and the provider the relay forwards to.
#[derive(Clone)]
pub struct RelayState {
    pub storage: Arc<dyn Storage>,
    pub provider: Arc<dyn GenerationProvider>,
}

/// Callback records plus the provider used when no terminal callback exists.
#[derive(Clone)]
pub struct GenerationState {
    pub callbacks: CallbackStore,
    pub reconciler: StatusReconciler,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub relay: RelayState,
    pub generation: GenerationState,
}

impl AppState {
    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        provider: Arc<dyn GenerationProvider>,
        callbacks: CallbackStore,
    ) -> Self {
        let reconciler = StatusReconciler::new(provider.clone(), callbacks.clone());
        Self {
            config,
            relay: RelayState { storage, provider },
            generation: GenerationState {
                callbacks,
                reconciler,
            },
        }
    }

    pub fn upload_service(&self) -> UploadRelayService {
        UploadRelayService::new(
            self.config.clone(),
            self.relay.storage.clone(),
            self.relay.provider.clone(),
        )
    }
}

impl FromRef<Arc<AppState>> for RelayState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.relay.clone()
    }
}

impl FromRef<Arc<AppState>> for GenerationState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.generation.clone()
    }
}

#[allow(dead_code)]
fn _assert_app_state_send_sync() {
    fn assert<T: Send + Sync>() {}
    assert::<AppState>();
}
