//! Generation status reconciliation and details lookup.
//!
//! A terminal callback (`complete` or `error`) answers a status query on its own.
//! Anything else falls back to the provider's record-info endpoint.

use std::sync::Arc;

use cadenza_core::{
    AppError, CallbackRecord, CallbackType, GenerationDetailsResponse, GenerationStatus,
    GenerationStatusResponse,
};
use cadenza_provider::GenerationProvider;
use serde_json::{json, Value};

use super::callback_store::CallbackStore;

const DEFAULT_FAILURE_MESSAGE: &str = "Generation failed";

#[derive(Clone)]
pub struct StatusReconciler {
    provider: Arc<dyn GenerationProvider>,
    callbacks: CallbackStore,
}

impl StatusReconciler {
    pub fn new(provider: Arc<dyn GenerationProvider>, callbacks: CallbackStore) -> Self {
        Self {
            provider,
            callbacks,
        }
    }

    pub async fn reconcile(&self, task_id: &str) -> Result<GenerationStatusResponse, AppError> {
        if let Some(record) = self.callbacks.get(task_id).await {
            if let Some(resolved) = status_from_callback(&record) {
                tracing::debug!(task_id, status = %resolved.status, "Status resolved from callback");
                return Ok(resolved);
            }
        }

        let data = self.provider.record_info(task_id).await?;
        let response = status_from_provider(data);
        tracing::debug!(task_id, status = %response.status, "Status resolved from provider");
        Ok(response)
    }

    /// Provider `data` for a task, verbatim.
    pub async fn details(&self, task_id: &str) -> Result<GenerationDetailsResponse, AppError> {
        let data = self.provider.record_info(task_id).await?;
        Ok(GenerationDetailsResponse { data })
    }
}

/// Terminal answer from a stored callback, or `None` for intermediate callbacks.
pub fn status_from_callback(record: &CallbackRecord) -> Option<GenerationStatusResponse> {
    match record.callback_type {
        CallbackType::Complete => Some(GenerationStatusResponse {
            status: GenerationStatus::Success,
            data: json!({ "callbackData": record.payload }),
            error_message: None,
        }),
        CallbackType::Error => Some(GenerationStatusResponse {
            status: GenerationStatus::Failed,
            data: Value::Null,
            error_message: Some(
                record
                    .message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            ),
        }),
        CallbackType::Other(_) => None,
    }
}

pub fn status_from_provider(data: Value) -> GenerationStatusResponse {
    let status = data
        .get("status")
        .and_then(Value::as_str)
        .map(GenerationStatus::from)
        .unwrap_or(GenerationStatus::Unknown);
    let error_message = data
        .get("errorMessage")
        .and_then(Value::as_str)
        .map(str::to_string);

    GenerationStatusResponse {
        status,
        data,
        error_message,
    }
}
