use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};

use crate::error::{ProviderError, ProviderResult};
use crate::models::{CoverGenerationRequest, ProviderResponse};

const UPLOAD_COVER_PATH: &str = "/api/v1/generate/upload-cover";
const RECORD_INFO_PATH: &str = "/api/v1/generate/record-info";
const REMAINING_CREDITS_PATH: &str = "/api/v1/generate/remaining-credits";

/// Operations the relay needs from the generation provider.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Submit a cover generation and return the provider task id.
    async fn submit_cover(&self, request: &CoverGenerationRequest) -> ProviderResult<String>;

    /// Fetch the `data` object for a task. Missing data yields an empty object.
    async fn record_info(&self, task_id: &str) -> ProviderResult<Value>;

    /// Remaining account credits, when the provider reports a number.
    async fn remaining_credits(&self) -> ProviderResult<Option<i64>>;
}

/// HTTP client for the Suno API.
pub struct SunoClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl Debug for SunoClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SunoClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SunoClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for Suno API")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> ProviderResult<ProviderResponse> {
        let start = std::time::Instant::now();

        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, operation))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, operation))?;

        tracing::debug!(
            operation,
            http_status = status,
            duration_ms = start.elapsed().as_millis(),
            "Provider call finished"
        );

        ProviderResponse::from_parts(status, &body)
    }
}

#[async_trait]
impl GenerationProvider for SunoClient {
    async fn submit_cover(&self, request: &CoverGenerationRequest) -> ProviderResult<String> {
        tracing::info!(
            model = %request.model,
            instrumental = request.instrumental,
            upload_url = %request.upload_url,
            "Submitting cover generation"
        );

        let response = self
            .read(
                self.http_client.post(self.url(UPLOAD_COVER_PATH)).json(request),
                "upload-cover",
            )
            .await?;

        let data = response
            .into_data()?
            .ok_or(ProviderError::MissingField("data"))?;

        let task_id = data
            .get("taskId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(ProviderError::MissingField("taskId"))?;

        tracing::info!(task_id = %task_id, "Cover generation accepted");
        Ok(task_id.to_string())
    }

    async fn record_info(&self, task_id: &str) -> ProviderResult<Value> {
        let response = self
            .read(
                self.http_client
                    .get(self.url(RECORD_INFO_PATH))
                    .query(&[("taskId", task_id)]),
                "record-info",
            )
            .await?;

        Ok(response
            .into_data()?
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    async fn remaining_credits(&self) -> ProviderResult<Option<i64>> {
        let response = self
            .read(
                self.http_client.get(self.url(REMAINING_CREDITS_PATH)),
                "remaining-credits",
            )
            .await?;

        Ok(response.into_data()?.and_then(|d| d.as_i64()))
    }
}
