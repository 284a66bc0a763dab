use cadenza_core::GenerationParams;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ProviderError, ProviderResult, UNKNOWN_PROVIDER_ERROR};

const STYLE_MAX_CHARS: usize = 100;
const VOCAL_STYLE: &str = "AI Generated";

/// Provider response body: `{code, msg, data}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Transport status paired with the parsed envelope.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub http_status: u16,
    pub envelope: Envelope,
}

impl ProviderResponse {
    /// Build from a raw HTTP status and body.
    ///
    /// Non-200 bodies are parsed leniently since only `msg` is needed from them.
    pub fn from_parts(http_status: u16, body: &str) -> ProviderResult<Self> {
        let envelope = if http_status == 200 {
            serde_json::from_str::<Envelope>(body)
                .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?
        } else {
            serde_json::from_str::<Envelope>(body).unwrap_or_default()
        };
        Ok(Self {
            http_status,
            envelope,
        })
    }

    fn message(&self) -> String {
        self.envelope
            .msg
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| UNKNOWN_PROVIDER_ERROR.to_string())
    }

    /// Return the envelope `data`, or the matching error when either status is not 200.
    pub fn into_data(self) -> ProviderResult<Option<Value>> {
        if self.http_status != 200 {
            return Err(ProviderError::Transport {
                status: self.http_status,
                message: self.message(),
            });
        }
        if self.envelope.code != Some(200) {
            return Err(ProviderError::Application {
                code: self.envelope.code,
                message: self.message(),
            });
        }
        Ok(self.envelope.data.filter(|d| !d.is_null()))
    }
}

/// Body of `POST /api/v1/generate/upload-cover`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverGenerationRequest {
    pub upload_url: String,
    pub prompt: String,
    pub custom_mode: bool,
    pub instrumental: bool,
    pub model: String,
    pub weirdness_constraint: f64,
    pub style_weight: f64,
    pub audio_weight: f64,
    #[serde(rename = "callBackUrl")]
    pub call_back_url: String,
    pub style: String,
    pub title: String,
}

impl CoverGenerationRequest {
    /// Instrumental covers use the prompt as style. Vocal covers get a fixed
    /// generic style; the prompt is still sent but not used as lyrics.
    pub fn build(params: &GenerationParams, upload_url: String, call_back_url: String) -> Self {
        let tag = short_tag();
        let (style, title) = if params.instrumental {
            (
                params.prompt.chars().take(STYLE_MAX_CHARS).collect(),
                format!("AI Generated Track {}", tag),
            )
        } else {
            (
                VOCAL_STYLE.to_string(),
                format!("AI Generated Song {}", tag),
            )
        };

        Self {
            upload_url,
            prompt: params.prompt.clone(),
            custom_mode: true,
            instrumental: params.instrumental,
            model: params.model.clone(),
            weirdness_constraint: params.weirdness_constraint,
            style_weight: params.style_weight,
            audio_weight: params.audio_weight,
            call_back_url,
            style,
            title,
        }
    }
}

fn short_tag() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
