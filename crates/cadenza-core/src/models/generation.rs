use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use utoipa::ToSchema;

pub const DEFAULT_WEIGHT: f64 = 0.65;
pub const DEFAULT_MODEL: &str = "V5";

/// Lifecycle state of a generation task as reported by the reconciler.
///
/// The provider may report states beyond the four we know about
/// (e.g. `TEXT_SUCCESS`); those are carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationStatus {
    Pending,
    Success,
    Failed,
    Unknown,
    Other(String),
}

impl GenerationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GenerationStatus::Pending => "PENDING",
            GenerationStatus::Success => "SUCCESS",
            GenerationStatus::Failed => "FAILED",
            GenerationStatus::Unknown => "UNKNOWN",
            GenerationStatus::Other(s) => s,
        }
    }
}

impl From<&str> for GenerationStatus {
    fn from(s: &str) -> Self {
        match s {
            "PENDING" => GenerationStatus::Pending,
            "SUCCESS" => GenerationStatus::Success,
            "FAILED" => GenerationStatus::Failed,
            "UNKNOWN" => GenerationStatus::Unknown,
            other => GenerationStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GenerationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GenerationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(GenerationStatus::from(s.as_str()))
    }
}

/// User-supplied tuning for a cover generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub prompt: String,
    pub weirdness_constraint: f64,
    pub style_weight: f64,
    pub audio_weight: f64,
    pub model: String,
    pub instrumental: bool,
}

impl GenerationParams {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            weirdness_constraint: DEFAULT_WEIGHT,
            style_weight: DEFAULT_WEIGHT,
            audio_weight: DEFAULT_WEIGHT,
            model: DEFAULT_MODEL.to_string(),
            instrumental: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStatusResponse {
    #[schema(value_type = String, example = "PENDING")]
    pub status: GenerationStatus,
    #[schema(value_type = Object)]
    pub data: Value,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerationDetailsResponse {
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub status: String,
    #[schema(value_type = Object)]
    pub endpoints: Value,
}
