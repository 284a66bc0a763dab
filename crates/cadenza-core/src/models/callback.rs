use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Discriminator of a provider callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackType {
    Complete,
    Error,
    /// Intermediate stages (`text`, `first`, ...) or anything unrecognised.
    Other(Option<String>),
}

impl CallbackType {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("complete") => CallbackType::Complete,
            Some("error") => CallbackType::Error,
            other => CallbackType::Other(other.map(str::to_string)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CallbackType::Complete => Some("complete"),
            CallbackType::Error => Some("error"),
            CallbackType::Other(raw) => raw.as_deref(),
        }
    }
}

/// Latest callback received for a task. One record per task id; later callbacks overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackRecord {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub callback_type: CallbackType,
    pub payload: Value,
    pub received_at: DateTime<Utc>,
}

/// Acknowledgement returned to the provider for every callback delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CallbackAck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CallbackAck {
    pub fn received() -> Self {
        Self {
            status: "received".to_string(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }
}
