use cadenza_core::AppError;
use thiserror::Error;

pub const UNKNOWN_PROVIDER_ERROR: &str = "Unknown error from provider";

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-200 HTTP status.
    #[error("Provider returned HTTP {status}: {message}")]
    Transport { status: u16, message: String },

    /// HTTP 200 carrying a failing envelope `code`.
    #[error("Provider returned code {code:?}: {message}")]
    Application { code: Option<i64>, message: String },

    #[error("Provider request timed out: {0}")]
    Timeout(String),

    #[error("Failed to reach provider: {0}")]
    Network(String),

    #[error("Provider response is missing `{0}`")]
    MissingField(&'static str),

    #[error("Provider response is not valid JSON: {0}")]
    MalformedResponse(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    pub fn from_reqwest(err: reqwest::Error, operation: &str) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(operation.to_string())
        } else {
            ProviderError::Network(format!("{}: {}", operation, err))
        }
    }

    /// HTTP status of a transport failure, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ProviderError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Transport { status, message } => AppError::UpstreamTransport {
                status: Some(status),
                message,
            },
            ProviderError::Application { code, message } => {
                AppError::UpstreamApplication { code, message }
            }
            ProviderError::Timeout(operation) => AppError::UpstreamTimeout(operation),
            ProviderError::Network(message) => AppError::UpstreamTransport {
                status: None,
                message,
            },
            ProviderError::MissingField(field) => AppError::InternalInconsistency(format!(
                "Provider response is missing {}",
                field
            )),
            ProviderError::MalformedResponse(msg) => AppError::InternalInconsistency(format!(
                "Provider returned an unreadable response: {}",
                msg
            )),
        }
    }
}
