//! Cadenza Core Library
//!
//! This crate provides configuration, the unified error model and the domain
//! models shared by every cadenza component.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{mask_secret, BaseConfig, Config, RelayConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    CallbackAck, CallbackRecord, CallbackType, GenerationDetailsResponse, GenerationParams,
    GenerationStatus, GenerationStatusResponse, ServiceInfo, TaskResponse,
};
