//! Route paths and limits shared by routing, handlers and the OpenAPI document.

pub const SERVICE_NAME: &str = "Cadenza Music Generation Relay";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const UPLOAD_COVER_PATH: &str = "/api/upload-cover";
pub const CALLBACK_PATH: &str = "/api/suno-callback";
pub const GENERATION_STATUS_PATH: &str = "/api/generation-status/{task_id}";
pub const GENERATION_DETAILS_PATH: &str = "/api/generation-details/{task_id}";
pub const UPLOADS_PATH: &str = "/uploads";
pub const OPENAPI_PATH: &str = "/api/openapi.json";
pub const DOCS_PATH: &str = "/docs";

/// Headroom on top of the file ceiling for multipart boundaries and text fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
