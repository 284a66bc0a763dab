//! Cadenza Infrastructure Library
//!
//! Shared infrastructure for cadenza binaries:
//! - Telemetry initialization (tracing subscriber)
//! - Middleware (request ID)

pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use middleware::request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use telemetry::{init_telemetry, LogFormat};
