//! Service info and health check handlers.

use crate::constants::{
    GENERATION_DETAILS_PATH, GENERATION_STATUS_PATH, SERVICE_NAME, SERVICE_VERSION,
    UPLOAD_COVER_PATH,
};
use axum::Json;
use cadenza_core::ServiceInfo;
use serde_json::json;

/// Liveness/info summary.
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
        status: "running".to_string(),
        endpoints: json!({
            "upload": format!("POST {}", UPLOAD_COVER_PATH),
            "status": format!("GET {}", GENERATION_STATUS_PATH),
            "details": format!("GET {}", GENERATION_DETAILS_PATH),
        }),
    })
}

/// Health check. The relay holds no dependencies to check, so this is a fixed marker.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}
