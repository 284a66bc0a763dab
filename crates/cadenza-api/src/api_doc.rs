//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use cadenza_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cadenza API",
        version = "0.1.0",
        description = "Relay for AI cover generation: upload a source track, receive provider callbacks, and poll generation status."
    ),
    paths(
        handlers::cover_upload::upload_cover,
        handlers::callback::suno_callback,
        handlers::generation::generation_status,
        handlers::generation::generation_details,
    ),
    components(schemas(
        models::TaskResponse,
        models::GenerationStatusResponse,
        models::GenerationDetailsResponse,
        models::CallbackAck,
        models::ServiceInfo,
        error::ErrorResponse,
        error::MessageResponse,
    )),
    tags(
        (name = "generation", description = "Cover upload, callbacks and task status")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_relay_paths() {
        let spec = get_openapi_spec();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/api/upload-cover"));
        assert!(paths.iter().any(|p| *p == "/api/suno-callback"));
        assert!(paths.iter().any(|p| *p == "/api/generation-status/{task_id}"));
        assert!(paths.iter().any(|p| *p == "/api/generation-details/{task_id}"));
    }
}
