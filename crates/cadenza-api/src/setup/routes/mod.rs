//! Route configuration and setup.

mod health;

use crate::api_doc;
use crate::constants::{
    CALLBACK_PATH, DOCS_PATH, GENERATION_DETAILS_PATH, GENERATION_STATUS_PATH,
    MULTIPART_OVERHEAD_BYTES, OPENAPI_PATH, UPLOADS_PATH, UPLOAD_COVER_PATH,
};
use crate::error::{handle_panic, method_not_allowed, not_found};
use crate::handlers::{callback, cover_upload, generation};
use crate::state::AppState;
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use cadenza_core::Config;
use cadenza_infra::request_id_middleware;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // The file ceiling is enforced while streaming; this only bounds the whole form.
    let upload_body_limit = config.max_file_size_bytes() as usize + MULTIPART_OVERHEAD_BYTES;

    let uploads = ServeDir::new(config.upload_dir())
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    let app = Router::new()
        .route("/", get(health::service_info))
        .route("/health", get(health::health_check))
        .route(
            UPLOAD_COVER_PATH,
            post(cover_upload::upload_cover).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route(CALLBACK_PATH, post(callback::suno_callback))
        .route(GENERATION_STATUS_PATH, get(generation::generation_status))
        .route(GENERATION_DETAILS_PATH, get(generation::generation_details))
        .route(
            OPENAPI_PATH,
            get(|| async { Json(api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path(DOCS_PATH))
        .nest_service(UPLOADS_PATH, uploads)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    tracing::debug!(upload_body_limit, "Routes configured");
    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{}'", o))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
