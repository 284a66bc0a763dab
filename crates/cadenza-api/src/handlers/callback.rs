use crate::services::ingest_callback;
use crate::state::GenerationState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use cadenza_core::CallbackAck;

/// Provider webhook. Always answers 200; problems are reported in the body.
#[utoipa::path(
    post,
    path = "/api/suno-callback",
    tag = "generation",
    request_body(content = inline(Object), content_type = "application/json"),
    responses(
        (status = 200, description = "Callback acknowledged", body = CallbackAck)
    )
)]
#[tracing::instrument(skip(state, body), fields(operation = "suno_callback"))]
pub async fn suno_callback(
    State(state): State<GenerationState>,
    body: Result<Bytes, BytesRejection>,
) -> Json<CallbackAck> {
    let ack = match body {
        Ok(body) => ingest_callback(&state.callbacks, &body).await,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Failed to read callback body");
            CallbackAck::error(rejection.body_text())
        }
    };
    Json(ack)
}
