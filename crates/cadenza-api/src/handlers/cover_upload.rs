use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use cadenza_core::TaskResponse;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/upload-cover",
    tag = "generation",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "Fields: file (audio), prompt, weirdnessConstraint, styleWeight, audioWeight, model, instrumental"
    ),
    responses(
        (status = 200, description = "Cover generation submitted", body = TaskResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Inconsistent provider response", body = ErrorResponse),
        (status = 502, description = "Provider rejected the request", body = ErrorResponse),
        (status = 504, description = "Provider timed out", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_cover"))]
pub async fn upload_cover(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TaskResponse>, HttpAppError> {
    let multipart = multipart?;
    let service = state.upload_service();

    let form = service.receive_form(multipart).await?;
    tracing::info!(
        model = %form.params.model,
        instrumental = form.params.instrumental,
        size_bytes = form.staged.bytes_written(),
        "Upload received"
    );

    let task_id = service.relay(form).await?;
    Ok(Json(TaskResponse { task_id }))
}
