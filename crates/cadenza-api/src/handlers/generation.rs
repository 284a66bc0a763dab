use crate::error::{ErrorResponse, HttpAppError};
use crate::state::GenerationState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use cadenza_core::{GenerationDetailsResponse, GenerationStatusResponse};

#[utoipa::path(
    get,
    path = "/api/generation-status/{task_id}",
    tag = "generation",
    params(
        ("task_id" = String, Path, description = "Task ID returned by upload-cover")
    ),
    responses(
        (status = 200, description = "Current task status", body = GenerationStatusResponse),
        (status = 400, description = "Malformed task id", body = ErrorResponse),
        (status = 502, description = "Provider error", body = ErrorResponse),
        (status = 504, description = "Provider timed out", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "generation_status"))]
pub async fn generation_status(
    State(state): State<GenerationState>,
    task_id: Result<Path<String>, PathRejection>,
) -> Result<Json<GenerationStatusResponse>, HttpAppError> {
    let Path(task_id) = task_id?;
    let status = state.reconciler.reconcile(&task_id).await?;
    Ok(Json(status))
}

#[utoipa::path(
    get,
    path = "/api/generation-details/{task_id}",
    tag = "generation",
    params(
        ("task_id" = String, Path, description = "Task ID returned by upload-cover")
    ),
    responses(
        (status = 200, description = "Provider record for the task", body = GenerationDetailsResponse),
        (status = 400, description = "Malformed task id", body = ErrorResponse),
        (status = 502, description = "Provider error", body = ErrorResponse),
        (status = 504, description = "Provider timed out", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "generation_details"))]
pub async fn generation_details(
    State(state): State<GenerationState>,
    task_id: Result<Path<String>, PathRejection>,
) -> Result<Json<GenerationDetailsResponse>, HttpAppError> {
    let Path(task_id) = task_id?;
    let details = state.reconciler.details(&task_id).await?;
    Ok(Json(details))
}
