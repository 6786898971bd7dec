use crate::AppState;
use crate::api::error::{ApiError, AppError, Surface};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use super::types::*;

#[utoipa::path(
    delete,
    path = "/deleteFileByName",
    request_body = DeleteFileRequest,
    responses(
        (status = 200, description = "Object deleted", body = DeleteFileResponse),
        (status = 400, description = "fileName missing or not a string"),
        (status = 500, description = "Storage rejected the delete")
    ),
    tag = "files"
)]
pub async fn delete_file_by_name(
    State(state): State<AppState>,
    payload: Result<Json<DeleteFileRequest>, JsonRejection>,
) -> Result<Json<DeleteFileResponse>, ApiError> {
    let invalid =
        || AppError::InvalidRequest("Invalid request: fileName is required".to_string()).on(Surface::Deletion);

    let Json(req) = payload.map_err(|_| invalid())?;
    let key = req.key().ok_or_else(invalid)?;

    let result = state
        .storage
        .delete(key)
        .await
        .map_err(|e| AppError::upstream("Failed to delete file", e).on(Surface::Deletion))?;

    tracing::info!("🗑️  Deleted {}", key);

    Ok(Json(DeleteFileResponse {
        success: true,
        message: format!("File {} deleted successfully", key),
        result,
    }))
}
