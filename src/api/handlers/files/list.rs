use crate::AppState;
use crate::api::error::{ApiError, AppError, Surface};
use axum::{Json, extract::State};

use super::types::*;

#[utoipa::path(
    get,
    path = "/listFiles",
    responses(
        (status = 200, description = "Objects in the bucket, at most one page", body = ListFilesResponse),
        (status = 500, description = "Storage listing failed")
    ),
    tag = "files"
)]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<ListFilesResponse>, ApiError> {
    let files = state
        .storage
        .list(state.config.list_max_keys)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch file list", e).on(Surface::Listing))?;

    tracing::debug!("Listed {} objects", files.len());

    Ok(Json(ListFilesResponse { files }))
}
