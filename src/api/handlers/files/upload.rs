use crate::AppState;
use crate::api::error::{ApiError, AppError, Surface};
use crate::services::remote::{open_remote, remote_basename};
use crate::services::staging::{StagedUpload, stage_to_temp};
use crate::services::storage::UploadMetadata;
use crate::utils::naming::upload_key;
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
};
use chrono::Utc;
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use url::Url;
use validator::Validate;

use super::types::*;

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = Multipart, description = "Multipart form with a `file` field"),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadResponse),
        (status = 400, description = "No file in the request"),
        (status = 413, description = "File exceeds the size limit"),
        (status = 500, description = "Storage rejected the upload")
    ),
    tag = "files"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart
        .map_err(|e| AppError::InvalidRequest(e.body_text()).on(Surface::Transfer))?;

    let staged = match receive_file(&state, &mut multipart).await {
        Ok(staged) => staged,
        Err(e) => {
            // Consume the rest of the body so the client sees the error instead of a reset
            tracing::warn!("Upload rejected early: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            return Err(e.on(Surface::Transfer));
        }
    };

    let (original_name, staged) = staged;
    let key = upload_key(&original_name, Utc::now().timestamp_millis());
    tracing::info!("⬆️  Uploading {} ({} bytes)", key, staged.size);

    let result = state
        .storage
        .put_file(&key, staged.path(), &UploadMetadata::default())
        .await;

    // The staged copy goes away whether or not the put succeeded
    staged.discard();

    let stored = result.map_err(|e| AppError::upstream("Upload failed", e).on(Surface::Transfer))?;

    Ok(Json(UploadResponse {
        message: "Upload successful".to_string(),
        url: stored.url,
        name: stored.name,
    }))
}

/// Stages the first `file` field; other fields are skipped.
async fn receive_file(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<(String, StagedUpload), AppError> {
    let mut staged: Option<(String, StagedUpload)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        let err_msg = e.to_string();
        if err_msg.contains("length limit exceeded") {
            AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
        } else {
            AppError::InvalidRequest(err_msg)
        }
    })? {
        if staged.is_some() || field.name() != Some("file") {
            continue;
        }

        let original_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("unnamed")
            .to_string();

        let reader = StreamReader::new(field.map_err(std::io::Error::other));
        let upload = stage_to_temp(&state.config.staging_dir, reader, state.config.max_file_size)
            .await?;

        staged = Some((original_name, upload));
    }

    let (original_name, upload) =
        staged.ok_or_else(|| AppError::InvalidRequest("No file uploaded".to_string()))?;

    if upload.size == 0 {
        upload.discard();
        return Err(AppError::InvalidRequest("Uploaded file is empty".to_string()));
    }

    Ok((original_name, upload))
}

#[utoipa::path(
    post,
    path = "/uploadFromUrl",
    request_body = UploadFromUrlRequest,
    responses(
        (status = 200, description = "Remote file stored", body = UploadResponse),
        (status = 400, description = "Missing or malformed url"),
        (status = 500, description = "Fetch or storage failure")
    ),
    tag = "files"
)]
pub async fn upload_from_url(
    State(state): State<AppState>,
    payload: Result<Json<UploadFromUrlRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let Json(req) = payload
        .map_err(|e| AppError::InvalidRequest(e.body_text()).on(Surface::Transfer))?;

    req.validate()
        .map_err(|e| AppError::InvalidRequest(e.to_string()).on(Surface::Transfer))?;

    let url = req
        .url
        .as_deref()
        .ok_or_else(|| AppError::InvalidRequest("url is required".to_string()))
        .and_then(|raw| {
            Url::parse(raw).map_err(|e| AppError::InvalidRequest(format!("Invalid url: {}", e)))
        })
        .map_err(|e| e.on(Surface::Transfer))?;

    let key = match req.file_name.filter(|name| !name.trim().is_empty()) {
        Some(name) => name,
        None => upload_key(&remote_basename(&url), Utc::now().timestamp_millis()),
    };

    tracing::info!("⬆️  Relaying {} into {}", url, key);

    let reader = open_remote(&state.http, &url)
        .await
        .map_err(|e| AppError::upstream("Upload failed", e).on(Surface::Transfer))?;

    let stored = state
        .storage
        .put_stream(&key, reader, &UploadMetadata::default())
        .await
        .map_err(|e| AppError::upstream("Upload failed", e).on(Surface::Transfer))?;

    Ok(Json(UploadResponse {
        message: "Upload successful".to_string(),
        url: stored.url,
        name: stored.name,
    }))
}
