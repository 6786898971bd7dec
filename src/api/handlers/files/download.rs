use crate::AppState;
use crate::api::error::{ApiError, AppError, Surface};
use crate::services::storage::StorageError;
use crate::utils::naming::attachment_disposition;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

#[utoipa::path(
    get,
    path = "/download/{fileName}",
    params(
        ("fileName" = String, Path, description = "URL-encoded object key")
    ),
    responses(
        (status = 200, description = "Object body as an attachment"),
        (status = 404, description = "No object under that key"),
        (status = 500, description = "Storage failure")
    ),
    tag = "files"
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let download = state
        .storage
        .get_object_stream(&key)
        .await
        .map_err(|e| match e {
            StorageError::NotFound(key) => AppError::NotFound(key),
            other => AppError::upstream("Failed to download file", other),
        })
        .map_err(|e| e.on(Surface::Download))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&attachment_disposition(&key))
            .map_err(|e| AppError::Internal(e.to_string()).on(Surface::Download))?,
    );
    if let Some(length) = download.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    tracing::info!("⬇️  Streaming {} ({:?} bytes)", key, download.content_length);

    // Stream straight from storage, never holding the whole object
    let body = Body::from_stream(ReaderStream::new(download.body.into_async_read()));

    Ok((headers, body).into_response())
}
