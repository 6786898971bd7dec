use crate::api::error::AppError;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

/// An upload buffered to local disk. The file is removed when this is dropped.
pub struct StagedUpload {
    file: NamedTempFile,
    pub size: u64,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Removes the temporary file, logging instead of failing.
    pub fn discard(self) {
        let path = self.file.path().to_owned();
        if let Err(e) = self.file.close() {
            tracing::warn!("Failed to remove staged file {}: {}", path.display(), e);
        }
    }
}

/// Copies `reader` into a fresh temporary file under `staging_dir`, enforcing `max_size`.
pub async fn stage_to_temp<R>(
    staging_dir: &Path,
    mut reader: R,
    max_size: usize,
) -> Result<StagedUpload, AppError>
where
    R: AsyncRead + Unpin,
{
    let temp_file = tempfile::Builder::new()
        .prefix("relay-")
        .tempfile_in(staging_dir)
        .map_err(|e| AppError::Internal(format!("Failed to create staging file: {}", e)))?;
    let mut temp_file_async = tokio::fs::File::from_std(
        temp_file
            .reopen()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    );

    let mut buffer = [0u8; 8192];
    let mut total_size: u64 = 0;

    loop {
        let n = reader.read(&mut buffer).await.map_err(read_error)?;
        if n == 0 {
            break;
        }
        total_size += n as u64;
        if total_size > max_size as u64 {
            // temp_file drops here and takes the partial payload with it
            return Err(AppError::PayloadTooLarge(
                "File size limits exceeded".to_string(),
            ));
        }
        temp_file_async
            .write_all(&buffer[..n])
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }
    temp_file_async
        .flush()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(StagedUpload {
        file: temp_file,
        size: total_size,
    })
}

fn read_error(e: std::io::Error) -> AppError {
    let message = e.to_string();
    if message.contains("length limit exceeded") {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::InvalidRequest(format!("Failed to read upload: {}", message))
    }
}
