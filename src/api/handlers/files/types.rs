use crate::services::storage::{DeleteResult, StoredObject};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
    pub name: String,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UploadFromUrlRequest {
    #[validate(
        required(message = "url is required"),
        url(message = "url must be an absolute URL")
    )]
    pub url: Option<String>,

    /// Destination key; derived from the URL when absent
    #[serde(rename = "fileName", default)]
    #[validate(length(max = 1024, message = "fileName is too long"))]
    pub file_name: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ListFilesResponse {
    pub files: Vec<StoredObject>,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteFileRequest {
    /// Key of the object to delete
    #[serde(rename = "fileName", default)]
    #[schema(value_type = String)]
    pub file_name: Option<serde_json::Value>,
}

impl DeleteFileRequest {
    /// The key, when present as a non-empty string.
    pub fn key(&self) -> Option<&str> {
        self.file_name
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Serialize, ToSchema)]
pub struct DeleteFileResponse {
    pub success: bool,
    pub message: String,
    pub result: DeleteResult,
}
