use super::ClientError;
use super::selection::PendingUpload;
use crate::api::handlers::files::UploadResponse;
use crate::services::storage::StoredObject;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

/// Reply of `/deleteFileByName`, successful or not.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Operations the file manager needs from the relay.
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Resolves only when the relay answered 200 with a `url`.
    async fn upload(&self, file: &PendingUpload) -> Result<UploadResponse, ClientError>;

    async fn upload_from_url(
        &self,
        url: &str,
        file_name: Option<&str>,
    ) -> Result<UploadResponse, ClientError>;

    async fn list_files(&self) -> Result<Vec<StoredObject>, ClientError>;

    async fn delete_file(&self, name: &str) -> Result<DeleteReply, ClientError>;

    /// Streams the object into `dest`, returning the number of bytes written.
    async fn download(
        &self,
        name: &str,
        dest: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, ClientError>;
}

/// HTTP client for a relay at a configurable origin.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base: Url,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    /// `/download/<name>` with the name encoded as a single path segment.
    pub fn download_url(&self, name: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint("download/")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Rejected(format!("{} cannot carry a path", self.base)))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }
}

/// Pulls `message` (or `error`) out of an error body.
fn reason(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

async fn read_upload_reply(response: reqwest::Response) -> Result<UploadResponse, ClientError> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() && body.get("url").is_some_and(Value::is_string) {
        return serde_json::from_value(body)
            .map_err(|e| ClientError::Rejected(format!("Malformed upload reply: {}", e)));
    }

    Err(ClientError::Rejected(
        reason(&body).unwrap_or_else(|| "Upload failed".to_string()),
    ))
}

#[async_trait]
impl RelayApi for RelayClient {
    async fn upload(&self, file: &PendingUpload) -> Result<UploadResponse, ClientError> {
        let mut part = Part::stream_with_length(reqwest::Body::from(file.bytes.clone()), file.size)
            .file_name(file.name.clone());
        if !file.content_type.is_empty() {
            part = part.mime_str(&file.content_type)?;
        }

        let response = self
            .http
            .post(self.endpoint("upload")?)
            .multipart(Form::new().part("file", part))
            .send()
            .await?;

        read_upload_reply(response).await
    }

    async fn upload_from_url(
        &self,
        url: &str,
        file_name: Option<&str>,
    ) -> Result<UploadResponse, ClientError> {
        let mut payload = json!({ "url": url });
        if let Some(name) = file_name.filter(|n| !n.is_empty()) {
            payload["fileName"] = json!(name);
        }

        let response = self
            .http
            .post(self.endpoint("uploadFromUrl")?)
            .json(&payload)
            .send()
            .await?;

        read_upload_reply(response).await
    }

    async fn list_files(&self) -> Result<Vec<StoredObject>, ClientError> {
        #[derive(Deserialize)]
        struct Listing {
            files: Option<Vec<StoredObject>>,
        }

        let listing: Listing = self
            .http
            .get(self.endpoint("listFiles")?)
            .send()
            .await?
            .json()
            .await?;

        listing
            .files
            .ok_or_else(|| ClientError::Rejected("Failed to fetch file list".to_string()))
    }

    async fn delete_file(&self, name: &str) -> Result<DeleteReply, ClientError> {
        let reply = self
            .http
            .delete(self.endpoint("deleteFileByName")?)
            .json(&json!({ "fileName": name }))
            .send()
            .await?
            .json()
            .await?;
        Ok(reply)
    }

    async fn download(
        &self,
        name: &str,
        dest: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, ClientError> {
        let response = self.http.get(self.download_url(name)?).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(ClientError::Rejected(
                reason(&body).unwrap_or_else(|| format!("Download failed with status {}", status)),
            ));
        }

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            dest.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        dest.flush().await?;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_keeps_sub_path() {
        let client = RelayClient::new("http://localhost:3000/relay").unwrap();
        assert_eq!(
            client.endpoint("upload").unwrap().as_str(),
            "http://localhost:3000/relay/upload"
        );
    }

    #[test]
    fn test_download_url_encodes_key_as_one_segment() {
        let client = RelayClient::new("http://localhost:3000").unwrap();
        assert_eq!(
            client.download_url("uploads/1_a b.txt").unwrap().as_str(),
            "http://localhost:3000/download/uploads%2F1_a%20b.txt"
        );
    }

    #[test]
    fn test_reason_prefers_message() {
        assert_eq!(
            reason(&json!({ "message": "Upload failed", "error": "AccessDenied" })).as_deref(),
            Some("Upload failed")
        );
        assert_eq!(reason(&json!({ "error": "not found" })).as_deref(), Some("not found"));
        assert_eq!(reason(&Value::Null), None);
    }
}
