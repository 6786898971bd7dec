use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, ObjectCannedAcl, StorageClass};
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use utoipa::ToSchema;

/// Characters left as-is when a key segment is placed in a URL path.
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Request(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    fn sdk<E, R>(operation: &str, err: SdkError<E, R>) -> Self
    where
        E: std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        StorageError::Request(format!("{} failed: {}", operation, DisplayErrorContext(err)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageTier {
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAcl {
    Private,
}

/// Headers sent with every put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadMetadata {
    pub storage_tier: StorageTier,
    pub acl: ObjectAcl,
    pub forbid_overwrite: bool,
}

impl Default for UploadMetadata {
    fn default() -> Self {
        Self {
            storage_tier: StorageTier::Standard,
            acl: ObjectAcl::Private,
            forbid_overwrite: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PutResult {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredObject {
    pub name: String,
    pub size: i64,
    #[serde(rename = "lastModified")]
    pub last_modified: Option<DateTime<Utc>>,
}

pub struct ObjectDownload {
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeleteResult {
    pub name: String,
    pub status: u16,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        metadata: &UploadMetadata,
    ) -> Result<PutResult, StorageError>;

    /// Streams `reader` into `key` holding at most one part in memory.
    async fn put_stream<'a>(
        &self,
        key: &str,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
        metadata: &UploadMetadata,
    ) -> Result<PutResult, StorageError>;

    async fn list(&self, max_keys: i32) -> Result<Vec<StoredObject>, StorageError>;

    /// Fails with [`StorageError::NotFound`] when the key is absent.
    async fn get_object_stream(&self, key: &str) -> Result<ObjectDownload, StorageError>;

    async fn delete(&self, key: &str) -> Result<DeleteResult, StorageError>;

    /// Cheap reachability check used by the health endpoint.
    async fn probe(&self) -> Result<(), StorageError>;
}

pub struct S3StorageService {
    client: Client,
    bucket: String,
    public_base_url: String,
    part_size: usize,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String, public_base_url: String, part_size: usize) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            part_size,
        }
    }

    fn result_for(&self, key: &str) -> PutResult {
        PutResult {
            url: object_url(&self.public_base_url, key),
            name: key.to_string(),
        }
    }

    async fn put_bytes(
        &self,
        key: &str,
        body: ByteStream,
        metadata: &UploadMetadata,
    ) -> Result<(), StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .storage_class(storage_class(metadata.storage_tier))
            .acl(canned_acl(metadata.acl));

        if metadata.forbid_overwrite {
            request = request.if_none_match("*");
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::sdk("PutObject", e))?;
        Ok(())
    }

    async fn put_multipart<'a>(
        &self,
        key: &str,
        first_part: Vec<u8>,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
        metadata: &UploadMetadata,
    ) -> Result<(), StorageError> {
        let multipart_upload_res = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .storage_class(storage_class(metadata.storage_tier))
            .acl(canned_acl(metadata.acl))
            .send()
            .await
            .map_err(|e| StorageError::sdk("CreateMultipartUpload", e))?;

        let upload_id = multipart_upload_res
            .upload_id()
            .ok_or_else(|| StorageError::Request("No upload ID".to_string()))?
            .to_string();

        let parts = async {
            let mut completed_parts = Vec::new();
            let mut part = first_part;
            let mut part_number = 1;

            while !part.is_empty() {
                let upload_part_res = self
                    .client
                    .upload_part()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .body(ByteStream::from(part))
                    .part_number(part_number)
                    .send()
                    .await
                    .map_err(|e| StorageError::sdk("UploadPart", e))?;

                completed_parts.push(
                    CompletedPart::builder()
                        .e_tag(upload_part_res.e_tag().unwrap_or_default())
                        .part_number(part_number)
                        .build(),
                );

                part_number += 1;
                part = read_part(&mut reader, self.part_size).await?;
            }

            Ok::<_, StorageError>(completed_parts)
        }
        .await;

        let completed = match parts {
            Ok(parts) => {
                let mut request = self
                    .client
                    .complete_multipart_upload()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    );
                if metadata.forbid_overwrite {
                    request = request.if_none_match("*");
                }
                request
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|e| StorageError::sdk("CompleteMultipartUpload", e))
            }
            Err(e) => Err(e),
        };

        if completed.is_err() {
            if let Err(e) = self
                .client
                .abort_multipart_upload()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(&upload_id)
                .send()
                .await
            {
                tracing::warn!(
                    "Failed to abort multipart upload {} for {}: {}",
                    upload_id,
                    key,
                    DisplayErrorContext(e)
                );
            }
        }

        completed
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        metadata: &UploadMetadata,
    ) -> Result<PutResult, StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::Request(format!("Failed to open staged file: {}", e)))?;

        self.put_bytes(key, body, metadata).await?;
        Ok(self.result_for(key))
    }

    async fn put_stream<'a>(
        &self,
        key: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
        metadata: &UploadMetadata,
    ) -> Result<PutResult, StorageError> {
        let first_part = read_part(&mut reader, self.part_size).await?;

        // Anything that fits in one part goes up as a single PutObject.
        if first_part.len() < self.part_size {
            self.put_bytes(key, ByteStream::from(first_part), metadata)
                .await?;
        } else {
            self.put_multipart(key, first_part, reader, metadata).await?;
        }

        Ok(self.result_for(key))
    }

    async fn list(&self, max_keys: i32) -> Result<Vec<StoredObject>, StorageError> {
        let res = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| StorageError::sdk("ListObjectsV2", e))?;

        Ok(res
            .contents()
            .iter()
            .filter_map(|object| {
                let name = object.key()?.to_string();
                let last_modified = object.last_modified().map(|d| {
                    DateTime::from_timestamp(d.secs(), d.subsec_nanos()).unwrap_or_default()
                });
                Some(StoredObject {
                    name,
                    size: object.size().unwrap_or(0),
                    last_modified,
                })
            })
            .collect())
    }

    async fn get_object_stream(&self, key: &str) -> Result<ObjectDownload, StorageError> {
        let res = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(output) => Ok(ObjectDownload {
                content_length: output.content_length().and_then(|n| u64::try_from(n).ok()),
                body: output.body,
            }),
            Err(e) => {
                let status = e.raw_response().map(|r| r.status().as_u16());
                let missing = status == Some(404)
                    || e.as_service_error().is_some_and(|se| se.is_no_such_key());
                if missing {
                    Err(StorageError::NotFound(key.to_string()))
                } else {
                    Err(StorageError::sdk("GetObject", e))
                }
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<DeleteResult, StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::sdk("DeleteObject", e))?;

        // DeleteObject answers 204 on success, whether or not the key existed.
        Ok(DeleteResult {
            name: key.to_string(),
            status: 204,
        })
    }

    async fn probe(&self) -> Result<(), StorageError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::sdk("HeadBucket", e))?;
        Ok(())
    }
}

fn storage_class(tier: StorageTier) -> StorageClass {
    match tier {
        StorageTier::Standard => StorageClass::Standard,
    }
}

fn canned_acl(acl: ObjectAcl) -> ObjectCannedAcl {
    match acl {
        ObjectAcl::Private => ObjectCannedAcl::Private,
    }
}

/// Fills a buffer of up to `part_size` bytes; a short buffer means the reader is exhausted.
async fn read_part<R>(reader: &mut R, part_size: usize) -> Result<Vec<u8>, StorageError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; part_size];
    let mut n = 0;
    while n < part_size {
        let read = reader.read(&mut buffer[n..]).await?;
        if read == 0 {
            break;
        }
        n += read;
    }
    buffer.truncate(n);
    Ok(buffer)
}

/// Public URL of `key` under `base`, encoding each path segment.
pub fn object_url(base: &str, key: &str) -> String {
    let encoded = key
        .split('/')
        .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", base.trim_end_matches('/'), encoded)
}
