#![allow(dead_code)]

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use rust_file_relay::config::RelayConfig;
use rust_file_relay::services::storage::{
    DeleteResult, ObjectDownload, PutResult, StorageError, StorageService, StoredObject,
    UploadMetadata, object_url,
};
use rust_file_relay::{AppState, create_app};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt};

pub const MOCK_BASE_URL: &str = "http://mock-storage/uploads";

/// In-memory bucket. `fail` makes every call answer like a provider rejecting the credentials.
#[derive(Default)]
pub struct MockStorageService {
    pub files: Mutex<BTreeMap<String, Vec<u8>>>,
    pub metadata: Mutex<Vec<UploadMetadata>>,
    /// `max_keys` of every list call
    pub list_limits: Mutex<Vec<i32>>,
    pub fail: AtomicBool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let mock = Self::default();
        mock.fail.store(true, Ordering::SeqCst);
        mock
    }

    pub fn insert(&self, key: &str, data: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Request("AccessDenied: Access Denied".to_string()));
        }
        Ok(())
    }

    fn store(
        &self,
        key: &str,
        data: Vec<u8>,
        metadata: &UploadMetadata,
    ) -> Result<PutResult, StorageError> {
        self.check()?;
        let mut files = self.files.lock().unwrap();
        if metadata.forbid_overwrite && files.contains_key(key) {
            return Err(StorageError::Request(
                "PutObject failed: FileAlreadyExists".to_string(),
            ));
        }
        files.insert(key.to_string(), data);
        self.metadata.lock().unwrap().push(*metadata);
        Ok(PutResult {
            url: object_url(MOCK_BASE_URL, key),
            name: key.to_string(),
        })
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        metadata: &UploadMetadata,
    ) -> Result<PutResult, StorageError> {
        let data = tokio::fs::read(path).await?;
        self.store(key, data, metadata)
    }

    async fn put_stream<'a>(
        &self,
        key: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
        metadata: &UploadMetadata,
    ) -> Result<PutResult, StorageError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        self.store(key, data, metadata)
    }

    async fn list(&self, max_keys: i32) -> Result<Vec<StoredObject>, StorageError> {
        self.list_limits.lock().unwrap().push(max_keys);
        self.check()?;
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .take(max_keys as usize)
            .map(|(name, data)| StoredObject {
                name: name.clone(),
                size: data.len() as i64,
                last_modified: Some(chrono::Utc::now()),
            })
            .collect())
    }

    async fn get_object_stream(&self, key: &str) -> Result<ObjectDownload, StorageError> {
        self.check()?;
        let data = self
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(ObjectDownload {
            content_length: Some(data.len() as u64),
            body: ByteStream::from(data),
        })
    }

    async fn delete(&self, key: &str) -> Result<DeleteResult, StorageError> {
        self.check()?;
        self.files.lock().unwrap().remove(key);
        Ok(DeleteResult {
            name: key.to_string(),
            status: 204,
        })
    }

    async fn probe(&self) -> Result<(), StorageError> {
        self.check()
    }
}

/// Relay wired to `storage`, staging into a fresh directory the caller can inspect.
pub fn test_state(storage: Arc<MockStorageService>) -> (AppState, TempDir) {
    let staging = TempDir::new().unwrap();
    let config = RelayConfig {
        staging_dir: staging.path().to_path_buf(),
        max_file_size: 1024 * 1024,
        ..RelayConfig::development()
    };
    (AppState::new(storage, config), staging)
}

pub fn staged_files(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

/// Serves the relay on an ephemeral local port and returns its origin.
pub async fn spawn_relay(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_app(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn multipart_body(boundary: &str, file_name: &str, content: &str) -> String {
    format!(
        "--{boundary}\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
        Content-Type: text/plain\r\n\r\n\
        {content}\r\n\
        --{boundary}--\r\n"
    )
}
