mod common;

use common::{MockStorageService, spawn_relay, test_state};
use rust_file_relay::client::{
    ClientError, FileManager, PendingUpload, RelayApi, RelayClient, Severity,
};
use std::sync::Arc;
use tempfile::TempDir;

/// The returned staging dir must stay alive as long as the relay is used.
async fn manager_with(storage: Arc<MockStorageService>) -> (FileManager<RelayClient>, TempDir) {
    let (state, staging) = test_state(storage);
    let origin = spawn_relay(state).await;
    (FileManager::new(RelayClient::new(&origin).unwrap()), staging)
}

#[tokio::test]
async fn test_select_upload_list_download_delete() {
    let storage = Arc::new(MockStorageService::new());
    let (mut manager, _staging) = manager_with(storage.clone()).await;

    manager.add_files([
        PendingUpload::new("notes.txt", "text/plain", b"first".to_vec()),
        PendingUpload::new("photo.jpg", "image/jpeg", vec![0xFFu8, 0xD8, 0xFF]),
    ]);
    assert_eq!(manager.state().selection.len(), 2);

    let uploaded = manager.upload_files().await.unwrap();
    assert_eq!(uploaded, 2);
    assert!(manager.state().selection.is_empty());
    assert_eq!(manager.state().listing.len(), 2);
    assert_eq!(manager.status().unwrap().severity, Severity::Success);

    let notes = manager
        .state()
        .listing
        .iter()
        .find(|f| f.name.ends_with("_notes.txt"))
        .map(|f| f.name.clone())
        .unwrap();

    let mut sink = Vec::new();
    let written = manager.download_file(&notes, &mut sink).await.unwrap();
    assert_eq!(written, 5);
    assert_eq!(sink, b"first");

    let deleted = manager.delete_file(&notes, |_| true).await.unwrap();
    assert!(deleted);
    assert_eq!(manager.state().listing.len(), 1);
    assert!(storage.get(&notes).is_none());
}

#[tokio::test]
async fn test_failed_upload_keeps_selection_and_reports_server_message() {
    let storage = Arc::new(MockStorageService::failing());
    let (mut manager, _staging) = manager_with(storage).await;
    manager.add_files([PendingUpload::new("a.txt", "", b"a".to_vec())]);

    let err = manager.upload_files().await.unwrap_err();

    assert!(matches!(err, ClientError::Rejected(ref msg) if msg == "Upload failed"));
    assert_eq!(manager.state().selection.len(), 1);
    assert_eq!(manager.status().unwrap().severity, Severity::Error);
}

#[tokio::test]
async fn test_download_of_missing_key_is_rejected() {
    let storage = Arc::new(MockStorageService::new());
    let (mut manager, _staging) = manager_with(storage).await;

    let mut sink = Vec::new();
    let err = manager
        .download_file("uploads/none.txt", &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Rejected(ref msg) if msg == "not found"));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_client_accepts_origin_with_trailing_slash() {
    let storage = Arc::new(MockStorageService::new());
    storage.insert("uploads/1_a.txt", b"abc");
    let (state, _staging) = test_state(storage);
    let origin = spawn_relay(state).await;

    let client = RelayClient::new(&format!("{}/", origin)).unwrap();
    let files = client.list_files().await.unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "uploads/1_a.txt");
    assert_eq!(files[0].size, 3);
}
