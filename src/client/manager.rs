use super::ClientError;
use super::display::format_size;
use super::relay::RelayApi;
use super::selection::{PendingUpload, Selection};
use super::status::{StatusBanner, StatusMessage};
use crate::api::handlers::files::UploadResponse;
use crate::services::storage::StoredObject;
use tokio::io::AsyncWrite;

/// Everything the upload/browse view renders.
#[derive(Debug, Clone, Default)]
pub struct BrowserState {
    pub selection: Selection,
    /// Last listing fetched from the relay
    pub listing: Vec<StoredObject>,
    pub is_uploading: bool,
    pub is_dragging: bool,
    /// Remote file to relay via `/uploadFromUrl`
    pub network_url: String,
    /// Optional destination key for the remote file
    pub network_file_name: String,
}

/// Drives the relay on behalf of the view and records the outcome in [`BrowserState`]
/// and the status banner.
pub struct FileManager<A> {
    api: A,
    state: BrowserState,
    status: StatusBanner,
}

impl<A: RelayApi> FileManager<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: BrowserState::default(),
            status: StatusBanner::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut BrowserState {
        &mut self.state
    }

    pub fn status(&self) -> Option<StatusMessage> {
        self.status.current()
    }

    pub fn add_files(&mut self, files: impl IntoIterator<Item = PendingUpload>) -> usize {
        self.state.selection.add_all(files)
    }

    pub fn remove_file(&mut self, index: usize) -> Option<PendingUpload> {
        self.state.selection.remove(index)
    }

    pub fn clear_selected(&mut self) {
        self.state.selection.clear();
    }

    pub fn drag_enter(&mut self) {
        self.state.is_dragging = true;
    }

    pub fn drag_over(&mut self) {
        self.state.is_dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.state.is_dragging = false;
    }

    pub fn drop_files(&mut self, files: impl IntoIterator<Item = PendingUpload>) -> usize {
        self.state.is_dragging = false;
        self.add_files(files)
    }

    /// Uploads the selection one file at a time, in selection order. The first
    /// failure stops the batch and leaves the selection in place.
    pub async fn upload_files(&mut self) -> Result<usize, ClientError> {
        if self.state.selection.is_empty() {
            let err = ClientError::Rejected("Select at least one file to upload".to_string());
            self.status.error(err.to_string());
            return Err(err);
        }

        self.state.is_uploading = true;
        tracing::info!(
            "Uploading {} files ({})",
            self.state.selection.len(),
            format_size(self.state.selection.total_size())
        );

        let mut uploaded = 0;
        let mut outcome = Ok(());
        for file in self.state.selection.files() {
            match self.api.upload(file).await {
                Ok(reply) => {
                    tracing::debug!("Uploaded {} as {}", file.name, reply.name);
                    uploaded += 1;
                }
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }

        self.state.is_uploading = false;

        match outcome {
            Ok(()) => {
                self.status.success("All files uploaded successfully!");
                self.state.selection.clear();
                self.refresh().await;
                Ok(uploaded)
            }
            Err(e) => {
                self.status.error(format!("Upload error: {}", e));
                Err(e)
            }
        }
    }

    pub fn set_network_source(&mut self, url: impl Into<String>, file_name: impl Into<String>) {
        self.state.network_url = url.into();
        self.state.network_file_name = file_name.into();
    }

    pub fn clear_network_url(&mut self) {
        self.state.network_url.clear();
        self.state.network_file_name.clear();
    }

    /// Relays the file at `network_url`, independent of the pending selection.
    pub async fn upload_from_url(&mut self) -> Result<UploadResponse, ClientError> {
        if self.state.network_url.is_empty() {
            let err = ClientError::Rejected("Enter a file URL".to_string());
            self.status.error(err.to_string());
            return Err(err);
        }

        self.state.is_uploading = true;
        let file_name = Some(self.state.network_file_name.as_str()).filter(|n| !n.is_empty());
        let result = self
            .api
            .upload_from_url(&self.state.network_url, file_name)
            .await;
        self.state.is_uploading = false;

        match result {
            Ok(reply) => {
                self.status.success("File uploaded successfully!");
                self.clear_network_url();
                self.refresh().await;
                Ok(reply)
            }
            Err(e) => {
                self.status.error(format!("Upload error: {}", e));
                Err(e)
            }
        }
    }

    /// Replaces the cached listing. On failure the previous listing stays.
    pub async fn list_files(&mut self) -> Result<usize, ClientError> {
        match self.api.list_files().await {
            Ok(files) => {
                self.state.listing = files;
                Ok(self.state.listing.len())
            }
            Err(e) => {
                self.status.error("Failed to fetch file list");
                Err(e)
            }
        }
    }

    async fn refresh(&mut self) {
        if let Err(e) = self.list_files().await {
            tracing::warn!("Listing refresh failed: {}", e);
        }
    }

    /// Deletes `name` once `confirm` agrees. Returns `Ok(false)` when declined.
    pub async fn delete_file<F>(&mut self, name: &str, confirm: F) -> Result<bool, ClientError>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(name) {
            return Ok(false);
        }

        match self.api.delete_file(name).await {
            Ok(reply) if reply.success => {
                self.status.success("File deleted successfully");
                self.refresh().await;
                Ok(true)
            }
            Ok(reply) => {
                let message = reply.message.unwrap_or_default();
                self.status.error(format!("Delete failed: {}", message));
                Err(ClientError::Rejected(message))
            }
            Err(e) => {
                self.status.error("An error occurred while deleting the file");
                Err(e)
            }
        }
    }

    /// Streams `name` into `dest`.
    pub async fn download_file(
        &mut self,
        name: &str,
        dest: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, ClientError> {
        self.status.success(format!("Download started: {}", name));

        self.api.download(name, dest).await.inspect_err(|e| {
            self.status.error(format!("Download failed: {}", e));
        })
    }
}
