//! Client side of the relay: a typed HTTP client plus the state and behavior of the
//! upload/browse UI (selection, sequential uploads, listing, status feedback).

pub mod display;
pub mod manager;
pub mod relay;
pub mod selection;
pub mod status;

use thiserror::Error;

pub use display::{FileCategory, file_icon, file_type, format_size};
pub use manager::{BrowserState, FileManager};
pub use relay::{DeleteReply, RelayApi, RelayClient};
pub use selection::{PendingUpload, Selection};
pub use status::{Severity, StatusBanner, StatusMessage};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay answered, but not with success.
    #[error("{0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid relay URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
