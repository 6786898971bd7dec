use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::fmt::Display;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    /// The storage provider or a remote origin rejected the call.
    #[error("{context}: {detail}")]
    Upstream { context: String, detail: String },

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn upstream(context: impl Into<String>, err: impl Display) -> Self {
        AppError::Upstream {
            context: context.into(),
            detail: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upstream { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attaches the JSON layout of the endpoint family reporting this error.
    pub fn on(self, surface: Surface) -> ApiError {
        ApiError {
            error: self,
            surface,
        }
    }
}

/// Endpoint families, each with its own error body layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// `/upload` and `/uploadFromUrl`: `{message[, error]}`
    Transfer,
    /// `/listFiles`: `{error}`
    Listing,
    /// `/deleteFileByName`: `{success: false, message[, error]}`
    Deletion,
    /// `/download/*`: `{error[, message]}`
    Download,
}

#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    surface: Surface,
}

impl ApiError {
    pub fn error(&self) -> &AppError {
        &self.error
    }

    fn body(&self) -> Value {
        match (self.surface, &self.error) {
            (Surface::Transfer, AppError::Upstream { context, detail }) => {
                json!({ "message": context, "error": detail })
            }
            (Surface::Transfer, AppError::Internal(msg)) => {
                json!({ "message": "Upload failed", "error": msg })
            }
            (
                Surface::Transfer,
                AppError::InvalidRequest(msg) | AppError::NotFound(msg) | AppError::PayloadTooLarge(msg),
            ) => json!({ "message": msg }),

            (Surface::Listing, AppError::Upstream { context, .. }) => json!({ "error": context }),
            (Surface::Listing, other) => json!({ "error": other.to_string() }),

            (Surface::Deletion, AppError::Upstream { context, detail }) => {
                json!({ "success": false, "error": context, "message": detail })
            }
            (Surface::Deletion, AppError::Internal(msg)) => {
                json!({ "success": false, "error": "Failed to delete file", "message": msg })
            }
            (
                Surface::Deletion,
                AppError::InvalidRequest(msg) | AppError::NotFound(msg) | AppError::PayloadTooLarge(msg),
            ) => json!({ "success": false, "message": msg }),

            (Surface::Download, AppError::NotFound(_)) => json!({ "error": "not found" }),
            (Surface::Download, AppError::Upstream { context, detail }) => {
                json!({ "error": context, "message": detail })
            }
            (Surface::Download, other) => json!({ "error": other.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.error {
            AppError::Upstream { context, detail } => {
                tracing::error!("{}: {}", context, detail);
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
            }
            other => {
                tracing::debug!("Request rejected: {}", other);
            }
        }

        (self.error.status(), Json(self.body())).into_response()
    }
}
