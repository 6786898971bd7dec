pub mod api;
pub mod client;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::RelayConfig;
use crate::services::storage::StorageService;
use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::files::upload::upload_file,
        api::handlers::files::upload::upload_from_url,
        api::handlers::files::list::list_files,
        api::handlers::files::manage::delete_file_by_name,
        api::handlers::files::download::download_file,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::files::UploadResponse,
            api::handlers::files::UploadFromUrlRequest,
            api::handlers::files::ListFilesResponse,
            api::handlers::files::DeleteFileRequest,
            api::handlers::files::DeleteFileResponse,
            api::handlers::health::HealthResponse,
            services::storage::StoredObject,
            services::storage::DeleteResult,
        )
    ),
    tags(
        (name = "files", description = "Bucket relay endpoints"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageService>,
    /// Client used to fetch remote files for `/uploadFromUrl`
    pub http: reqwest::Client,
    pub config: RelayConfig,
}

impl AppState {
    pub fn new(storage: Arc<dyn StorageService>, config: RelayConfig) -> Self {
        Self {
            storage,
            http: reqwest::Client::new(),
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/upload", post(api::handlers::files::upload_file))
        .route("/uploadFromUrl", post(api::handlers::files::upload_from_url))
        .route("/listFiles", get(api::handlers::files::list_files))
        .route(
            "/deleteFileByName",
            delete(api::handlers::files::delete_file_by_name),
        )
        .route(
            "/download/*fileName",
            get(api::handlers::files::download_file),
        )
        .layer(api::middleware::trace::http_trace_layer())
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            // 10MB of headroom for multipart framing
            state.config.max_file_size.saturating_add(10 * 1024 * 1024),
        ))
        .with_state(state)
}
