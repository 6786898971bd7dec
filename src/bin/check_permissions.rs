use dotenvy::dotenv;
use rust_file_relay::config::RelayConfig;
use rust_file_relay::infrastructure::storage;
use rust_file_relay::services::storage::{StorageError, StorageService, UploadMetadata};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PROBE_CONTENT: &[u8] = b"This is a test file for permission testing";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "check_permissions=info,rust_file_relay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🔑 Checking bucket permissions...");

    let config = RelayConfig::from_env();
    let storage = storage::setup_storage(&config).await?;

    if let Err(e) = run_checks(storage.as_ref()).await {
        error!("❌ Permission check failed: {}", e);
        if let Some(hint) = hint_for(&e) {
            error!("{}", hint);
        }
        std::process::exit(1);
    }

    info!("🎉 All permission checks passed!");
    Ok(())
}

async fn run_checks(storage: &dyn StorageService) -> Result<(), StorageError> {
    info!("1. Listing objects...");
    let objects = storage.list(5).await?;
    info!("✅ List permission OK ({} objects visible)", objects.len());

    info!("2. Uploading a probe object...");
    let key = format!(
        "test/test-permission-{}.txt",
        chrono::Utc::now().timestamp_millis()
    );
    let put = storage
        .put_stream(&key, Box::new(PROBE_CONTENT), &UploadMetadata::default())
        .await?;
    info!("✅ Upload permission OK ({})", put.name);

    info!("3. Deleting the probe object...");
    let deleted = storage.delete(&key).await?;
    info!("✅ Delete permission OK (status {})", deleted.status);

    Ok(())
}

/// Maps well-known provider error codes to a configuration hint.
fn hint_for(err: &StorageError) -> Option<&'static str> {
    let message = err.to_string();
    if message.contains("AccessDenied") {
        Some("🔐 Access denied: check the policy attached to these credentials")
    } else if message.contains("NoSuchBucket") {
        Some("📁 Bucket does not exist: check STORAGE_BUCKET")
    } else if message.contains("InvalidAccessKeyId") {
        Some("🔑 Access key is invalid: check STORAGE_ACCESS_KEY")
    } else if message.contains("SignatureDoesNotMatch") {
        Some("🔑 Signature mismatch: check STORAGE_SECRET_KEY")
    } else {
        None
    }
}
