use crate::config::RelayConfig;
use crate::services::storage::S3StorageService;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub async fn setup_storage(config: &RelayConfig) -> anyhow::Result<Arc<S3StorageService>> {
    info!(
        "☁️  Object Storage: {} (Bucket: {}, Timeout: {}s)",
        config.storage_endpoint, config.storage_bucket, config.storage_timeout_secs
    );

    let timeouts = TimeoutConfig::builder()
        .operation_timeout(Duration::from_secs(config.storage_timeout_secs))
        .build();

    let aws_config = aws_config::from_env()
        .endpoint_url(&config.storage_endpoint)
        .region(Region::new(config.storage_region.clone()))
        .credentials_provider(aws_sdk_s3::config::Credentials::new(
            config.storage_access_key.clone(),
            config.storage_secret_key.clone(),
            None,
            None,
            "static",
        ))
        .timeout_config(timeouts)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.force_path_style)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);
    let public_base_url = public_base_url(config)?;

    Ok(Arc::new(S3StorageService::new(
        s3_client,
        config.storage_bucket.clone(),
        public_base_url,
        config.part_size,
    )))
}

/// Base URL objects are addressed under, path-style or virtual-hosted.
pub fn public_base_url(config: &RelayConfig) -> anyhow::Result<String> {
    let endpoint = config.storage_endpoint.trim_end_matches('/');
    if config.force_path_style {
        return Ok(format!("{}/{}", endpoint, config.storage_bucket));
    }

    let mut url = url::Url::parse(endpoint)?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("Storage endpoint has no host: {}", endpoint))?
        .to_string();
    url.set_host(Some(&format!("{}.{}", config.storage_bucket, host)))?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}
