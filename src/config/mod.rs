use std::env;
use std::path::PathBuf;

/// Smallest part size accepted by S3-compatible multipart uploads (except the last part).
pub const MIN_PART_SIZE: usize = 5 * 1024 * 1024;

/// Relay configuration, loaded from the environment
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Storage endpoint URL (default: "http://127.0.0.1:9000")
    pub storage_endpoint: String,

    /// Storage region (default: "us-east-1")
    pub storage_region: String,

    pub storage_access_key: String,
    pub storage_secret_key: String,

    /// Bucket holding every relayed object (default: "uploads")
    pub storage_bucket: String,

    /// Use path-style addressing, required by most self-hosted providers (default: true)
    pub force_path_style: bool,

    /// Per-operation timeout of the storage client in seconds (default: 60)
    pub storage_timeout_secs: u64,

    /// Page size of the listing endpoint (default: 100)
    pub list_max_keys: i32,

    /// Maximum accepted upload size in bytes (default: 1 GB)
    pub max_file_size: usize,

    /// Directory for per-request temporary files (default: system temp dir)
    pub staging_dir: PathBuf,

    /// Part size for streamed uploads in bytes (default: 8 MB)
    pub part_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            storage_endpoint: "http://127.0.0.1:9000".to_string(),
            storage_region: "us-east-1".to_string(),
            storage_access_key: String::new(),
            storage_secret_key: String::new(),
            storage_bucket: "uploads".to_string(),
            force_path_style: true,
            storage_timeout_secs: 60,
            list_max_keys: 100,
            max_file_size: 1024 * 1024 * 1024, // 1 GB
            staging_dir: env::temp_dir(),
            part_size: 8 * 1024 * 1024, // 8 MB
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            storage_endpoint: env::var("STORAGE_ENDPOINT").unwrap_or(default.storage_endpoint),

            storage_region: env::var("STORAGE_REGION").unwrap_or(default.storage_region),

            storage_access_key: env::var("STORAGE_ACCESS_KEY")
                .unwrap_or(default.storage_access_key),

            storage_secret_key: env::var("STORAGE_SECRET_KEY")
                .unwrap_or(default.storage_secret_key),

            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or(default.storage_bucket),

            force_path_style: env::var("FORCE_PATH_STYLE")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.force_path_style),

            storage_timeout_secs: env::var("STORAGE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.storage_timeout_secs),

            list_max_keys: env::var("LIST_MAX_KEYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &i32| *n > 0)
                .unwrap_or(default.list_max_keys),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            staging_dir: env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.staging_dir),

            part_size: env::var("PART_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(|n: usize| n.max(MIN_PART_SIZE))
                .unwrap_or(default.part_size),
        }
    }

    /// Create config for a local MinIO with its stock credentials
    pub fn development() -> Self {
        Self {
            storage_access_key: "minioadmin".to_string(),
            storage_secret_key: "minioadmin".to_string(),
            max_file_size: 256 * 1024 * 1024,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.storage_timeout_secs, 60);
        assert_eq!(config.list_max_keys, 100);
        assert_eq!(config.max_file_size, 1024 * 1024 * 1024);
        assert!(config.part_size >= MIN_PART_SIZE);
        assert!(config.force_path_style);
    }

    #[test]
    fn test_development_config() {
        let config = RelayConfig::development();
        assert_eq!(config.storage_access_key, "minioadmin");
        assert_eq!(config.storage_bucket, "uploads");
    }

    #[test]
    fn test_from_env_clamps_part_size() {
        unsafe { env::set_var("PART_SIZE", "1024") };
        let config = RelayConfig::from_env();
        unsafe { env::remove_var("PART_SIZE") };
        assert_eq!(config.part_size, MIN_PART_SIZE);
    }
}
