use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// Blob store backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    #[default]
    Local,
    Memory,
    S3,
}

impl FromStr for BlobBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(BlobBackend::Local),
            "memory" => Ok(BlobBackend::Memory),
            "s3" | "minio" => Ok(BlobBackend::S3),
            other => Err(format!("unknown blob backend: {}", other)),
        }
    }
}

/// Metadata store backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    #[default]
    Sqlite,
    Memory,
}

impl FromStr for MetadataBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(MetadataBackend::Sqlite),
            "memory" => Ok(MetadataBackend::Memory),
            other => Err(format!("unknown metadata backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BlobBackend,
    #[serde(default = "default_local_path")]
    pub local_path: String,
    #[serde(default)]
    pub s3: S3Config,
}

/// S3-compatible object storage (MinIO, RustFS, AWS)
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    #[serde(default = "default_s3_bucket")]
    pub bucket: String,
    #[serde(default = "default_s3_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_s3_region")]
    pub region: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataConfig {
    #[serde(default)]
    pub backend: MetadataBackend,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5002
}

fn default_grpc_port() -> u16 {
    5003
}

fn default_max_body_bytes() -> usize {
    100_000_000 // 100 MB
}

fn default_request_timeout() -> u64 {
    30
}

fn default_db_path() -> String {
    "data/filestore.db".to_string()
}

fn default_local_path() -> String {
    "data/blobs".to_string()
}

fn default_s3_bucket() -> String {
    "files".to_string()
}

fn default_s3_endpoint() -> String {
    "http://localhost:9000".to_string()
}

fn default_s3_region() -> String {
    "us-east-1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            grpc_port: default_grpc_port(),
            max_body_bytes: default_max_body_bytes(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BlobBackend::default(),
            local_path: default_local_path(),
            s3: S3Config::default(),
        }
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: default_s3_bucket(),
            endpoint: default_s3_endpoint(),
            region: default_s3_region(),
            access_key: String::new(),
            secret_key: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;
        tracing::info!(
            "Storage config: blobs={:?} ({}), metadata={:?} ({})",
            config.storage.backend,
            config.storage.local_path,
            config.metadata.backend,
            config.database.path
        );
        Ok(config)
    }

    /// Load configuration from config.toml or conf.ini
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["config.toml", "conf.ini", "data/config.toml", "data/conf.ini"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: FS_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(val) = env::var("FS_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("FS_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = env::var("FS_CONF_SERVER_GRPC_PORT") {
            if let Ok(port) = val.parse() {
                self.server.grpc_port = port;
            }
        }
        if let Ok(val) = env::var("FS_CONF_SERVER_MAX_BODY_BYTES") {
            if let Ok(bytes) = val.parse() {
                self.server.max_body_bytes = bytes;
            }
        }
        if let Ok(val) = env::var("FS_CONF_SERVER_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.server.request_timeout_secs = secs;
            }
        }

        // Database overrides
        if let Ok(val) = env::var("FS_CONF_DATABASE_PATH") {
            self.database.path = val;
        }

        // Storage overrides
        if let Ok(val) = env::var("FS_CONF_STORAGE_BACKEND") {
            match val.parse() {
                Ok(backend) => self.storage.backend = backend,
                Err(e) => tracing::warn!("Ignoring FS_CONF_STORAGE_BACKEND: {}", e),
            }
        }
        if let Ok(val) = env::var("FS_CONF_STORAGE_LOCAL_PATH") {
            self.storage.local_path = val;
        }
        if let Ok(val) = env::var("FS_CONF_STORAGE_S3_BUCKET") {
            self.storage.s3.bucket = val;
        }
        if let Ok(val) = env::var("FS_CONF_STORAGE_S3_ENDPOINT") {
            self.storage.s3.endpoint = val;
        }
        if let Ok(val) = env::var("FS_CONF_STORAGE_S3_REGION") {
            self.storage.s3.region = val;
        }
        if let Ok(val) = env::var("FS_CONF_STORAGE_S3_ACCESS_KEY") {
            self.storage.s3.access_key = val;
        }
        if let Ok(val) = env::var("FS_CONF_STORAGE_S3_SECRET_KEY") {
            self.storage.s3.secret_key = val;
        }

        // Metadata overrides
        if let Ok(val) = env::var("FS_CONF_METADATA_BACKEND") {
            match val.parse() {
                Ok(backend) => self.metadata.backend = backend,
                Err(e) => tracing::warn!("Ignoring FS_CONF_METADATA_BACKEND: {}", e),
            }
        }
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        if self.metadata.backend == MetadataBackend::Sqlite {
            if let Some(parent) = Path::new(&self.database.path).parent() {
                fs::create_dir_all(parent)?;
            }
        }

        if self.storage.backend == BlobBackend::Local {
            fs::create_dir_all(&self.storage.local_path)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5002);
        assert_eq!(config.server.grpc_port, 5003);
        assert_eq!(config.server.max_body_bytes, 100_000_000);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.database.path, "data/filestore.db");
        assert_eq!(config.storage.backend, BlobBackend::Local);
        assert_eq!(config.storage.local_path, "data/blobs");
        assert_eq!(config.metadata.backend, MetadataBackend::Sqlite);
        assert_eq!(config.storage.s3.bucket, "files");
        assert_eq!(config.storage.s3.endpoint, "http://localhost:9000");
        assert_eq!(config.storage.s3.region, "us-east-1");
    }

    #[test]
    fn s3_section_parses_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            backend = "s3"

            [storage.s3]
            bucket = "uploads"
            endpoint = "http://minio:9000"
            access_key = "minioadmin"
            secret_key = "minioadmin"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, BlobBackend::S3);
        assert_eq!(config.storage.s3.bucket, "uploads");
        assert_eq!(config.storage.s3.endpoint, "http://minio:9000");
        assert_eq!(config.storage.s3.region, "us-east-1");
        assert_eq!(config.storage.s3.access_key, "minioadmin");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [storage]
            backend = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.backend, BlobBackend::Memory);
        assert_eq!(config.storage.local_path, "data/blobs");
        assert_eq!(config.metadata.backend, MetadataBackend::Sqlite);
    }

    #[test]
    fn unknown_backend_in_toml_is_an_error() {
        let parsed: Result<Config, _> = toml::from_str("[storage]\nbackend = \"ftp\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn backends_parse_case_insensitively() {
        assert_eq!("LOCAL".parse::<BlobBackend>().unwrap(), BlobBackend::Local);
        assert_eq!(" memory ".parse::<MetadataBackend>().unwrap(), MetadataBackend::Memory);
        assert_eq!("MinIO".parse::<BlobBackend>().unwrap(), BlobBackend::S3);
        assert!("ftp".parse::<BlobBackend>().is_err());
    }

    #[test]
    fn env_overrides_apply() {
        env::set_var("FS_CONF_SERVER_REQUEST_TIMEOUT_SECS", "5");
        env::set_var("FS_CONF_METADATA_BACKEND", "memory");
        env::set_var("FS_CONF_STORAGE_BACKEND", "bogus");
        env::set_var("FS_CONF_STORAGE_S3_BUCKET", "archive");
        env::set_var("FS_CONF_SERVER_GRPC_PORT", "6000");

        let mut config = Config::default();
        config.apply_env_overrides();

        env::remove_var("FS_CONF_SERVER_REQUEST_TIMEOUT_SECS");
        env::remove_var("FS_CONF_METADATA_BACKEND");
        env::remove_var("FS_CONF_STORAGE_BACKEND");
        env::remove_var("FS_CONF_STORAGE_S3_BUCKET");
        env::remove_var("FS_CONF_SERVER_GRPC_PORT");

        assert_eq!(config.server.request_timeout_secs, 5);
        assert_eq!(config.metadata.backend, MetadataBackend::Memory);
        assert_eq!(config.storage.backend, BlobBackend::Local);
        assert_eq!(config.storage.s3.bucket, "archive");
        assert_eq!(config.server.grpc_port, 6000);
    }
}
