//! Configuration Storage Implementation
//!
//! Provides JSON file-based configuration storage with:
//! - Atomic writes using temp file + rename
//! - Validation before anything is persisted
//! - Thread-safe access via RwLock
//! - Default configuration generation

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::asset::DEFAULT_CACHE_CAPACITY;
use crate::caps::{DEFAULT_TEXTURE_FORMAT, MESH_CONTENT_TYPE};
use crate::logging::LoggingConfig;
use crate::transcode::DEFAULT_JPEG_QUALITY;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration store settings
#[derive(Debug, Clone)]
pub struct ConfigStoreConfig {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Whether to create default config if not exists
    pub create_default: bool,
}

impl Default for ConfigStoreConfig {
    fn default() -> Self {
        let app_data = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("asset-caps");

        Self {
            config_path: app_data.join("config.json"),
            create_default: true,
        }
    }
}

impl ConfigStoreConfig {
    /// Settings for an explicit config file path
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            ..Default::default()
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration version
    #[serde(default = "default_version")]
    pub version: u32,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Capability behaviour
    #[serde(default)]
    pub caps: CapsConfig,

    /// Asset store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Transcoder settings
    #[serde(default)]
    pub transcode: TranscodeConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            caps: CapsConfig::default(),
            store: StoreConfig::default(),
            transcode: TranscodeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally visible base URI used in capability URLs
    #[serde(default)]
    pub public_uri: Option<String>,

    /// Largest accepted request body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Expose the session issue/revoke routes over HTTP
    #[serde(default)]
    pub session_routes: bool,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    9000
}

fn default_max_upload_bytes() -> usize {
    8 * 1024 * 1024 // 8 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            public_uri: None,
            max_upload_bytes: default_max_upload_bytes(),
            session_routes: false,
        }
    }
}

impl ServerConfig {
    /// Base URI capability URLs are built on
    pub fn server_uri(&self) -> String {
        match &self.public_uri {
            Some(uri) => uri.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.bind_address, self.port),
        }
    }
}

/// Capability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapsConfig {
    /// Canonical texture format; requests for it are never transcoded
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Serve only cached textures and redirect misses here
    #[serde(default)]
    pub redirect_url: Option<String>,

    /// Content type of mesh responses
    #[serde(default = "default_mesh_content_type")]
    pub mesh_content_type: String,
}

fn default_format() -> String {
    DEFAULT_TEXTURE_FORMAT.to_string()
}

fn default_mesh_content_type() -> String {
    MESH_CONTENT_TYPE.to_string()
}

impl Default for CapsConfig {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            redirect_url: None,
            mesh_content_type: default_mesh_content_type(),
        }
    }
}

/// Asset store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Number of assets kept in the cached tier
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Transcoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeConfig {
    /// JPEG encoder quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl AppConfig {
    /// Check the configuration for values the service cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".into()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_upload_bytes must be positive".into(),
            ));
        }
        if self.caps.default_format.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "caps.default_format must not be empty".into(),
            ));
        }
        if let Some(url) = &self.caps.redirect_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "caps.redirect_url is not an http(s) URL: {}",
                    url
                )));
            }
        }
        if self.store.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "store.cache_capacity must be positive".into(),
            ));
        }
        if !(1..=100).contains(&self.transcode.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "transcode.jpeg_quality must be within 1..=100, got {}",
                self.transcode.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// Configuration store with thread-safe access
pub struct ConfigStore {
    config: Arc<RwLock<AppConfig>>,
    settings: ConfigStoreConfig,
}

impl ConfigStore {
    /// Open the configuration file, creating a default one if allowed
    pub async fn open(settings: ConfigStoreConfig) -> ConfigResult<Self> {
        let config = if tokio::fs::try_exists(&settings.config_path).await? {
            Self::load_from_file(&settings.config_path).await?
        } else if settings.create_default {
            if let Some(parent) = settings.config_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let default_config = AppConfig::default();
            Self::save_to_file(&settings.config_path, &default_config).await?;
            tracing::info!("Wrote default configuration to {:?}", settings.config_path);
            default_config
        } else {
            return Err(ConfigError::NotFound(settings.config_path.clone()));
        };

        config.validate()?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            settings,
        })
    }

    /// Load configuration from file
    async fn load_from_file(path: &Path) -> ConfigResult<AppConfig> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file with atomic write
    async fn save_to_file(path: &Path, config: &AppConfig) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(config)?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &content).await?;
        tokio::fs::rename(&temp_path, path).await?;

        Ok(())
    }

    /// Get current configuration (read-only)
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Apply a change, validate it and persist it.
    /// Nothing is changed if validation fails.
    pub async fn update<F>(&self, updater: F) -> ConfigResult<AppConfig>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().await;

        let mut updated = config.clone();
        updater(&mut updated);
        updated.validate()?;

        Self::save_to_file(&self.settings.config_path, &updated).await?;
        *config = updated;

        Ok(config.clone())
    }

    /// Write the current configuration back to disk
    pub async fn save(&self) -> ConfigResult<()> {
        let config = self.config.read().await;
        Self::save_to_file(&self.settings.config_path, &config).await
    }

    /// Get configuration file path
    pub fn config_path(&self) -> &Path {
        &self.settings.config_path
    }
}
