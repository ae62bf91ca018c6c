//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Object storage configuration.
    pub storage: StorageSettings,
    /// Vision API configuration.
    #[serde(default)]
    pub vision: VisionSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Base directory for stored blobs.
    #[serde(default = "default_storage_path")]
    pub base_path: String,
    /// Public base URL blobs are served under.
    pub base_url: String,
    /// Account key used to sign time-boxed access URLs.
    pub account_key: String,
    /// Signed URL lifetime in seconds.
    #[serde(default = "default_url_ttl")]
    pub url_ttl_secs: u64,
}

/// Vision API configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisionSettings {
    /// Whether image analysis is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Vision API endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Vision API subscription key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Minimum confidence for accepting a generated tag.
    #[serde(default = "default_tag_confidence")]
    pub tag_confidence: f64,
    /// Maximum number of generated tags to merge into a photo.
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

/// Seven days.
const fn default_token_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_storage_path() -> String {
    "./blobs".to_string()
}

/// One year, matching the asset cache lifetime the platform advertises.
const fn default_url_ttl() -> u64 {
    365 * 24 * 60 * 60
}

const fn default_tag_confidence() -> f64 {
    0.5
}

const fn default_max_tags() -> usize {
    10
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `PHOTOSHARE_ENV`)
    /// 3. Environment variables with `PHOTOSHARE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("PHOTOSHARE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PHOTOSHARE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PHOTOSHARE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
