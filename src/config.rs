//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub channel: ChannelSettings,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("derrick").to_string_lossy().to_string())
        .unwrap_or_else(|| "./derrick_data".to_string())
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Channel engine settings
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSettings {
    /// Chunk extent for depth-indexed logs, in index units
    #[serde(default = "default_depth_chunk_size")]
    pub depth_chunk_size: f64,

    /// Chunk extent for time-indexed logs, in microseconds
    #[serde(default = "default_time_chunk_size")]
    pub time_chunk_size: f64,

    /// Emit the primary index column in metadata enumerations
    #[serde(default = "default_stream_index_value_pairs")]
    pub stream_index_value_pairs: bool,

    /// Maximum rows assembled per data request
    #[serde(default = "default_max_data_nodes")]
    pub max_data_nodes: usize,

    /// Maximum values assembled per data request
    #[serde(default = "default_max_data_points")]
    pub max_data_points: usize,
}

fn default_depth_chunk_size() -> f64 {
    1000.0
}

fn default_time_chunk_size() -> f64 {
    86_400_000_000.0 // one day
}

fn default_stream_index_value_pairs() -> bool {
    true
}

fn default_max_data_nodes() -> usize {
    10_000
}

fn default_max_data_points() -> usize {
    100_000
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            depth_chunk_size: default_depth_chunk_size(),
            time_chunk_size: default_time_chunk_size(),
            stream_index_value_pairs: default_stream_index_value_pairs(),
            max_data_nodes: default_max_data_nodes(),
            max_data_points: default_max_data_points(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8085
}

impl ApiConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("derrick").join("config.toml")),
            Some(PathBuf::from("/etc/derrick/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(data_dir) = std::env::var("DERRICK_DATA_DIR") {
            self.store.data_dir = data_dir;
        }

        if let Ok(size) = std::env::var("DERRICK_DEPTH_CHUNK_SIZE") {
            if let Ok(v) = size.parse() {
                self.channel.depth_chunk_size = v;
            }
        }
        if let Ok(size) = std::env::var("DERRICK_TIME_CHUNK_SIZE") {
            if let Ok(v) = size.parse() {
                self.channel.time_chunk_size = v;
            }
        }

        if let Ok(host) = std::env::var("DERRICK_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("DERRICK_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        if let Ok(level) = std::env::var("DERRICK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("DERRICK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}
