//! Bootstrap configuration loading and root folder resolution
//!
//! The TOML file only carries bootstrap concerns: where data lives, which
//! address to bind, logging, provider credentials and request limits.
//! Nothing here changes while the service is running.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "VERACITY_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "veracity.db";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the result database (optional)
    ///
    /// If not specified, will attempt CLI → environment → OS default
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Interface the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// External provider credentials and call budgets
    #[serde(default)]
    pub providers: ProviderConfig,

    /// Request limits
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_address: default_bind_address(),
            port: default_port(),
            logging: LoggingConfig::default(),
            providers: ProviderConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Reverse-search and AI-detection provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub tineye_api_key: Option<String>,
    pub tineye_api_secret: Option<String>,
    /// Override for the TinEye search endpoint
    pub tineye_base_url: Option<String>,

    pub hive_api_key: Option<String>,
    /// Override for the Hive sync task endpoint
    pub hive_base_url: Option<String>,

    pub isitai_api_key: Option<String>,
    /// Override for the IsItAI detect endpoint
    pub isitai_base_url: Option<String>,

    /// Upper bound on one reverse-search call
    #[serde(default = "default_similarity_timeout_secs")]
    pub similarity_timeout_secs: u64,

    /// Upper bound on one AI-detection call
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            tineye_api_key: None,
            tineye_api_secret: None,
            tineye_base_url: None,
            hive_api_key: None,
            hive_base_url: None,
            isitai_api_key: None,
            isitai_base_url: None,
            similarity_timeout_secs: default_similarity_timeout_secs(),
            generation_timeout_secs: default_generation_timeout_secs(),
        }
    }
}

/// Upload and history limits
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Largest accepted image upload
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// History entries returned when the caller gives no limit
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Hard cap on a caller-supplied history limit
    #[serde(default = "default_max_history_limit")]
    pub max_history_limit: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            history_limit: default_history_limit(),
            max_history_limit: default_max_history_limit(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_similarity_timeout_secs() -> u64 {
    10
}

fn default_generation_timeout_secs() -> u64 {
    15
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_history_limit() -> u32 {
    50
}

fn default_max_history_limit() -> u32 {
    200
}

/// Parse TOML configuration text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load bootstrap configuration
///
/// An explicit path must exist. Without one, the platform config file is
/// used when present and built-in defaults otherwise.
pub fn load_toml_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                tracing::debug!("No config file found, using built-in defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config = parse_toml_config(&content)?;
    tracing::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Platform config file location (`~/.config/veracity/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("veracity").join("config.toml"))
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Database location for a resolved root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE_NAME)
}

fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("veracity"))
        .unwrap_or_else(|| PathBuf::from("./veracity_data"))
}
