use crate::lock::LockOptions;
use crate::paths::AppDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub config_version: u32,
    #[serde(default)]
    pub kodi: KodiConfig,
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            kodi: KodiConfig::default(),
            lock: LockConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Connection settings for the media-center JSON-RPC endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KodiConfig {
    #[serde(default = "default_kodi_url")]
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_kodi_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for KodiConfig {
    fn default() -> Self {
        Self {
            url: default_kodi_url(),
            username: None,
            password: None,
            timeout_secs: default_kodi_timeout_secs(),
        }
    }
}

impl KodiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    #[serde(default = "default_lock_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_lock_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Directory that relative marker names resolve against.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_lock_timeout_ms(),
            poll_interval_ms: default_lock_poll_interval_ms(),
            dir: None,
        }
    }
}

impl LockConfig {
    pub fn options(&self) -> LockOptions {
        LockOptions {
            timeout: Duration::from_millis(self.timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn lock_dir(&self, dirs: &AppDirs) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| dirs.lock_dir().to_path_buf())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
    /// Mirror log lines to stderr. Stdout carries command output.
    #[serde(default = "default_console_enabled")]
    pub console: bool,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_log_files: default_max_log_files(),
            console: default_console_enabled(),
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config validation failed: {0}")]
    Validation(ValidationError),
    #[error("failed to prepare configuration directories: {0}")]
    Directories(#[from] crate::paths::DirsError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unsupported config_version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("kodi.url must not be empty")]
    EmptyKodiUrl,
    #[error("lock.poll_interval_ms must be greater than zero")]
    ZeroPollInterval,
}

impl Config {
    pub fn load_or_default(dirs: &AppDirs) -> Result<Self, ConfigError> {
        dirs.ensure_exists()?;
        let path = Self::config_path(dirs);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    pub fn config_path(dirs: &AppDirs) -> PathBuf {
        dirs.config_dir().join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.config_version != CURRENT_CONFIG_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.config_version,
                expected: CURRENT_CONFIG_VERSION,
            });
        }
        if self.kodi.url.trim().is_empty() {
            return Err(ValidationError::EmptyKodiUrl);
        }
        if self.lock.poll_interval_ms == 0 {
            return Err(ValidationError::ZeroPollInterval);
        }
        Ok(())
    }
}

fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_kodi_url() -> String {
    "http://127.0.0.1:8080/jsonrpc".to_string()
}

fn default_kodi_timeout_secs() -> u64 {
    10
}

fn default_lock_timeout_ms() -> u64 {
    10_000
}

fn default_lock_poll_interval_ms() -> u64 {
    10
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_max_log_files() -> usize {
    7
}

fn default_console_enabled() -> bool {
    true
}
