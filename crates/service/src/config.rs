use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use common::engine::EngineSettings;
use common::trust::same_origin;
use serde::{Deserialize, Serialize};
use url::Url;

pub const CONFIG_FILE_NAME: &str = "podgate.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// public URL of the store root
    pub base_url: Url,
    /// refuse foreign origins unless an owner trusts them
    #[serde(default = "default_strict_origin")]
    pub strict_origin: bool,
    /// origins accepted alongside the base url's own
    #[serde(default)]
    pub trusted_origins: Vec<String>,
    #[serde(default = "default_timeout_ms")]
    pub trusted_app_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub group_timeout_ms: u64,
    /// parsed documents kept by the parse cache
    #[serde(default = "default_parse_cache_capacity")]
    pub parse_cache_capacity: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// enables the daily rolling log file when set
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_strict_origin() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_parse_cache_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            strict_origin: default_strict_origin(),
            trusted_origins: Vec::new(),
            trusted_app_timeout_ms: default_timeout_ms(),
            group_timeout_ms: default_timeout_ms(),
            parse_cache_capacity: default_parse_cache_capacity(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        let config_toml = fs::read_to_string(path)?;
        Self::from_toml_str(&config_toml)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<tracing::Level, ConfigError> {
        tracing::Level::from_str(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    /// The audience bearer credentials must be issued for
    pub fn base_origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }

    /// Whether requests from `origin` skip the owner trust check
    pub fn is_trusted_origin(&self, origin: &str) -> bool {
        same_origin(origin, &self.base_origin())
            || self
                .trusted_origins
                .iter()
                .any(|trusted| same_origin(origin, trusted))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            base_url: self.base_url.clone(),
            group_timeout: Duration::from_millis(self.group_timeout_ms),
            trusted_app_timeout: Duration::from_millis(self.trusted_app_timeout_ms),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0:?}")]
    MissingFile(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("base url cannot carry resource paths: {0}")]
    InvalidBaseUrl(Url),
    #[error("invalid log level: {0:?}")]
    InvalidLogLevel(String),
}
