use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Which persistence strategy the stores should be wired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    /// Session-local data, no server round-trips.
    Memory,
    /// HTTP + WebSocket against the configured server.
    Remote,
}

/// Remote server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RemoteConfig {
    /// Server URL (e.g., "http://localhost:8080" or "https://sync.example.com")
    pub server_url: Option<String>,
    /// API key for authentication
    pub api_key: Option<String>,
}

impl RemoteConfig {
    /// Returns true if the remote strategy is usable (has both server_url and api_key)
    pub fn is_configured(&self) -> bool {
        self.server_url.is_some() && self.api_key.is_some()
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Signed-in user id; stores stay read-only without one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ConfigValue<String>>,
    /// Force the in-memory strategy even when a server is configured
    pub offline: ConfigValue<bool>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Remote server configuration
    pub remote: RemoteConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    user_id: Option<String>,
    offline: Option<bool>,
    remote: Option<RemoteConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut user_id = None;
        let mut offline = ConfigValue::new(false, ConfigSource::Default);
        let mut config_file = None;
        let mut remote = RemoteConfig::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(user) = file_config.user_id {
                user_id = Some(ConfigValue::new(user, ConfigSource::File));
            }
            if let Some(flag) = file_config.offline {
                offline = ConfigValue::new(flag, ConfigSource::File);
            }
            if let Some(remote_config) = file_config.remote {
                remote = remote_config;
            }
        }

        // Apply environment variable overrides
        if let Ok(user) = std::env::var("LARDER_USER_ID") {
            user_id = Some(ConfigValue::new(user, ConfigSource::Environment));
        }
        if let Ok(flag) = std::env::var("LARDER_OFFLINE") {
            offline = ConfigValue::new(
                matches!(flag.as_str(), "1" | "true" | "yes"),
                ConfigSource::Environment,
            );
        }
        if let Ok(url) = std::env::var("LARDER_SERVER_URL") {
            remote.server_url = Some(url);
        }
        if let Ok(key) = std::env::var("LARDER_API_KEY") {
            remote.api_key = Some(key);
        }

        Ok(Self {
            user_id,
            offline,
            config_file,
            remote,
        })
    }

    /// The configured user id, regardless of where it came from.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_ref().map(|u| u.value.as_str())
    }

    /// The persistence strategy implied by this configuration: remote
    /// when a server is fully configured and offline is not forced.
    pub fn persistence_mode(&self) -> PersistenceMode {
        if !self.offline.value && self.remote.is_configured() {
            PersistenceMode::Remote
        } else {
            PersistenceMode::Memory
        }
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/larder/
    /// - macOS: ~/Library/Application Support/larder/
    /// - Windows: %APPDATA%/larder/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("larder")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
