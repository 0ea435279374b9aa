use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable carrying the OpenWeatherMap API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
/// Environment variable carrying the base URL clients use to reach the server.
pub const API_URL_ENV: &str = "SKYLOG_API_URL";
/// Environment variable overriding the server bind address.
pub const BIND_ENV: &str = "SKYLOG_BIND";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory. Defaults to the directory
    /// holding the config file.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP API listens on
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OpenWeatherMap API key. Usually supplied through `OPENWEATHER_API_KEY`
    /// rather than written to disk.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Base URL for both the weather and the geocoding endpoints
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// Timeout applied to every outbound provider request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Unit system requested from the provider
    #[serde(default = "default_units")]
    pub units: String,
}

fn default_provider_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_units() -> String {
    "metric".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_provider_base_url(),
            timeout_secs: default_timeout_secs(),
            units: default_units(),
        }
    }
}

impl ProviderConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// SQLite database file; relative paths resolve against `config_dir`
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Number of records returned by the history listing
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("history.db")
}

/// Upper bound for `history.recent_limit`.
pub const MAX_RECENT_LIMIT: usize = 10_000;

fn default_recent_limit() -> usize {
    100
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            recent_limit: default_recent_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the Skylog HTTP API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Lifetime of the cached history listing
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Directory holding client cache entries; relative to `config_dir`
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

fn default_api_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_cache_ttl_ms() -> u64 {
    5 * 60 * 1000
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            cache_ttl_ms: default_cache_ttl_ms(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            history: HistoryConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skylog")
}

impl Config {
    /// Load configuration from the default location, creating it if missing,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from an explicit file, writing defaults if it
    /// doesn't exist yet. Environment overrides are not applied.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let mut config = Self::default();
            if let Some(parent) = path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let table: toml::Table = toml::from_str(&contents).context("Failed to parse config file")?;
        let has_config_dir = table.contains_key("config_dir");
        let mut config: Config = toml::Value::Table(table)
            .try_into()
            .context("Failed to parse config file")?;

        if !has_config_dir {
            if let Some(parent) = path.parent() {
                config.config_dir = parent.to_path_buf();
            }
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.provider.api_key = key;
        }
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.client.api_url = url;
        }
        if let Some(bind) = lookup(BIND_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.bind_address = bind;
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.provider.base_url, "provider.base_url", &mut result);
        self.validate_url(&self.client.api_url, "client.api_url", &mut result);

        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            result.add_error(
                "server.bind_address",
                format!("Not a socket address: {}", self.server.bind_address),
            );
        }

        if !self.provider.has_api_key() {
            result.add_warning(
                "provider.api_key",
                format!("No API key configured; set {}", API_KEY_ENV),
            );
        }

        if self.provider.timeout_secs == 0 {
            result.add_error("provider.timeout_secs", "Timeout must be greater than 0");
        } else if self.provider.timeout_secs > 120 {
            result.add_warning(
                "provider.timeout_secs",
                "Provider timeout is unusually long (>120s)",
            );
        }

        if self.history.recent_limit == 0 {
            result.add_error("history.recent_limit", "History limit must be greater than 0");
        } else if self.history.recent_limit > MAX_RECENT_LIMIT {
            result.add_error(
                "history.recent_limit",
                format!("History limit must be at most {}", MAX_RECENT_LIMIT),
            );
        }

        if self.client.cache_ttl_ms == 0 {
            result.add_warning("client.cache_ttl_ms", "History caching disabled (0 ms)");
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Resolved location of the history database.
    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.history.database_path)
    }

    /// Resolved location of the client cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        self.resolve(&self.client.cache_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        default_config_dir().join("config.toml")
    }
}
