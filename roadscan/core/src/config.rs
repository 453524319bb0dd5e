//! TOML Configuration File Support
//!
//! Centralized configuration loading for the core and both surfaces,
//! backed by a TOML file at `~/.config/roadscan/roadscan.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables (`ROADSCAN_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/roadscan/roadscan.toml` (typically `~/.config/roadscan/roadscan.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [prediction]
//! endpoint = "http://192.168.1.20:5000"
//! request_timeout_ms = 10000
//!
//! [capture]
//! interval_ms = 500
//! frames_dir = "/var/lib/roadscan/frames"
//! abort_in_flight_on_stop = true
//!
//! [identity]
//! provider = "firebase"
//! api_key = "AIza..."
//!
//! [appearance]
//! theme = "system"
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::CaptureConfig;
use crate::identity::ProviderConfig;
use crate::prediction::normalize_endpoint;
use crate::theme::ThemeMode;

/// Default prediction endpoint (the reference Flask service)
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default capture period
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Environment variable names
pub mod env {
    /// Prediction endpoint
    pub const PREDICTION_ENDPOINT: &str = "ROADSCAN_PREDICTION_ENDPOINT";
    /// Request timeout in milliseconds (0 disables)
    pub const REQUEST_TIMEOUT_MS: &str = "ROADSCAN_REQUEST_TIMEOUT_MS";
    /// Capture period in milliseconds
    pub const CAPTURE_INTERVAL_MS: &str = "ROADSCAN_CAPTURE_INTERVAL_MS";
    /// Frame directory
    pub const FRAMES_DIR: &str = "ROADSCAN_FRAMES_DIR";
    /// `firebase` or `memory`
    pub const IDENTITY_PROVIDER: &str = "ROADSCAN_IDENTITY_PROVIDER";
    /// Firebase Web API key
    pub const FIREBASE_API_KEY: &str = "ROADSCAN_FIREBASE_API_KEY";
    /// `light`, `dark` or `system`
    pub const THEME: &str = "ROADSCAN_THEME";
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Which identity provider to use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Firebase Identity Toolkit (needs an API key)
    Firebase,
    /// Process-local accounts
    Memory,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firebase" => Ok(Self::Firebase),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(ConfigError::Validation(format!(
                "unknown identity provider {other:?} (expected firebase or memory)"
            ))),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[prediction]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionToml {
    /// Base URL of the classifier
    pub endpoint: Option<String>,
    /// Per-request timeout in milliseconds (0 = no timeout)
    pub request_timeout_ms: Option<u64>,
}

/// `[capture]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureToml {
    /// Timer period in milliseconds
    pub interval_ms: Option<u64>,
    /// Directory the frame source replays
    pub frames_dir: Option<PathBuf>,
    /// Drop in-flight requests when the loop stops
    pub abort_in_flight_on_stop: Option<bool>,
}

/// `[identity]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityToml {
    /// `firebase` or `memory`
    pub provider: Option<String>,
    /// Firebase Web API key
    pub api_key: Option<String>,
    /// Identity Toolkit base URL override
    pub base_url: Option<String>,
}

/// `[appearance]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceToml {
    /// `light`, `dark` or `system`
    pub theme: Option<String>,
}

/// Root TOML document
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadscanToml {
    /// Prediction endpoint settings
    pub prediction: PredictionToml,
    /// Capture loop settings
    pub capture: CaptureToml,
    /// Identity provider settings
    pub identity: IdentityToml,
    /// Appearance settings
    pub appearance: AppearanceToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration
#[derive(Clone, Debug)]
pub struct RoadscanConfig {
    /// Prediction endpoint base URL (normalized)
    pub endpoint: String,
    /// Per-request timeout in milliseconds (0 = none)
    pub request_timeout_ms: u64,
    /// Capture period in milliseconds
    pub interval_ms: u64,
    /// Frame directory for the directory camera
    pub frames_dir: PathBuf,
    /// Drop in-flight requests when the loop stops
    pub abort_in_flight_on_stop: bool,
    /// Explicit provider choice (`None` = pick from the API key)
    pub provider: Option<ProviderKind>,
    /// Firebase Web API key
    pub api_key: Option<String>,
    /// Identity Toolkit base URL override
    pub identity_base_url: Option<String>,
    /// Theme mode
    pub theme: ThemeMode,
    /// Path of the config file that was loaded, if any
    pub config_file_path: Option<PathBuf>,
    /// Where the endpoint came from
    endpoint_source: ConfigSource,
}

impl Default for RoadscanConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            interval_ms: DEFAULT_INTERVAL_MS,
            frames_dir: default_frames_dir(),
            abort_in_flight_on_stop: true,
            provider: None,
            api_key: None,
            identity_base_url: None,
            theme: ThemeMode::System,
            config_file_path: None,
            endpoint_source: ConfigSource::Default,
        }
    }
}

impl RoadscanConfig {
    /// Where the endpoint value came from
    #[must_use]
    pub fn endpoint_source(&self) -> ConfigSource {
        self.endpoint_source
    }

    /// Request timeout, `None` when disabled
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    /// Capture loop settings
    #[must_use]
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig::default()
            .with_interval(Duration::from_millis(self.interval_ms))
            .with_abort_in_flight(self.abort_in_flight_on_stop)
    }

    /// Identity provider selection.
    ///
    /// Without an explicit provider, an API key selects Firebase.
    #[must_use]
    pub fn provider_config(&self) -> ProviderConfig {
        let kind = self.provider.unwrap_or(if self.api_key.is_some() {
            ProviderKind::Firebase
        } else {
            ProviderKind::Memory
        });
        match (kind, &self.api_key) {
            (ProviderKind::Firebase, Some(api_key)) => ProviderConfig::Firebase {
                api_key: api_key.clone(),
                base_url: self.identity_base_url.clone(),
            },
            _ => ProviderConfig::InMemory,
        }
    }

    /// Check cross-field constraints and normalize the endpoint
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let url = normalize_endpoint(&self.endpoint).map_err(ConfigError::Validation)?;
        self.endpoint = url.as_str().trim_end_matches('/').to_string();

        if self.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "capture interval must be at least 1 ms".to_string(),
            ));
        }
        if self.provider == Some(ProviderKind::Firebase) && self.api_key.is_none() {
            return Err(ConfigError::Validation(
                "identity provider firebase needs an api_key".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_frames_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("roadscan").join("frames"))
        .unwrap_or_else(|| PathBuf::from("frames"))
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Default configuration file path
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("roadscan").join("roadscan.toml"))
}

/// Load configuration from the default path and the process environment
pub fn load_config() -> Result<RoadscanConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from `path` and the process environment
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<RoadscanConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Load configuration from `path`, reading variables through `env`.
///
/// The result is validated. A missing file is not an error.
pub fn load_config_with<F>(path: Option<PathBuf>, lookup: F) -> Result<RoadscanConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = RoadscanConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::Read {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: RoadscanToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());

            tracing::info!(path = %config_path.display(), "Loaded configuration from file");
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, lookup)?;
    config.validate()?;
    Ok(config)
}

fn apply_toml_config(config: &mut RoadscanConfig, toml: &RoadscanToml) -> Result<(), ConfigError> {
    if let Some(ref endpoint) = toml.prediction.endpoint {
        config.endpoint = endpoint.clone();
        config.endpoint_source = ConfigSource::File;
    }
    if let Some(timeout) = toml.prediction.request_timeout_ms {
        config.request_timeout_ms = timeout;
    }

    if let Some(interval) = toml.capture.interval_ms {
        config.interval_ms = interval;
    }
    if let Some(ref dir) = toml.capture.frames_dir {
        config.frames_dir = dir.clone();
    }
    if let Some(abort) = toml.capture.abort_in_flight_on_stop {
        config.abort_in_flight_on_stop = abort;
    }

    if let Some(ref provider) = toml.identity.provider {
        config.provider = Some(provider.parse()?);
    }
    if toml.identity.api_key.is_some() {
        config.api_key = toml.identity.api_key.clone();
    }
    if toml.identity.base_url.is_some() {
        config.identity_base_url = toml.identity.base_url.clone();
    }

    if let Some(ref theme) = toml.appearance.theme {
        config.theme = parse_theme(theme)?;
    }
    Ok(())
}

fn apply_env_config<F>(config: &mut RoadscanConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(endpoint) = lookup(env::PREDICTION_ENDPOINT) {
        config.endpoint = endpoint;
        config.endpoint_source = ConfigSource::Env;
    }
    if let Some(ms) = parse_env_u64(&lookup, env::REQUEST_TIMEOUT_MS) {
        config.request_timeout_ms = ms;
    }
    if let Some(ms) = parse_env_u64(&lookup, env::CAPTURE_INTERVAL_MS) {
        config.interval_ms = ms;
    }
    if let Some(dir) = lookup(env::FRAMES_DIR) {
        config.frames_dir = PathBuf::from(dir);
    }
    if let Some(provider) = lookup(env::IDENTITY_PROVIDER) {
        config.provider = Some(provider.parse()?);
    }
    if let Some(key) = lookup(env::FIREBASE_API_KEY) {
        config.api_key = Some(key);
    }
    if let Some(theme) = lookup(env::THEME) {
        config.theme = parse_theme(&theme)?;
    }
    Ok(())
}

fn parse_env_u64<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring non-numeric environment value");
            None
        }
    }
}

fn parse_theme(raw: &str) -> Result<ThemeMode, ConfigError> {
    raw.parse().map_err(ConfigError::Validation)
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// CLI overrides, applied on top of file and environment
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Prediction endpoint
    pub endpoint: Option<String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: Option<u64>,
    /// Capture period in milliseconds
    pub interval_ms: Option<u64>,
    /// Frame directory
    pub frames_dir: Option<PathBuf>,
    /// Theme mode
    pub theme: Option<ThemeMode>,
    /// Identity provider
    pub provider: Option<ProviderKind>,
}

impl ConfigOverrides {
    /// Create empty overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Override the capture period
    #[must_use]
    pub fn with_interval_ms(mut self, ms: u64) -> Self {
        self.interval_ms = Some(ms);
        self
    }

    /// Override the frame directory
    #[must_use]
    pub fn with_frames_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.frames_dir = Some(dir.into());
        self
    }

    /// Apply the overrides and re-validate
    pub fn apply(&self, config: &mut RoadscanConfig) -> Result<(), ConfigError> {
        if let Some(ref endpoint) = self.endpoint {
            config.endpoint = endpoint.clone();
            config.endpoint_source = ConfigSource::Cli;
        }
        if let Some(ms) = self.request_timeout_ms {
            config.request_timeout_ms = ms;
        }
        if let Some(ms) = self.interval_ms {
            config.interval_ms = ms;
        }
        if let Some(ref dir) = self.frames_dir {
            config.frames_dir = dir.clone();
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if let Some(provider) = self.provider {
            config.provider = Some(provider);
        }
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = load_config_with(None, no_env).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:5000");
        assert_eq!(config.endpoint_source(), ConfigSource::Default);
        assert_eq!(config.interval_ms, 500);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.theme, ThemeMode::System);
        assert_eq!(config.provider_config(), ProviderConfig::InMemory);
        assert!(config.capture_config().abort_in_flight_on_stop);
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = RoadscanConfig {
            request_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (env::PREDICTION_ENDPOINT, "localhost:5000"),
            (env::CAPTURE_INTERVAL_MS, "250"),
            (env::FIREBASE_API_KEY, "key-123"),
            (env::THEME, "dark"),
        ]
        .into_iter()
        .collect();

        let config =
            load_config_with(None, |k| vars.get(k).map(|v| (*v).to_string())).unwrap();
        assert_eq!(config.endpoint, "http://localhost:5000");
        assert_eq!(config.endpoint_source(), ConfigSource::Env);
        assert_eq!(config.interval_ms, 250);
        assert_eq!(config.theme, ThemeMode::Dark);
        assert_eq!(
            config.provider_config(),
            ProviderConfig::Firebase {
                api_key: "key-123".to_string(),
                base_url: None,
            }
        );
    }

    #[test]
    fn test_non_numeric_env_is_ignored() {
        let config = load_config_with(None, |k| {
            (k == env::CAPTURE_INTERVAL_MS).then(|| "fast".to_string())
        })
        .unwrap();
        assert_eq!(config.interval_ms, 500);
    }

    #[test]
    fn test_invalid_endpoint_is_validation_error() {
        let result = load_config_with(None, |k| {
            (k == env::PREDICTION_ENDPOINT).then(|| "ftp://nope".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_memory_provider_wins_over_key() {
        let config = RoadscanConfig {
            provider: Some(ProviderKind::Memory),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert_eq!(config.provider_config(), ProviderConfig::InMemory);
    }

    #[test]
    fn test_firebase_without_key_is_rejected() {
        let mut config = RoadscanConfig {
            provider: Some(ProviderKind::Firebase),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = RoadscanConfig::default();
        ConfigOverrides::new()
            .with_endpoint("https://roads.example.org/")
            .with_interval_ms(1000)
            .apply(&mut config)
            .unwrap();
        assert_eq!(config.endpoint, "https://roads.example.org");
        assert_eq!(config.endpoint_source(), ConfigSource::Cli);
        assert_eq!(config.capture_config().interval, Duration::from_secs(1));
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("Firebase".parse::<ProviderKind>().unwrap(), ProviderKind::Firebase);
        assert_eq!("memory".parse::<ProviderKind>().unwrap(), ProviderKind::Memory);
        assert!("ldap".parse::<ProviderKind>().is_err());
    }
}
