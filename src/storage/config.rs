//! Engine configuration.
//!
//! Loaded from `config.toml` in the application data directory. Missing
//! sections and keys fall back to defaults.

use crate::accessibility::{AccessibilityProfile, ProfileSettings, SettingError};
use crate::audio::WordTiming;
use crate::onboarding::{OnboardingAnswer, OnboardingScorer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default persistence timeout in milliseconds.
pub const DEFAULT_PERSISTENCE_TIMEOUT_MS: u64 = 5000;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Progress persistence settings
    pub persistence: PersistenceSettings,
    /// Word timing for estimated narration slots
    pub narration: WordTiming,
    /// Profile used when onboarding has not run
    pub profile: ProfileSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            persistence: PersistenceSettings::default(),
            narration: WordTiming::default(),
            profile: ProfileSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Profile for a session when onboarding has not run.
    pub fn default_profile(&self) -> Result<AccessibilityProfile, SettingError> {
        AccessibilityProfile::from_settings(self.profile.clone())
    }

    /// Profile derived from onboarding answers on top of the configured one.
    pub fn onboarding_profile(
        &self,
        answers: &[OnboardingAnswer],
    ) -> Result<AccessibilityProfile, SettingError> {
        OnboardingScorer::derive_profile(answers, &self.profile)
    }

    /// Check the values the TOML types alone do not constrain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.narration.is_valid() {
            return Err(ConfigError::InvalidValue(format!(
                "[narration] word costs must be finite and non-negative, got {} + {}/char",
                self.narration.base_word_secs, self.narration.per_char_secs
            )));
        }
        self.default_profile()
            .map_err(|e| ConfigError::InvalidValue(format!("[profile] {}", e)))?;
        Ok(())
    }
}

/// Progress persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    /// Base URL of the reading progress API
    pub base_url: String,
    /// How long a fetch or save may take before it counts as failed
    pub timeout_ms: u64,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_ms: DEFAULT_PERSISTENCE_TIMEOUT_MS,
        }
    }
}

impl PersistenceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "adaptive-reader", "AdaptiveReader")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load engine configuration from the default location.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    let mut config = load_config_from(&get_config_path())?;
    config.data_dir = get_data_dir();
    Ok(config)
}

/// Load engine configuration from `path`, or defaults if it does not exist.
pub fn load_config_from(path: &Path) -> Result<EngineConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(EngineConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let config: EngineConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Save engine configuration to the default location.
pub fn save_config(config: &EngineConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save engine configuration to `path`, creating parent directories.
pub fn save_config_to(config: &EngineConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
