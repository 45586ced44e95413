/// Service configuration.
///
/// Loaded from a TOML file (default `potability.toml`, overridable with the
/// `POTABILITY_CONFIG` environment variable). Every section and key is
/// optional; anything left out falls back to the defaults below, which point
/// at the fixed artifact file names the model was exported with.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::logging::LogLevel;
use crate::model::FeatureSet;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "POTABILITY_CONFIG";

/// Config file used when `POTABILITY_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "potability.toml";

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub dataset: DatasetConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP form is served on.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Feature layout the artifacts were fitted on.
    pub feature_set: FeatureSet,
    pub scaler_path: PathBuf,
    pub classifier_path: PathBuf,
    /// Display-only metadata for the sidebar.
    pub name: String,
    pub trained_on: String,
    pub accuracy: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            feature_set: FeatureSet::Raw,
            scaler_path: PathBuf::from("models/scaler.json"),
            classifier_path: PathBuf::from("models/water_quality_model.json"),
            name: "Random Forest Classifier".to_string(),
            trained_on: "PB_All_2000_2021.csv".to_string(),
            accuracy: "91.2%".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Historical measurements CSV used by the averages panel.
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("PB_All_2000_2021.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Append log entries to this file as well as the console.
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            console_timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Io(String),
    /// The file is not valid TOML or has wrongly-typed values.
    Parse(String),
    /// Parsed, but a value is unusable.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Parses a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    /// Resolves the config path from the environment (after `.env`) and loads it.
    pub fn from_env() -> Result<(Self, PathBuf), ConfigError> {
        dotenv::dotenv().ok();
        let path = std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let config = Self::load(&path)?;
        Ok((config, path))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind_addr is empty".to_string()));
        }
        for (key, path) in [
            ("model.scaler_path", &self.model.scaler_path),
            ("model.classifier_path", &self.model.classifier_path),
            ("dataset.path", &self.dataset.path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("{} is empty", key)));
            }
        }
        Ok(())
    }
}
