use crate::error::{Error, Result};
use crate::models::SoilReading;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgribotConfig {
    pub backend_url: String,
    pub request_timeout_secs: u64,
    pub intervals: IntervalConfig,
    pub location: LocationConfig,
    pub soil: SoilReading,
}

impl Default for AgribotConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: 10,
            intervals: IntervalConfig::default(),
            location: LocationConfig::default(),
            soil: SoilReading::default(),
        }
    }
}

/// Poll and simulation periods, in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    pub dashboard_ms: u64,
    pub bots_ms: u64,
    pub soil_ms: u64,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            dashboard_ms: 5000,
            bots_ms: 5000,
            soil_ms: 5000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// `false` behaves like a user refusing the location prompt.
    pub enabled: bool,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lat: None,
            lng: None,
        }
    }
}

pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "agribot", "agribot")
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
        .map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn config_file_path() -> Result<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the config file (defaults when absent) and applies env overrides.
pub fn load_config() -> Result<AgribotConfig> {
    let mut cfg = load_config_from(&config_file_path()?)?;
    if let Ok(url) = std::env::var("AGRIBOT_BACKEND_URL") {
        if !url.trim().is_empty() {
            cfg.backend_url = url;
        }
    }
    Ok(cfg)
}

pub fn load_config_from(file: &Path) -> Result<AgribotConfig> {
    if !file.exists() {
        return Ok(AgribotConfig::default());
    }
    let content = fs::read_to_string(file)
        .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}

pub fn save_config(config: &AgribotConfig) -> Result<()> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)
        .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
    save_config_to(config, &dir.join("config.toml"))
}

pub fn save_config_to(config: &AgribotConfig, file: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

    // Atomic write: write to temp file then rename
    let temp_file = file.with_extension("toml.tmp");
    fs::write(&temp_file, content)
        .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;
    fs::rename(&temp_file, file)
        .map_err(|e| Error::Config(format!("Failed to finalize config: {}", e)))?;
    Ok(())
}

/// Joins the backend base URL and an API path without doubling slashes.
pub fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
