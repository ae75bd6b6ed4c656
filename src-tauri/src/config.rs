//! Application configuration and API key resolution

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::keymask;
use crate::paths::get_config_path;

/// Runtime override for the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = get_config_path().map_err(ConfigError::Location)?;
    load_config_from(&path)
}

/// Loads config from `path`, returning defaults when the file doesn't exist
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = get_config_path().map_err(ConfigError::Location)?;
    save_config_to(&path, config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(io_error)?;
    info!("[config] Saved config to {}", path.display());
    Ok(())
}

/// Picks the API key: built-in, then environment, then config file
pub fn resolve_api_key(config: &AppConfig) -> Option<String> {
    let present = |key: &String| !key.trim().is_empty();
    get_builtin_api_key()
        .filter(present)
        .or_else(|| std::env::var(API_KEY_ENV).ok().filter(present))
        .or_else(|| config.api_key.clone().filter(present))
}

// ============ Built-in API Key Support ============

/// Compile-time embedded masked API key (hex-encoded)
const OBFUSCATED_API_KEY: &str = env!("OBFUSCATED_API_KEY");

/// Whether a built-in API key was provided at compile time
const HAS_BUILTIN_KEY: &str = env!("HAS_BUILTIN_KEY");

fn get_builtin_api_key() -> Option<String> {
    if HAS_BUILTIN_KEY == "1" {
        keymask::decode(OBFUSCATED_API_KEY)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.model, default_model());
        assert_eq!(config.base_url, default_base_url());
    }
}
