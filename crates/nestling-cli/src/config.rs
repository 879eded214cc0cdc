//! CLI configuration file support
//!
//! Loads configuration from ~/.config/nestling/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Backend base URL
    pub api_url: Option<String>,
}

impl CliConfig {
    /// Load configuration from the default path
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("nestling").join("config.toml"))
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = CliConfig::load_from_path(Some(PathBuf::from("/nonexistent/config.toml")));
        assert_eq!(config.api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn configured_url_wins() {
        let config = CliConfig {
            api_url: Some("https://api.nestling.example".to_string()),
        };
        assert_eq!(config.api_url(), "https://api.nestling.example");
    }
}
