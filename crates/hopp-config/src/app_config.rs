//! Application configuration
//!
//! Loaded from `.hopp.toml`; every field has its own default.

use std::time::Duration;

use hopp_data::{RestRequest, DEFAULT_ENDPOINT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Endpoint of the blank request shown when no tab is open
    #[serde(default = "default_endpoint")]
    pub default_endpoint: String,

    /// Seconds between two list refreshes
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Reopen the tabs of the previous run
    #[serde(default = "default_restore_tabs")]
    pub restore_tabs: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_restore_tabs() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_endpoint: default_endpoint(),
            poll_interval_secs: default_poll_interval_secs(),
            restore_tabs: default_restore_tabs(),
        }
    }
}

impl AppConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        match crate::load_config_file() {
            Some(content) => Self::from_toml(&content),
            None => {
                log::debug!("Using default app config");
                Self::default()
            }
        }
    }

    /// Parse config text, falling back to defaults when it does not parse
    pub fn from_toml(content: &str) -> Self {
        match toml::from_str(content) {
            Ok(config) => {
                log::info!("Loaded app config from file");
                config
            }
            Err(e) => {
                log::warn!("Failed to parse config file: {}", e);
                Self::default()
            }
        }
    }

    /// Period of list refreshes, never shorter than one second
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Request used for new tabs and after the last tab closes
    pub fn default_request(&self) -> RestRequest {
        RestRequest::untitled(self.default_endpoint.clone())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.default_endpoint, "https://echo.hoppscotch.io");
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert!(config.restore_tabs);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config = AppConfig::from_toml(
            r#"
            default_endpoint = "http://localhost:8080"
        "#,
        );
        assert_eq!(config.default_endpoint, "http://localhost:8080");
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.default_request().endpoint, "http://localhost:8080");
    }

    #[test]
    fn test_unparsable_config_gives_defaults() {
        let config = AppConfig::from_toml("poll_interval_secs = \"often\"");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = AppConfig::from_toml("poll_interval_secs = 0");
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }
}
