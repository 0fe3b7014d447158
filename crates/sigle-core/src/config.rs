//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! API and app URLs, the session storage backend, session lifetime, the
//! logout policy and the last used wallet address.
//!
//! Configuration is stored at `~/.config/sigle/config.json`. The
//! `SIGLE_API_URL` and `SIGLE_APP_URL` environment variables override the
//! file values.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_API_URL;
use crate::auth::{CoordinatorOptions, DEFAULT_DOMAIN};
use crate::did::DEFAULT_SESSION_TTL_SECS;
use crate::storage::{FileStorage, KeyringStorage, SessionStorage};
use crate::wallet::Network;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "sigle";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const API_URL_ENV: &str = "SIGLE_API_URL";
pub const APP_URL_ENV: &str = "SIGLE_APP_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub app_url: Option<String>,
    pub storage: StorageBackend,
    pub session_ttl_secs: Option<i64>,
    pub clear_persisted_session_on_logout: bool,
    pub last_address: Option<String>,
    pub last_network: Option<Network>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            self.api_url = Some(url);
        }
        if let Ok(url) = std::env::var(APP_URL_ENV) {
            self.app_url = Some(url);
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Origin (scheme, host and non-default port) of the application
    pub fn origin(&self) -> Result<String> {
        let app_url = self.app_url.as_deref().unwrap_or(DEFAULT_DOMAIN);
        let url = url::Url::parse(app_url)
            .with_context(|| format!("Invalid app URL: {}", app_url))?;
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(anyhow!("App URL has no host: {}", app_url));
        }
        Ok(origin.ascii_serialization())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(
            self.session_ttl_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_SESSION_TTL_SECS),
        )
    }

    pub fn coordinator_options(&self) -> Result<CoordinatorOptions> {
        Ok(CoordinatorOptions {
            domain: self.origin()?,
            session_ttl: self.session_ttl(),
            clear_persisted_session_on_logout: self.clear_persisted_session_on_logout,
        })
    }

    /// Open the configured device-local storage backend
    pub fn open_storage(&self) -> Result<Arc<dyn SessionStorage>> {
        Ok(match self.storage {
            StorageBackend::File => Arc::new(FileStorage::new(self.cache_dir()?)),
            StorageBackend::Keyring => Arc::new(KeyringStorage::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.origin().unwrap(), "https://app.sigle.io");
        assert_eq!(config.session_ttl(), Duration::seconds(DEFAULT_SESSION_TTL_SECS));

        let options = config.coordinator_options().unwrap();
        assert!(!options.clear_persisted_session_on_logout);
        assert_eq!(options, CoordinatorOptions::default());
    }

    #[test]
    fn test_origin_strips_path_and_keeps_port() {
        let config = Config {
            app_url: Some("http://localhost:3000/dashboard?tab=stories".to_string()),
            ..Default::default()
        };
        assert_eq!(config.origin().unwrap(), "http://localhost:3000");

        let config = Config {
            app_url: Some("https://app.sigle.io:443/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.origin().unwrap(), "https://app.sigle.io");
    }

    #[test]
    fn test_origin_rejects_opaque_urls() {
        let config = Config {
            app_url: Some("data:text/plain,hello".to_string()),
            ..Default::default()
        };
        assert!(config.origin().is_err());

        let config = Config {
            app_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(config.origin().is_err());
    }

    #[test]
    fn test_non_positive_ttl_falls_back() {
        let config = Config {
            session_ttl_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(config.session_ttl(), Duration::seconds(DEFAULT_SESSION_TTL_SECS));

        let config = Config {
            session_ttl_secs: Some(3600),
            ..Default::default()
        };
        assert_eq!(config.session_ttl(), Duration::hours(1));
    }

    #[test]
    fn test_save_and_load_roundtrip_with_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sigle").join(CONFIG_FILE);

        assert!(Config::load_from(&path).unwrap().last_address.is_none());

        let config = Config {
            storage: StorageBackend::Keyring,
            last_address: Some("0xABC".to_string()),
            last_network: Some(Network::Ethereum),
            clear_persisted_session_on_logout: true,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.storage, StorageBackend::Keyring);
        assert_eq!(loaded.last_address.as_deref(), Some("0xABC"));
        assert!(loaded.clear_persisted_session_on_logout);

        // Missing fields take their defaults
        std::fs::write(&path, r#"{"storage":"file"}"#).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.storage, StorageBackend::File);
        assert!(!loaded.clear_persisted_session_on_logout);
    }
}
