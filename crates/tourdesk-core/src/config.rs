//! Application configuration management.
//!
//! Configuration is stored at `~/.config/tourdesk/config.json` and holds the
//! last used login email plus optional overrides for the API location, cache
//! lifetime and request timeout. The API origin can also come from the
//! environment (or a `.env` file loaded at startup):
//!
//! - `NEXT_PUBLIC_API_URL`: resource endpoints (`/users`, `/cities`, ...)
//! - `NEXT_PUBLIC_API_BASE_URL`: `/login` and `/me`; falls back to the API URL
//!
//! Environment values win over the config file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "tourdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

pub const API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";
pub const AUTH_URL_ENV: &str = "NEXT_PUBLIC_API_BASE_URL";

/// Lists are reused for five minutes before refetching.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub last_email: Option<String>,
    #[serde(default)]
    pub remember_password: bool,
    pub api_url: Option<String>,
    pub auth_url: Option<String>,
    pub cache_ttl_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

/// Resolved API origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_url: String,
    pub auth_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
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
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join("logs"))
    }

    pub fn endpoints(&self) -> Endpoints {
        self.resolve_endpoints(|key| std::env::var(key).ok())
    }

    fn resolve_endpoints(&self, env: impl Fn(&str) -> Option<String>) -> Endpoints {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let api_url = non_empty(env(API_URL_ENV))
            .or_else(|| non_empty(self.api_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let auth_url = non_empty(env(AUTH_URL_ENV))
            .or_else(|| non_empty(self.auth_url.clone()))
            .unwrap_or_else(|| api_url.clone());

        Endpoints {
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        // chrono rejects second counts above i64::MAX / 1000
        let secs = self
            .cache_ttl_secs
            .unwrap_or(DEFAULT_CACHE_TTL_SECS)
            .min(i64::MAX as u64 / 1000);
        chrono::Duration::seconds(secs as i64)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_default() {
        let config = Config::default();
        let endpoints = config.resolve_endpoints(|_| None);
        assert_eq!(endpoints.api_url, DEFAULT_API_URL);
        assert_eq!(endpoints.auth_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_endpoints_env_overrides_file() {
        let config = Config {
            api_url: Some("http://file.example/api".to_string()),
            ..Default::default()
        };
        let endpoints = config.resolve_endpoints(|key| match key {
            API_URL_ENV => Some("https://api.example.com/api/".to_string()),
            AUTH_URL_ENV => Some("https://auth.example.com".to_string()),
            _ => None,
        });
        assert_eq!(endpoints.api_url, "https://api.example.com/api");
        assert_eq!(endpoints.auth_url, "https://auth.example.com");
    }

    #[test]
    fn test_auth_url_falls_back_to_api_url() {
        let config = Config {
            api_url: Some("http://file.example/api".to_string()),
            ..Default::default()
        };
        let endpoints = config.resolve_endpoints(|key| match key {
            AUTH_URL_ENV => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(endpoints.auth_url, "http://file.example/api");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = Config {
            last_email: Some("admin@example.com".to_string()),
            cache_ttl_secs: Some(60),
            ..Default::default()
        };
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.last_email.as_deref(), Some("admin@example.com"));
        assert_eq!(loaded.cache_ttl(), chrono::Duration::seconds(60));
        assert_eq!(loaded.request_timeout(), std::time::Duration::from_secs(10));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = Config::load_from(&dir.path().join("absent.json")).expect("load");
        assert!(loaded.last_email.is_none());
        assert_eq!(loaded.cache_ttl(), chrono::Duration::seconds(300));
    }
}
