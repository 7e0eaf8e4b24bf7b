//! Configuration management for cinetui
//!
//! Handles config file loading/saving and API key lookup.
//! Config is stored at ~/.config/cinetui/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::tmdb::DEFAULT_BASE_URL;

/// Default image CDN prefix for posters and portraits
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Default freshness window for cached catalog reads
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 60;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// TMDB API key (v3 key or v4 read access token)
    pub tmdb_api_key: Option<String>,
    /// Override for the TMDB API endpoint
    pub api_base_url: Option<String>,
    /// Override for the image CDN prefix
    pub image_base_url: Option<String>,
    /// Seconds a cached read counts as fresh
    pub cache_max_age_secs: Option<u64>,
}

impl Config {
    /// Get config file path (~/.config/cinetui/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cinetui").join("config.toml"))
    }

    /// Load config from the default file, or return default if not found
    pub fn load() -> Self {
        Self::path().map(|p| Self::load_from(&p)).unwrap_or_default()
    }

    /// Load config from a specific file, or return default if missing/invalid
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// TMDB API key: `TMDB_API_KEY` from the environment wins over the file
    pub fn tmdb_api_key(&self) -> Option<String> {
        std::env::var("TMDB_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.tmdb_api_key.clone())
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn image_base_url(&self) -> &str {
        self.image_base_url.as_deref().unwrap_or(DEFAULT_IMAGE_BASE_URL)
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs.unwrap_or(DEFAULT_CACHE_MAX_AGE_SECS))
    }
}
