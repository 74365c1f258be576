//! Configuration module for the showdeck client.
//!
//! Loads configuration from `config.toml` with environment variable overrides.

use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::error::AppError;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Catalog API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the catalog API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for listing and search calls, in milliseconds.
    #[serde(default = "default_listing_timeout_ms")]
    pub listing_timeout_ms: u64,
    /// Timeout for show detail calls, in milliseconds.
    #[serde(default = "default_detail_timeout_ms")]
    pub detail_timeout_ms: u64,
    /// Number of listing pages fetched by the initial index load.
    #[serde(default = "default_initial_pages")]
    pub initial_pages: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing_timeout_ms: default_listing_timeout_ms(),
            detail_timeout_ms: default_detail_timeout_ms(),
            initial_pages: default_initial_pages(),
        }
    }
}

impl ApiConfig {
    /// Timeout for listing and search calls.
    pub fn listing_timeout(&self) -> Duration {
        Duration::from_millis(self.listing_timeout_ms)
    }

    /// Timeout for show detail calls.
    pub fn detail_timeout(&self) -> Duration {
        Duration::from_millis(self.detail_timeout_ms)
    }

    /// The page range requested by the initial index load.
    pub fn initial_page_range(&self) -> Vec<u32> {
        (0..self.initial_pages).collect()
    }
}

fn default_base_url() -> String {
    "https://api.tvmaze.com".to_string()
}

fn default_listing_timeout_ms() -> u64 {
    10_000
}

fn default_detail_timeout_ms() -> u64 {
    12_000
}

fn default_initial_pages() -> u32 {
    6
}

/// Autocomplete search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Minimum trimmed term length before a search is issued.
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    /// Quiet period after the last keystroke before the search fires,
    /// in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl SearchConfig {
    /// The debounce quiet period.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_min_chars() -> usize {
    2
}

fn default_debounce_ms() -> u64 {
    250
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `config.toml` in current directory (optional)
    /// 3. Environment variables with `SHOWDECK_` prefix
    ///
    /// Environment variables use double underscore for nesting:
    /// - `SHOWDECK_API__BASE_URL=http://localhost:8080` sets `api.base_url`
    /// - `SHOWDECK_SEARCH__DEBOUNCE_MS=100` sets `search.debounce_ms`
    pub fn load() -> Result<Self, AppError> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from(config_path: &str) -> Result<Self, AppError> {
        let config = ConfigLoader::builder()
            // Start with defaults
            .set_default("api.base_url", default_base_url())?
            .set_default("api.listing_timeout_ms", 10_000)?
            .set_default("api.detail_timeout_ms", 12_000)?
            .set_default("api.initial_pages", 6)?
            .set_default("search.min_chars", 2)?
            .set_default("search.debounce_ms", 250)?
            // Add config file (optional)
            .add_source(File::with_name(config_path).required(false))
            // Override with environment variables
            // SHOWDECK_API__BASE_URL=... -> api.base_url = ...
            .add_source(
                Environment::with_prefix("SHOWDECK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        Ok(config)
    }
}
