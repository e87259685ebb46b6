// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default API endpoint for local development.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Default reader status poll interval.
pub const DEFAULT_READER_POLL_INTERVAL_MS: u64 = 1000;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the garage REST API (no trailing slash)
    pub api_base_url: String,
    /// Directory holding the persisted cache snapshots
    pub cache_dir: PathBuf,
    /// How often the reader bridge polls for reader status
    pub reader_poll_interval: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_dir: env::temp_dir().join("garage-desk-test"),
            reader_poll_interval: Duration::from_millis(DEFAULT_READER_POLL_INTERVAL_MS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        if api_base_url.is_empty() {
            return Err(ConfigError::Invalid("API_BASE_URL", "must not be empty".into()));
        }

        let cache_dir = match env::var("CACHE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::data_dir()
                .ok_or(ConfigError::Missing("CACHE_DIR"))?
                .join("garage-desk"),
        };

        let poll_ms = match env::var("READER_POLL_INTERVAL_MS") {
            Ok(v) => v.trim().parse::<u64>().map_err(|e| {
                ConfigError::Invalid("READER_POLL_INTERVAL_MS", e.to_string())
            })?,
            Err(_) => DEFAULT_READER_POLL_INTERVAL_MS,
        };
        if poll_ms == 0 {
            return Err(ConfigError::Invalid(
                "READER_POLL_INTERVAL_MS",
                "must be greater than zero".into(),
            ));
        }

        Ok(Self {
            api_base_url,
            cache_dir,
            reader_poll_interval: Duration::from_millis(poll_ms),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
