//! Main application configuration
//!
//! This module defines the top-level configuration for the cohort engine,
//! including TOML file loading, environment variable overrides and validation.

use crate::config::{CohortSettings, EngineSettings, ProviderSettings};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub providers: ProviderSettings,
    pub engine: EngineSettings,
    pub cohorts: CohortSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "cohort-engine".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse a TOML document; missing sections keep their defaults
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Provider settings
        if let Ok(timeout) = env::var("PROVIDER_TIMEOUT_MS") {
            self.providers.http_timeout_ms = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid PROVIDER_TIMEOUT_MS value: {}", timeout))?;
        }
        if let Ok(url) = env::var("LICHESS_BASE_URL") {
            self.providers.lichess_base_url = url;
        }
        if let Ok(url) = env::var("CHESSCOM_BASE_URL") {
            self.providers.chesscom_base_url = url;
        }
        if let Ok(url) = env::var("USCF_BASE_URL") {
            self.providers.uscf_base_url = url;
        }
        if let Ok(url) = env::var("FIDE_BASE_URL") {
            self.providers.fide_base_url = url;
        }

        // Engine settings
        if let Ok(timeout) = env::var("FETCH_TIMEOUT_MS") {
            self.engine.fetch_timeout_ms = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid FETCH_TIMEOUT_MS value: {}", timeout))?;
        }
        if let Ok(max_fetches) = env::var("MAX_CONCURRENT_FETCHES") {
            self.engine.max_concurrent_fetches = max_fetches
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_CONCURRENT_FETCHES value: {}", max_fetches))?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate timeouts
    if config.providers.http_timeout_ms == 0 {
        return Err(anyhow!("Provider HTTP timeout must be greater than 0"));
    }
    if config.engine.fetch_timeout_ms == 0 {
        return Err(anyhow!("Fetch timeout must be greater than 0"));
    }
    if config.engine.max_concurrent_fetches == 0 {
        return Err(anyhow!("Max concurrent fetches must be greater than 0"));
    }

    // Validate provider endpoints
    for (name, url) in [
        ("Lichess", &config.providers.lichess_base_url),
        ("Chess.com", &config.providers.chesscom_base_url),
        ("USCF", &config.providers.uscf_base_url),
        ("FIDE", &config.providers.fide_base_url),
    ] {
        if url.is_empty() {
            return Err(anyhow!("{} base URL cannot be empty", name));
        }
    }

    config.cohorts.validate()?;

    Ok(())
}
