//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! court-finder discovery service, including environment variable loading,
//! TOML files and validation.

use crate::catalog::{FeeBandThresholds, SortKey};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub discovery: DiscoverySettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Address the HTTP API binds to
    pub http_host: String,
    /// Port for the HTTP API, health and metrics endpoints
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Discovery engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// JSON data set to load; the built-in demo data when unset
    pub data_file: Option<PathBuf>,
    /// Sort key used when a listing request names none
    pub default_sort: SortKey,
    /// Decimal places kept when a new mean is written back to an item
    pub rating_display_precision: u32,
    pub fee_bands: FeeBandThresholds,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "court-finder".to_string(),
            log_level: "info".to_string(),
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            data_file: None,
            default_sort: SortKey::Rating,
            rating_display_precision: 1,
            fee_bands: FeeBandThresholds::default(),
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

    /// Load a TOML file, then let environment variables override it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse TOML without consulting the environment
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(contents).context("Failed to parse TOML configuration")?;
        validate_config(&config)?;
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
        if let Ok(host) = env::var("HTTP_HOST") {
            self.service.http_host = host;
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            self.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Discovery settings
        if let Ok(path) = env::var("DATA_FILE") {
            self.discovery.data_file = Some(PathBuf::from(path));
        }
        if let Ok(sort) = env::var("DEFAULT_SORT") {
            self.discovery.default_sort = sort
                .parse()
                .map_err(|_| anyhow!("Invalid DEFAULT_SORT value: {}", sort))?;
        }
        if let Ok(low_max) = env::var("FEE_BAND_LOW_MAX") {
            self.discovery.fee_bands.low_max = low_max
                .parse()
                .map_err(|_| anyhow!("Invalid FEE_BAND_LOW_MAX value: {}", low_max))?;
        }
        if let Ok(medium_max) = env::var("FEE_BAND_MEDIUM_MAX") {
            self.discovery.fee_bands.medium_max = medium_max
                .parse()
                .map_err(|_| anyhow!("Invalid FEE_BAND_MEDIUM_MAX value: {}", medium_max))?;
        }
        if let Ok(precision) = env::var("RATING_DISPLAY_PRECISION") {
            self.discovery.rating_display_precision = precision
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_DISPLAY_PRECISION value: {}", precision))?;
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.http_host, self.service.http_port)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }
    if config.service.http_host.is_empty() {
        return Err(anyhow!("HTTP host cannot be empty"));
    }
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    // Validate discovery settings
    if config.discovery.rating_display_precision > 6 {
        return Err(anyhow!(
            "Rating display precision must be at most 6, got {}",
            config.discovery.rating_display_precision
        ));
    }
    config.discovery.fee_bands.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        validate_config(&config).unwrap();
        assert_eq!(config.service.http_port, 8080);
        assert_eq!(config.discovery.default_sort, SortKey::Rating);
        assert_eq!(config.discovery.rating_display_precision, 1);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [service]
            http_port = 9090

            [discovery]
            default_sort = "price"

            [discovery.fee_bands]
            low_max = 250.0
            "#,
        )
        .unwrap();

        assert_eq!(config.service.http_port, 9090);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.discovery.default_sort, SortKey::Price);
        assert_eq!(config.discovery.fee_bands.low_max, 250.0);
        assert_eq!(config.discovery.fee_bands.medium_max, 700.0);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.service.http_port = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.discovery.fee_bands.medium_max = 100.0;
        assert!(validate_config(&config).is_err());

        assert!(AppConfig::from_toml_str("[service]\nhttp_port = \"eighty\"").is_err());
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
    }
}
