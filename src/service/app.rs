//! Main application state and service coordination
//!
//! This module contains the AppState that wires the repository, discovery
//! service and metrics together for the HTTP API.

use crate::config::AppConfig;
use crate::metrics::MetricsCollector;
use crate::repository::{DiscoveryRepository, InMemoryRepository};
use crate::service::discovery::DiscoveryService;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Data loading error: {message}")]
    DataLoading { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Discovery operations over the configured repository
    discovery: Arc<DiscoveryService>,

    /// Prometheus metrics shared with the HTTP endpoints
    metrics: Arc<MetricsCollector>,

    /// Service status
    is_running: RwLock<bool>,

    started_at: Instant,
}

impl AppState {
    /// Initialize the application, loading the configured data set
    pub fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing court-finder discovery service");

        let repository = match &config.discovery.data_file {
            Some(path) => {
                info!("Loading catalog data from {}", path.display());
                InMemoryRepository::from_json_file(path).map_err(|e| {
                    ServiceError::DataLoading {
                        message: format!("Failed to load {}: {:#}", path.display(), e),
                    }
                })?
            }
            None => {
                info!("No data file configured, using built-in demo data");
                InMemoryRepository::demo().map_err(|e| ServiceError::DataLoading {
                    message: format!("Failed to load demo data: {:#}", e),
                })?
            }
        };

        Self::with_repository(config, Arc::new(repository))
    }

    /// Initialize the application over an existing repository
    pub fn with_repository(
        config: AppConfig,
        repository: Arc<dyn DiscoveryRepository>,
    ) -> Result<Self, ServiceError> {
        crate::config::validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            }
        })?);

        let discovery = Arc::new(
            DiscoveryService::new(repository, &config.discovery).with_metrics(metrics.clone()),
        );

        info!(
            "Configuration: service={}, default_sort={}, rating_precision={}",
            config.service.name,
            config.discovery.default_sort,
            config.discovery.rating_display_precision
        );

        Ok(Self {
            config,
            discovery,
            metrics,
            is_running: RwLock::new(false),
            started_at: Instant::now(),
        })
    }

    /// Mark the service as accepting requests
    pub async fn start(&self) {
        *self.is_running.write().await = true;
        info!("Court-finder discovery service started");
    }

    /// Mark the service as stopped and log final statistics
    pub async fn shutdown(&self) {
        info!("Starting graceful shutdown of court-finder service");
        *self.is_running.write().await = false;

        info!("Final service statistics: {:?}", self.discovery.stats());
        info!("Court-finder service shutdown completed");
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn discovery(&self) -> Arc<DiscoveryService> {
        self.discovery.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
