//! Service layer for the court-finder discovery service
//!
//! This module contains the discovery service, the application state, health
//! checks and the HTTP API that exposes them.

pub mod app;
pub mod discovery;
pub mod health;
pub mod server;

pub use app::{AppState, ServiceError};
pub use discovery::{DiscoveryService, DiscoveryStats};
pub use health::{HealthCheck, HealthStatus};
pub use server::{create_router, ApiServer, PairingRequest};
