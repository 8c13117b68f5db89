//! Metrics and monitoring for the court-finder discovery service
//!
//! Prometheus counters, gauges and histograms for catalog listings, ratings
//! and pairing runs. The scrape endpoint lives with the HTTP API.

pub mod collector;

pub use collector::{
    CatalogMetrics, MetricsCollector, MetricsTimer, PairingMetrics, PerformanceMetrics,
    RatingMetrics, ServiceMetrics,
};
