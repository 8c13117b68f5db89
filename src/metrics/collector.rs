//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the court-finder discovery
//! service using Prometheus metrics.

use crate::types::{CatalogKind, SkillLevel};
use anyhow::Result;
use prometheus::{
    Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the discovery service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    service_metrics: ServiceMetrics,
    catalog_metrics: CatalogMetrics,
    rating_metrics: RatingMetrics,
    pairing_metrics: PairingMetrics,
    performance_metrics: PerformanceMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Component health status
    pub component_health: IntGaugeVec,
}

/// Catalog listing metrics
#[derive(Clone)]
pub struct CatalogMetrics {
    /// Listing queries by catalog kind and outcome
    pub queries_total: IntCounterVec,

    /// Number of items returned per listing
    pub query_results: HistogramVec,

    /// Join eligibility checks by outcome
    pub join_checks_total: IntCounterVec,
}

/// Rating aggregation metrics
#[derive(Clone)]
pub struct RatingMetrics {
    /// Submitted ratings by outcome
    pub ratings_submitted_total: IntCounterVec,

    /// Star values accepted, by value
    pub rating_values_total: IntCounterVec,
}

/// Pairing metrics
#[derive(Clone)]
pub struct PairingMetrics {
    /// Pairing runs by skill bracket
    pub pairing_runs_total: IntCounterVec,

    /// Players that received an opponent
    pub players_paired_total: IntCounter,

    /// Players left without an opponent
    pub players_unpaired_total: IntCounter,

    /// Largest skill gap in the most recent run
    pub last_max_skill_gap: Gauge,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Discovery operation durations
    pub operation_duration: HistogramVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let catalog_metrics = CatalogMetrics::new(&registry)?;
        let rating_metrics = RatingMetrics::new(&registry)?;
        let pairing_metrics = PairingMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            catalog_metrics,
            rating_metrics,
            pairing_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    pub fn catalog(&self) -> &CatalogMetrics {
        &self.catalog_metrics
    }

    pub fn rating(&self) -> &RatingMetrics {
        &self.rating_metrics
    }

    pub fn pairing(&self) -> &PairingMetrics {
        &self.pairing_metrics
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a catalog listing
    pub fn record_catalog_query(
        &self,
        kind: CatalogKind,
        result_count: Option<usize>,
        duration: Duration,
    ) {
        let outcome = if result_count.is_some() { "ok" } else { "rejected" };

        self.catalog_metrics
            .queries_total
            .with_label_values(&[kind.as_str(), outcome])
            .inc();

        if let Some(count) = result_count {
            self.catalog_metrics
                .query_results
                .with_label_values(&[kind.as_str()])
                .observe(count as f64);
        }

        self.record_operation("catalog_query", duration);
    }

    /// Record a join eligibility check
    pub fn record_join_check(&self, joinable: bool) {
        let outcome = if joinable { "open" } else { "full" };
        self.catalog_metrics
            .join_checks_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Record a rating submission and the value it carried, if accepted
    pub fn record_rating(&self, accepted_value: Option<i64>, duration: Duration) {
        match accepted_value {
            Some(value) => {
                let value = value.to_string();
                self.rating_metrics
                    .ratings_submitted_total
                    .with_label_values(&["accepted"])
                    .inc();
                self.rating_metrics
                    .rating_values_total
                    .with_label_values(&[value.as_str()])
                    .inc();
            }
            None => {
                self.rating_metrics
                    .ratings_submitted_total
                    .with_label_values(&["rejected"])
                    .inc();
            }
        }

        self.record_operation("submit_rating", duration);
    }

    /// Record a pairing run
    pub fn record_pairing(
        &self,
        bracket: Option<SkillLevel>,
        paired: usize,
        unpaired: usize,
        max_skill_gap: f64,
        duration: Duration,
    ) {
        let bracket = match bracket {
            Some(SkillLevel::Beginner) => "beginner",
            Some(SkillLevel::Intermediate) => "intermediate",
            Some(SkillLevel::Advanced) => "advanced",
            Some(SkillLevel::Open) => "open",
            None => "all",
        };

        self.pairing_metrics
            .pairing_runs_total
            .with_label_values(&[bracket])
            .inc();
        self.pairing_metrics
            .players_paired_total
            .inc_by(paired as u64);
        self.pairing_metrics
            .players_unpaired_total
            .inc_by(unpaired as u64);
        self.pairing_metrics.last_max_skill_gap.set(max_skill_gap);

        self.record_operation("propose_pairs", duration);
    }

    /// Record operation duration
    pub fn record_operation(&self, operation: &str, duration: Duration) {
        self.performance_metrics
            .operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Update uptime
    pub fn update_uptime(&self, uptime: Duration) {
        self.service_metrics
            .uptime_seconds
            .set(uptime.as_secs() as i64);
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update component health
    pub fn update_component_health(&self, component: &str, healthy: bool) {
        let status = if healthy { 1 } else { 0 };
        self.service_metrics
            .component_health
            .with_label_values(&[component])
            .set(status);
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    /// Start timing now
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("court_finder_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "court_finder_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let component_health = IntGaugeVec::new(
            Opts::new("court_finder_component_health", "Component health status"),
            &["component"],
        )?;
        registry.register(Box::new(component_health.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
            component_health,
        })
    }
}

impl CatalogMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let queries_total = IntCounterVec::new(
            Opts::new("court_finder_catalog_queries_total", "Catalog listings served"),
            &["kind", "outcome"],
        )?;
        registry.register(Box::new(queries_total.clone()))?;

        let query_results = HistogramVec::new(
            HistogramOpts::new(
                "court_finder_catalog_query_results",
                "Items returned per catalog listing",
            )
            .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 500.0]),
            &["kind"],
        )?;
        registry.register(Box::new(query_results.clone()))?;

        let join_checks_total = IntCounterVec::new(
            Opts::new("court_finder_join_checks_total", "Join eligibility checks"),
            &["outcome"],
        )?;
        registry.register(Box::new(join_checks_total.clone()))?;

        Ok(Self {
            queries_total,
            query_results,
            join_checks_total,
        })
    }
}

impl RatingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let ratings_submitted_total = IntCounterVec::new(
            Opts::new("court_finder_ratings_submitted_total", "Rating submissions"),
            &["outcome"],
        )?;
        registry.register(Box::new(ratings_submitted_total.clone()))?;

        let rating_values_total = IntCounterVec::new(
            Opts::new("court_finder_rating_values_total", "Accepted star values"),
            &["value"],
        )?;
        registry.register(Box::new(rating_values_total.clone()))?;

        Ok(Self {
            ratings_submitted_total,
            rating_values_total,
        })
    }
}

impl PairingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let pairing_runs_total = IntCounterVec::new(
            Opts::new("court_finder_pairing_runs_total", "Pairing runs"),
            &["bracket"],
        )?;
        registry.register(Box::new(pairing_runs_total.clone()))?;

        let players_paired_total = IntCounter::new(
            "court_finder_players_paired_total",
            "Players that received an opponent",
        )?;
        registry.register(Box::new(players_paired_total.clone()))?;

        let players_unpaired_total = IntCounter::new(
            "court_finder_players_unpaired_total",
            "Players left without an opponent",
        )?;
        registry.register(Box::new(players_unpaired_total.clone()))?;

        let last_max_skill_gap = Gauge::new(
            "court_finder_last_max_skill_gap",
            "Largest skill gap in the most recent pairing run",
        )?;
        registry.register(Box::new(last_max_skill_gap.clone()))?;

        Ok(Self {
            pairing_runs_total,
            players_paired_total,
            players_unpaired_total,
            last_max_skill_gap,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "court_finder_operation_duration_seconds",
                "Discovery operation duration",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self { operation_duration })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_value(collector: &MetricsCollector, name: &str) -> f64 {
        collector
            .registry()
            .gather()
            .iter()
            .find(|family| family.get_name() == name)
            .map(|family| {
                family
                    .get_metric()
                    .iter()
                    .map(|metric| metric.get_counter().get_value())
                    .sum()
            })
            .unwrap_or(0.0)
    }

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        let _service = collector.service();
        let _catalog = collector.catalog();
        let _rating = collector.rating();
        let _pairing = collector.pairing();
        let _performance = collector.performance();
    }

    #[test]
    fn test_catalog_and_rating_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_catalog_query(CatalogKind::Venue, Some(3), Duration::from_millis(1));
        collector.record_catalog_query(CatalogKind::Venue, None, Duration::from_millis(1));
        collector.record_rating(Some(4), Duration::from_micros(50));
        collector.record_rating(None, Duration::from_micros(10));
        collector.record_join_check(false);

        assert_eq!(counter_value(&collector, "court_finder_catalog_queries_total"), 2.0);
        assert_eq!(counter_value(&collector, "court_finder_ratings_submitted_total"), 2.0);
        assert_eq!(counter_value(&collector, "court_finder_rating_values_total"), 1.0);
        assert_eq!(counter_value(&collector, "court_finder_join_checks_total"), 1.0);
    }

    #[test]
    fn test_pairing_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_pairing(Some(SkillLevel::Advanced), 4, 1, 0.9, Duration::from_micros(5));

        assert_eq!(collector.pairing().players_paired_total.get(), 4);
        assert_eq!(collector.pairing().players_unpaired_total.get(), 1);
        assert_eq!(collector.pairing().last_max_skill_gap.get(), 0.9);
    }

    #[test]
    fn test_health_status_updates() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.update_health_status(2);
        collector.update_component_health("repository", true);
        collector.update_uptime(Duration::from_secs(42));

        assert_eq!(collector.service().health_status.get(), 2);
        assert_eq!(collector.service().uptime_seconds.get(), 42);
    }

    #[test]
    fn test_metrics_timer() {
        let timer = MetricsTimer::start();

        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.elapsed();

        assert!(duration >= Duration::from_millis(10));

        let final_duration = timer.stop();
        assert!(final_duration >= Duration::from_millis(10));
    }
}
