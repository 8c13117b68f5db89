//! Discovery service coordinating repository access and the engines
//!
//! The catalog query, rating aggregator and pairing engine are pure. This
//! service loads their inputs from the repository, persists their outputs,
//! and records metrics around each operation.

use crate::catalog::{CatalogQuery, FilterSpec, SortKey};
use crate::config::DiscoverySettings;
use crate::error::{DiscoveryError, Result};
use crate::matchmaking::PairingEngine;
use crate::metrics::{MetricsCollector, MetricsTimer};
use crate::rating::RatingAggregator;
use crate::repository::DiscoveryRepository;
use crate::types::{
    CatalogItem, CatalogKind, ItemId, PairingProposal, RatingObservation, RatingUpdate,
    SkillLevel,
};
use crate::utils::{current_timestamp, generate_proposal_id};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Counters reported by health checks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryStats {
    pub catalog_queries: u64,
    pub ratings_accepted: u64,
    pub ratings_rejected: u64,
    pub pairing_runs: u64,
    pub players_paired: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    catalog_queries: AtomicU64,
    ratings_accepted: AtomicU64,
    ratings_rejected: AtomicU64,
    pairing_runs: AtomicU64,
    players_paired: AtomicU64,
}

impl StatsCounters {
    fn snapshot(&self) -> DiscoveryStats {
        DiscoveryStats {
            catalog_queries: self.catalog_queries.load(Ordering::Relaxed),
            ratings_accepted: self.ratings_accepted.load(Ordering::Relaxed),
            ratings_rejected: self.ratings_rejected.load(Ordering::Relaxed),
            pairing_runs: self.pairing_runs.load(Ordering::Relaxed),
            players_paired: self.players_paired.load(Ordering::Relaxed),
        }
    }
}

/// Entry point for every discovery operation
pub struct DiscoveryService {
    repository: Arc<dyn DiscoveryRepository>,
    catalog_query: CatalogQuery,
    pairing_engine: PairingEngine,
    default_sort: SortKey,
    rating_display_precision: u32,
    /// One lock per rated entity so read-fold-write never interleaves
    rating_locks: Mutex<HashMap<ItemId, Arc<tokio::sync::Mutex<()>>>>,
    metrics: Option<Arc<MetricsCollector>>,
    stats: StatsCounters,
}

impl DiscoveryService {
    pub fn new(repository: Arc<dyn DiscoveryRepository>, settings: &DiscoverySettings) -> Self {
        Self {
            repository,
            catalog_query: CatalogQuery::new(settings.fee_bands),
            pairing_engine: PairingEngine::new(),
            default_sort: settings.default_sort,
            rating_display_precision: settings.rating_display_precision,
            rating_locks: Mutex::new(HashMap::new()),
            metrics: None,
            stats: StatsCounters::default(),
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn repository(&self) -> Arc<dyn DiscoveryRepository> {
        self.repository.clone()
    }

    pub fn default_sort(&self) -> SortKey {
        self.default_sort
    }

    pub fn stats(&self) -> DiscoveryStats {
        self.stats.snapshot()
    }

    /// Filtered and ordered listing of one catalog kind
    pub async fn query_catalog(
        &self,
        kind: CatalogKind,
        spec: &FilterSpec,
        sort: Option<SortKey>,
    ) -> Result<Vec<CatalogItem>> {
        let timer = MetricsTimer::start();
        let sort = sort.unwrap_or(self.default_sort);

        let items = self.repository.load_catalog(kind).await?;
        let result = self.catalog_query.query(&items, spec, sort);

        if let Some(metrics) = &self.metrics {
            let count = result.as_ref().ok().map(Vec::len);
            metrics.record_catalog_query(kind, count, timer.elapsed());
        }

        let listing = result?;
        self.stats.catalog_queries.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Catalog query for {} sorted by {}: {} of {} items",
            kind,
            sort,
            listing.len(),
            items.len()
        );

        Ok(listing)
    }

    /// Fold a star rating into an item's running average and write it back
    pub async fn submit_rating(&self, observation: RatingObservation) -> Result<RatingUpdate> {
        let timer = MetricsTimer::start();

        if let Err(e) = RatingAggregator::validate(&observation) {
            self.record_rating_outcome(None, &timer);
            warn!(
                "Rejected rating {} for {}",
                observation.value, observation.entity_id
            );
            return Err(e.into());
        }

        if self
            .repository
            .find_item(&observation.entity_id)
            .await?
            .is_none()
        {
            self.record_rating_outcome(None, &timer);
            return Err(DiscoveryError::EntityNotFound {
                entity_id: observation.entity_id,
            }
            .into());
        }

        let lock = self.entity_lock(&observation.entity_id)?;
        let _guard = lock.lock().await;

        let current = self
            .repository
            .load_rating_state(&observation.entity_id)
            .await?;
        let next = RatingAggregator::fold(&current, &observation)?;
        let display_rating = next.display_mean(self.rating_display_precision);

        self.repository
            .save_rating_state(&observation.entity_id, next)
            .await?;
        self.repository
            .update_item_rating(&observation.entity_id, display_rating, next.count)
            .await?;

        self.record_rating_outcome(Some(observation.value), &timer);
        info!(
            "Rating {} recorded for {}: {} reviews, average {}",
            observation.value, observation.entity_id, next.count, display_rating
        );

        Ok(RatingUpdate {
            entity_id: observation.entity_id,
            count: next.count,
            sum: next.sum,
            mean: next.mean(),
            display_rating,
        })
    }

    /// Pair the currently available players, optionally within one skill level
    pub async fn propose_pairs(&self, bracket: Option<SkillLevel>) -> Result<PairingProposal> {
        let timer = MetricsTimer::start();

        let players = self.repository.load_players().await?;
        let outcome = self.pairing_engine.pair_within(&players, bracket);

        let max_skill_gap = outcome.max_skill_gap();
        let total_skill_gap = outcome.total_skill_gap();

        self.stats.pairing_runs.fetch_add(1, Ordering::Relaxed);
        self.stats
            .players_paired
            .fetch_add(outcome.paired_count() as u64, Ordering::Relaxed);

        if let Some(metrics) = &self.metrics {
            metrics.record_pairing(
                bracket,
                outcome.paired_count(),
                outcome.unpaired.len(),
                max_skill_gap,
                timer.stop(),
            );
        }

        let proposal = PairingProposal {
            proposal_id: generate_proposal_id(),
            skill_level: bracket,
            pairs: outcome.pairs,
            unpaired: outcome.unpaired,
            max_skill_gap,
            total_skill_gap,
            generated_at: current_timestamp(),
        };

        info!(
            "Pairing proposal {}: {} pairs, {} unpaired, max gap {:.2}",
            proposal.proposal_id,
            proposal.pairs.len(),
            proposal.unpaired.len(),
            max_skill_gap
        );

        Ok(proposal)
    }

    /// Look up an item and confirm it still has open spots
    pub async fn check_joinable(&self, item_id: &str) -> Result<CatalogItem> {
        let item = self
            .repository
            .find_item(item_id)
            .await?
            .ok_or_else(|| DiscoveryError::EntityNotFound {
                entity_id: item_id.to_string(),
            })?;

        let joinable = item.ensure_joinable();
        if let Some(metrics) = &self.metrics {
            metrics.record_join_check(joinable.is_ok());
        }
        joinable?;

        Ok(item)
    }

    fn entity_lock(&self, entity_id: &str) -> Result<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .rating_locks
            .lock()
            .map_err(|_| DiscoveryError::InternalError {
                message: "Failed to acquire rating lock table".to_string(),
            })?;

        Ok(locks
            .entry(entity_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone())
    }

    fn record_rating_outcome(&self, accepted_value: Option<i64>, timer: &MetricsTimer) {
        let counter = if accepted_value.is_some() {
            &self.stats.ratings_accepted
        } else {
            &self.stats.ratings_rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if let Some(metrics) = &self.metrics {
            metrics.record_rating(accepted_value, timer.elapsed());
        }
    }
}
