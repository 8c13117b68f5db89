//! Test fixtures and repository doubles for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use court_finder::error::Result;
use court_finder::rating::RatingState;
use court_finder::repository::{DataSet, DiscoveryRepository, InMemoryRepository};
use court_finder::types::{Availability, CatalogItem, CatalogKind, Player, SkillLevel};
use std::sync::{Arc, Mutex};

/// Repository operation seen by [`RecordingRepository`]
#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryCall {
    LoadCatalog(CatalogKind),
    FindItem(String),
    LoadPlayers,
    LoadRatingState(String),
    SaveRatingState(String, RatingState),
    UpdateItemRating(String, f64, u64),
}

/// In-memory repository that records every call for later assertions.
///
/// With `yield_between_reads` set it yields to the scheduler inside the
/// rating read-modify-write window, which makes lost updates visible if the
/// caller does not serialize per entity.
#[derive(Debug)]
pub struct RecordingRepository {
    inner: InMemoryRepository,
    calls: Arc<Mutex<Vec<RepositoryCall>>>,
    yield_between_reads: bool,
}

impl RecordingRepository {
    pub fn new(inner: InMemoryRepository) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
            yield_between_reads: false,
        }
    }

    pub fn demo() -> Self {
        Self::new(InMemoryRepository::demo().unwrap())
    }

    pub fn with_yielding(mut self) -> Self {
        self.yield_between_reads = true;
        self
    }

    /// Get all recorded calls (for testing)
    pub fn get_calls(&self) -> Vec<RepositoryCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Count writes of either kind
    pub fn count_writes(&self) -> usize {
        self.get_calls()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    RepositoryCall::SaveRatingState(..) | RepositoryCall::UpdateItemRating(..)
                )
            })
            .count()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    fn record(&self, call: RepositoryCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl DiscoveryRepository for RecordingRepository {
    async fn load_catalog(&self, kind: CatalogKind) -> Result<Vec<CatalogItem>> {
        self.record(RepositoryCall::LoadCatalog(kind));
        self.inner.load_catalog(kind).await
    }

    async fn find_item(&self, item_id: &str) -> Result<Option<CatalogItem>> {
        self.record(RepositoryCall::FindItem(item_id.to_string()));
        self.inner.find_item(item_id).await
    }

    async fn load_players(&self) -> Result<Vec<Player>> {
        self.record(RepositoryCall::LoadPlayers);
        self.inner.load_players().await
    }

    async fn load_rating_state(&self, entity_id: &str) -> Result<RatingState> {
        self.record(RepositoryCall::LoadRatingState(entity_id.to_string()));
        let state = self.inner.load_rating_state(entity_id).await?;
        if self.yield_between_reads {
            tokio::task::yield_now().await;
        }
        Ok(state)
    }

    async fn save_rating_state(&self, entity_id: &str, state: RatingState) -> Result<()> {
        self.record(RepositoryCall::SaveRatingState(entity_id.to_string(), state));
        self.inner.save_rating_state(entity_id, state).await
    }

    async fn update_item_rating(&self, item_id: &str, rating: f64, review_count: u64) -> Result<()> {
        self.record(RepositoryCall::UpdateItemRating(
            item_id.to_string(),
            rating,
            review_count,
        ));
        self.inner
            .update_item_rating(item_id, rating, review_count)
            .await
    }
}

/// Venue with a location, price, rating and facilities
pub fn create_test_venue(
    id: &str,
    location: &str,
    price: f64,
    rating: f64,
    facilities: &[&str],
) -> CatalogItem {
    CatalogItem::new(id, CatalogKind::Venue, format!("Venue {}", id))
        .with_location(location)
        .with_price(price)
        .with_rating(rating)
        .with_facilities(facilities.iter().copied())
}

/// Open match with a skill level and roster
pub fn create_test_match(id: &str, level: SkillLevel, current: u32, max: u32) -> CatalogItem {
    CatalogItem::new(id, CatalogKind::Match, format!("Match {}", id))
        .with_location("Community Center Courts")
        .with_skill_level(level)
        .with_capacity(current, max)
}

pub fn create_test_players(ratings: &[f64]) -> Vec<Player> {
    ratings
        .iter()
        .enumerate()
        .map(|(i, rating)| {
            Player::new(format!("player-{}", i + 1), *rating, Availability::Available)
        })
        .collect()
}

/// Repository holding only the given venues and players
pub fn create_repository(venues: Vec<CatalogItem>, players: Vec<Player>) -> InMemoryRepository {
    InMemoryRepository::with_data(DataSet {
        venues,
        players,
        ..DataSet::default()
    })
    .unwrap()
}

/// The four venues used by the rating-threshold scenario
pub fn scenario_venues() -> Vec<CatalogItem> {
    vec![
        create_test_venue("venue-a", "Alkapuri", 800.0, 4.8, &["parking", "wifi"]),
        create_test_venue("venue-b", "Sayajigunj", 600.0, 4.5, &["parking"]),
        create_test_venue("venue-c", "Fatehgunj", 500.0, 4.2, &["wifi"]),
        create_test_venue("venue-d", "Manjalpur", 700.0, 4.6, &["parking", "coaching"]),
    ]
}
