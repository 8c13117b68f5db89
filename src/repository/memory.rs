//! In-memory repository used by the service and the command line

use crate::error::DiscoveryError;
use crate::rating::RatingState;
use crate::repository::seed::DataSet;
use crate::repository::DiscoveryRepository;
use crate::types::{CatalogItem, CatalogKind, ItemId, Player};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Repository holding catalog, players and rating summaries in memory
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    /// Items in insertion order
    items: RwLock<Vec<CatalogItem>>,
    players: RwLock<Vec<Player>>,
    ratings: RwLock<HashMap<ItemId, RatingState>>,
}

impl InMemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository from a data set, validating every item.
    ///
    /// Items that already carry a rating and review count get a matching
    /// rating state so new observations extend the existing average.
    pub fn with_data(data: DataSet) -> crate::error::Result<Self> {
        let repository = Self::new();

        for item in data.all_items() {
            repository.insert_item(item.clone())?;
        }
        for player in data.players {
            repository.insert_player(player)?;
        }

        info!(
            "Loaded {} catalog items and {} players",
            repository.read_items()?.len(),
            repository.read_players()?.len()
        );

        Ok(repository)
    }

    /// Repository seeded with the built-in demo data
    pub fn demo() -> crate::error::Result<Self> {
        Self::with_data(DataSet::demo())
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        Self::with_data(DataSet::from_file(path)?)
    }

    /// Insert or replace a catalog item
    pub fn insert_item(&self, item: CatalogItem) -> crate::error::Result<()> {
        item.validate()?;

        let mut ratings = self.write_ratings()?;
        if item.review_count > 0 {
            ratings.insert(
                item.id.clone(),
                RatingState::from_mean(item.review_count, item.rating),
            );
        } else {
            ratings.remove(&item.id);
        }
        drop(ratings);

        let mut items = self.write_items()?;
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        Ok(())
    }

    /// Insert or replace a player
    pub fn insert_player(&self, player: Player) -> crate::error::Result<()> {
        let mut players = self.write_players()?;
        match players.iter_mut().find(|existing| existing.id == player.id) {
            Some(existing) => *existing = player,
            None => players.push(player),
        }
        Ok(())
    }

    fn read_items(&self) -> Result<RwLockReadGuard<'_, Vec<CatalogItem>>, DiscoveryError> {
        self.items.read().map_err(|_| DiscoveryError::InternalError {
            message: "Failed to acquire catalog read lock".to_string(),
        })
    }

    fn write_items(&self) -> Result<RwLockWriteGuard<'_, Vec<CatalogItem>>, DiscoveryError> {
        self.items.write().map_err(|_| DiscoveryError::InternalError {
            message: "Failed to acquire catalog write lock".to_string(),
        })
    }

    fn read_players(&self) -> Result<RwLockReadGuard<'_, Vec<Player>>, DiscoveryError> {
        self.players.read().map_err(|_| DiscoveryError::InternalError {
            message: "Failed to acquire players read lock".to_string(),
        })
    }

    fn write_players(&self) -> Result<RwLockWriteGuard<'_, Vec<Player>>, DiscoveryError> {
        self.players.write().map_err(|_| DiscoveryError::InternalError {
            message: "Failed to acquire players write lock".to_string(),
        })
    }

    fn read_ratings(
        &self,
    ) -> Result<RwLockReadGuard<'_, HashMap<ItemId, RatingState>>, DiscoveryError> {
        self.ratings.read().map_err(|_| DiscoveryError::InternalError {
            message: "Failed to acquire ratings read lock".to_string(),
        })
    }

    fn write_ratings(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<ItemId, RatingState>>, DiscoveryError> {
        self.ratings.write().map_err(|_| DiscoveryError::InternalError {
            message: "Failed to acquire ratings write lock".to_string(),
        })
    }
}

#[async_trait]
impl DiscoveryRepository for InMemoryRepository {
    async fn load_catalog(&self, kind: CatalogKind) -> crate::error::Result<Vec<CatalogItem>> {
        let items = self.read_items()?;
        Ok(items.iter().filter(|item| item.kind == kind).cloned().collect())
    }

    async fn find_item(&self, item_id: &str) -> crate::error::Result<Option<CatalogItem>> {
        let items = self.read_items()?;
        Ok(items.iter().find(|item| item.id == item_id).cloned())
    }

    async fn load_players(&self) -> crate::error::Result<Vec<Player>> {
        Ok(self.read_players()?.clone())
    }

    async fn load_rating_state(&self, entity_id: &str) -> crate::error::Result<RatingState> {
        let ratings = self.read_ratings()?;
        Ok(ratings.get(entity_id).copied().unwrap_or_default())
    }

    async fn save_rating_state(
        &self,
        entity_id: &str,
        state: RatingState,
    ) -> crate::error::Result<()> {
        debug!(
            "Saving rating state for {}: count={}, sum={}",
            entity_id, state.count, state.sum
        );
        self.write_ratings()?.insert(entity_id.to_string(), state);
        Ok(())
    }

    async fn update_item_rating(
        &self,
        item_id: &str,
        rating: f64,
        review_count: u64,
    ) -> crate::error::Result<()> {
        let mut items = self.write_items()?;
        let item = items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| DiscoveryError::EntityNotFound {
                entity_id: item_id.to_string(),
            })?;

        item.rating = rating;
        item.review_count = review_count;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Availability;

    fn create_test_item(id: &str, kind: CatalogKind) -> CatalogItem {
        CatalogItem::new(id, kind, format!("Item {}", id)).with_location("Gotri")
    }

    #[tokio::test]
    async fn test_load_catalog_by_kind() {
        let repository = InMemoryRepository::new();
        repository
            .insert_item(create_test_item("v1", CatalogKind::Venue))
            .unwrap();
        repository
            .insert_item(create_test_item("m1", CatalogKind::Match))
            .unwrap();
        repository
            .insert_item(create_test_item("v2", CatalogKind::Venue))
            .unwrap();

        let venues = repository.load_catalog(CatalogKind::Venue).await.unwrap();
        let ids: Vec<&str> = venues.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "v2"]);

        let tournaments = repository
            .load_catalog(CatalogKind::Tournament)
            .await
            .unwrap();
        assert!(tournaments.is_empty());
    }

    #[tokio::test]
    async fn test_insert_replaces_existing_item() {
        let repository = InMemoryRepository::new();
        repository
            .insert_item(create_test_item("v1", CatalogKind::Venue).with_price(100.0))
            .unwrap();
        repository
            .insert_item(create_test_item("v1", CatalogKind::Venue).with_price(250.0))
            .unwrap();

        let venues = repository.load_catalog(CatalogKind::Venue).await.unwrap();
        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].price, 250.0);
    }

    #[tokio::test]
    async fn test_replacing_with_unreviewed_item_resets_rating_state() {
        let repository = InMemoryRepository::new();
        let mut reviewed = create_test_item("v1", CatalogKind::Venue).with_rating(4.0);
        reviewed.review_count = 10;
        repository.insert_item(reviewed).unwrap();
        assert_eq!(repository.load_rating_state("v1").await.unwrap().count, 10);

        repository
            .insert_item(create_test_item("v1", CatalogKind::Venue))
            .unwrap();
        assert!(repository.load_rating_state("v1").await.unwrap().is_empty());
    }

    #[test]
    fn test_invalid_item_is_rejected() {
        let repository = InMemoryRepository::new();
        let result = repository.insert_item(create_test_item("v1", CatalogKind::Venue).with_price(-5.0));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unknown_rating_state_is_empty() {
        let repository = InMemoryRepository::new();
        let state = repository.load_rating_state("nobody").await.unwrap();
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_rating_state_roundtrip_and_write_back() {
        let repository = InMemoryRepository::new();
        repository
            .insert_item(create_test_item("v1", CatalogKind::Venue))
            .unwrap();

        let state = RatingState { count: 2, sum: 9.0 };
        repository.save_rating_state("v1", state).await.unwrap();
        assert_eq!(repository.load_rating_state("v1").await.unwrap(), state);

        repository.update_item_rating("v1", 4.5, 2).await.unwrap();
        let item = repository.find_item("v1").await.unwrap().unwrap();
        assert_eq!(item.rating, 4.5);
        assert_eq!(item.review_count, 2);

        assert!(repository.update_item_rating("missing", 3.0, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_demo_seeds_rating_states_from_reviews() {
        let repository = InMemoryRepository::demo().unwrap();

        let state = repository.load_rating_state("venue-1").await.unwrap();
        assert_eq!(state.count, 156);
        assert!((state.mean() - 4.8).abs() < 1e-9);

        let players = repository.load_players().await.unwrap();
        assert_eq!(players.len(), 8);
        assert_eq!(
            players
                .iter()
                .filter(|p| p.availability == Availability::Busy)
                .count(),
            1
        );
    }
}
