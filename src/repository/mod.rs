//! Repository interface for catalog, player and rating data
//!
//! The discovery engine itself is stateless; everything it reads or writes
//! goes through a [`DiscoveryRepository`].

pub mod memory;
pub mod seed;

use crate::rating::RatingState;
use crate::types::{CatalogItem, CatalogKind, Player};
use async_trait::async_trait;

// Re-export commonly used types
pub use memory::InMemoryRepository;
pub use seed::DataSet;

/// Storage backing the discovery service.
///
/// `load_rating_state` followed by `save_rating_state` is not atomic on its
/// own. Callers that fold ratings must serialize read-fold-write per entity
/// (the discovery service does this with a per-entity lock), and a shared
/// backing store must do the same across processes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscoveryRepository: Send + Sync {
    /// All catalog items of one kind, in storage order
    async fn load_catalog(&self, kind: CatalogKind) -> crate::error::Result<Vec<CatalogItem>>;

    /// Look up a single catalog item of any kind
    async fn find_item(&self, item_id: &str) -> crate::error::Result<Option<CatalogItem>>;

    /// The full player pool, busy players included
    async fn load_players(&self) -> crate::error::Result<Vec<Player>>;

    /// Rating summary for an entity, the empty state when none is stored
    async fn load_rating_state(&self, entity_id: &str) -> crate::error::Result<RatingState>;

    async fn save_rating_state(
        &self,
        entity_id: &str,
        state: RatingState,
    ) -> crate::error::Result<()>;

    /// Write a new display rating and review count back onto a catalog item
    async fn update_item_rating(
        &self,
        item_id: &str,
        rating: f64,
        review_count: u64,
    ) -> crate::error::Result<()>;
}
