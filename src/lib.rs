//! Court Finder - discovery and matchmaking for pickleball
//!
//! This crate filters and ranks venues, open matches and tournaments,
//! aggregates star ratings incrementally, and pairs available players of
//! similar skill. The engines are pure; the service layer adds a repository,
//! metrics and an HTTP API around them.

pub mod catalog;
pub mod config;
pub mod error;
pub mod matchmaking;
pub mod metrics;
pub mod rating;
pub mod repository;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{DiscoveryError, Result};
pub use types::*;

// Re-export key components
pub use catalog::{CatalogQuery, CriteriaFilter, FilterSpec, RankedSorter, SortKey};
pub use matchmaking::{PairingEngine, PairingOutcome};
pub use rating::{RatingAggregator, RatingState};
pub use repository::{DiscoveryRepository, InMemoryRepository};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
