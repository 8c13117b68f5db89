//! Venue rating aggregation
//!
//! This module folds individual star ratings into a per-entity running
//! summary. Persisting the summary is the repository's job.

pub mod aggregator;

// Re-export commonly used types
pub use aggregator::{RatingAggregator, RatingState, MAX_RATING_VALUE, MIN_RATING_VALUE};
