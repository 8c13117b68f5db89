//! Catalog discovery for venues, open matches and tournaments
//!
//! This module holds the criteria filter, the ranked sorter and the query
//! that composes them, plus the flat parameter form used by the HTTP API
//! and the command line.

pub mod filter;
pub mod params;
pub mod query;
pub mod sort;

// Re-export commonly used types
pub use filter::{filter, CriteriaFilter, FeeBand, FeeBandThresholds, FilterSpec};
pub use params::FilterParams;
pub use query::CatalogQuery;
pub use sort::{RankedSorter, SortKey};
