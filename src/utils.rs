//! Utility functions for the discovery engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique pairing proposal ID
pub fn generate_proposal_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Calculate the absolute difference between two ratings
pub fn rating_difference(rating1: f64, rating2: f64) -> f64 {
    (rating1 - rating2).abs()
}

/// Round to a fixed number of decimal places (4.466 at 1 -> 4.5)
pub fn round_to_precision(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Case-insensitive equality ignoring surrounding whitespace
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
