//! Deterministic ordering of catalog listings

use crate::error::DiscoveryError;
use crate::types::CatalogItem;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Primary ordering for a listing. Ties always fall back to `id` ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Highest rated first
    #[default]
    Rating,
    /// Cheapest first
    Price,
    /// Location name ascending. There is no geocoding behind this key.
    #[serde(alias = "location")]
    Distance,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Rating => write!(f, "rating"),
            SortKey::Price => write!(f, "price"),
            SortKey::Distance => write!(f, "distance"),
        }
    }
}

impl FromStr for SortKey {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rating" => Ok(SortKey::Rating),
            "price" => Ok(SortKey::Price),
            "distance" | "location" => Ok(SortKey::Distance),
            other => Err(DiscoveryError::invalid_filter(format!(
                "unknown sort key '{}'",
                other
            ))),
        }
    }
}

/// Multi-key comparator producing a total order over catalog items
#[derive(Debug, Clone, Copy, Default)]
pub struct RankedSorter;

impl RankedSorter {
    /// Compare two items under `key`, breaking ties by `id`
    pub fn compare(a: &CatalogItem, b: &CatalogItem, key: SortKey) -> Ordering {
        let primary = match key {
            SortKey::Rating => b.rating.total_cmp(&a.rating),
            SortKey::Price => a.price.total_cmp(&b.price),
            SortKey::Distance => a
                .location
                .to_lowercase()
                .cmp(&b.location.to_lowercase())
                .then_with(|| a.location.cmp(&b.location)),
        };

        primary.then_with(|| a.id.cmp(&b.id))
    }

    /// Sort a listing; the result does not depend on the input order
    pub fn sort(mut items: Vec<CatalogItem>, key: SortKey) -> Vec<CatalogItem> {
        items.sort_by(|a, b| Self::compare(a, b, key));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CatalogKind;

    fn venue(id: &str, location: &str, price: f64, rating: f64) -> CatalogItem {
        CatalogItem::new(id, CatalogKind::Venue, format!("Venue {}", id))
            .with_location(location)
            .with_price(price)
            .with_rating(rating)
    }

    fn ids(items: &[CatalogItem]) -> Vec<String> {
        items.iter().map(|item| item.id.clone()).collect()
    }

    #[test]
    fn test_rating_descending_with_id_tiebreak() {
        let items = vec![
            venue("c", "Gotri", 650.0, 4.4),
            venue("a", "Alkapuri", 800.0, 4.8),
            venue("b", "Manjalpur", 700.0, 4.4),
        ];
        let sorted = RankedSorter::sort(items, SortKey::Rating);
        assert_eq!(ids(&sorted), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_price_ascending_with_id_tiebreak() {
        let items = vec![
            venue("3", "Fatehgunj", 500.0, 4.2),
            venue("2", "Sayajigunj", 600.0, 4.5),
            venue("1", "Alkapuri", 500.0, 4.8),
        ];
        let sorted = RankedSorter::sort(items, SortKey::Price);
        assert_eq!(ids(&sorted), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_distance_sorts_by_location_name() {
        let items = vec![
            venue("1", "Waghodia Road", 550.0, 4.1),
            venue("2", "alkapuri", 800.0, 4.8),
            venue("3", "Gotri", 650.0, 4.4),
        ];
        let sorted = RankedSorter::sort(items, SortKey::Distance);
        assert_eq!(ids(&sorted), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_sort_is_independent_of_input_order() {
        let items = vec![
            venue("b", "Gotri", 600.0, 4.5),
            venue("a", "Gotri", 600.0, 4.5),
            venue("c", "Alkapuri", 500.0, 4.5),
        ];
        let mut reversed = items.clone();
        reversed.reverse();

        for key in [SortKey::Rating, SortKey::Price, SortKey::Distance] {
            assert_eq!(
                ids(&RankedSorter::sort(items.clone(), key)),
                ids(&RankedSorter::sort(reversed.clone(), key))
            );
        }
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("Rating".parse::<SortKey>().unwrap(), SortKey::Rating);
        assert_eq!("location".parse::<SortKey>().unwrap(), SortKey::Distance);
        assert!("popularity".parse::<SortKey>().is_err());

        let key: SortKey = serde_json::from_str("\"location\"").unwrap();
        assert_eq!(key, SortKey::Distance);
    }

    #[test]
    fn test_empty_input() {
        assert!(RankedSorter::sort(Vec::new(), SortKey::Price).is_empty());
    }
}
