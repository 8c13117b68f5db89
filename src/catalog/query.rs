//! Filter-then-sort pipeline shared by every discovery listing

use crate::catalog::filter::{CriteriaFilter, FeeBandThresholds, FilterSpec};
use crate::catalog::sort::{RankedSorter, SortKey};
use crate::error::DiscoveryError;
use crate::types::CatalogItem;

/// Venues, open matches and tournaments all go through this one query
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogQuery {
    filter: CriteriaFilter,
}

impl CatalogQuery {
    pub fn new(fee_bands: FeeBandThresholds) -> Self {
        Self {
            filter: CriteriaFilter::new(fee_bands),
        }
    }

    /// `sort(filter(items, spec), key)`, after rejecting malformed specs.
    ///
    /// The input slice is never modified and nothing is cached, so repeated
    /// calls with the same arguments return the same sequence.
    pub fn query(
        &self,
        items: &[CatalogItem],
        spec: &FilterSpec,
        key: SortKey,
    ) -> Result<Vec<CatalogItem>, DiscoveryError> {
        spec.validate()?;
        let filtered = self.filter.filter(items, spec);
        Ok(RankedSorter::sort(filtered, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::filter::FeeBand;
    use crate::types::CatalogKind;

    fn venue(id: &str, price: f64, rating: f64) -> CatalogItem {
        CatalogItem::new(id, CatalogKind::Venue, format!("Venue {}", id))
            .with_location("Vadodara")
            .with_price(price)
            .with_rating(rating)
    }

    #[test]
    fn test_rating_threshold_then_price_order() {
        let catalog = vec![
            venue("elite", 800.0, 4.8),
            venue("sayaji", 600.0, 4.5),
            venue("fatehgunj", 500.0, 4.2),
        ];

        let result = CatalogQuery::default()
            .query(&catalog, &FilterSpec::new().with_rating_min(4.3), SortKey::Price)
            .unwrap();

        let ids: Vec<&str> = result.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["sayaji", "elite"]);
        assert_eq!(result[0].price, 600.0);
        assert_eq!(result[1].rating, 4.8);
    }

    #[test]
    fn test_query_is_idempotent_and_leaves_input_alone() {
        let catalog = vec![
            venue("a", 500.0, 4.0),
            venue("b", 300.0, 4.9),
            venue("c", 300.0, 3.1),
        ];
        let snapshot = catalog.clone();
        let query = CatalogQuery::default();
        let spec = FilterSpec::new().with_price_max(500.0);

        let first = query.query(&catalog, &spec, SortKey::Price).unwrap();
        let second = query.query(&catalog, &spec, SortKey::Price).unwrap();

        assert_eq!(first, second);
        assert_eq!(catalog, snapshot);
    }

    #[test]
    fn test_invalid_spec_is_an_error() {
        let catalog = vec![venue("a", 500.0, 4.0)];
        let spec = FilterSpec::new().with_price_min(600.0).with_price_max(100.0);
        let result = CatalogQuery::default().query(&catalog, &spec, SortKey::Rating);
        assert!(matches!(
            result,
            Err(DiscoveryError::InvalidFilterSpec { .. })
        ));
    }

    #[test]
    fn test_empty_catalog_is_not_an_error() {
        let result = CatalogQuery::default()
            .query(&[], &FilterSpec::new().with_fee_band(FeeBand::Free), SortKey::Rating)
            .unwrap();
        assert!(result.is_empty());
    }
}
