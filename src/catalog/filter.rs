//! Criteria filtering for catalog items
//!
//! A [`FilterSpec`] is compiled into a pipeline of predicates, one per
//! constrained field. An item passes when every predicate holds; fields left
//! as `None` add nothing to the pipeline.

use crate::error::DiscoveryError;
use crate::types::{CatalogItem, SkillLevel};
use crate::utils::eq_ignore_case;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::debug;

/// Entry fee bracket used by the tournament listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeBand {
    Free,
    Low,
    Medium,
    High,
}

impl FromStr for FeeBand {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(FeeBand::Free),
            "low" => Ok(FeeBand::Low),
            "medium" => Ok(FeeBand::Medium),
            "high" => Ok(FeeBand::High),
            other => Err(DiscoveryError::invalid_filter(format!(
                "unknown fee band '{}'",
                other
            ))),
        }
    }
}

/// Upper bounds of the low and medium fee bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeBandThresholds {
    pub low_max: f64,
    pub medium_max: f64,
}

impl Default for FeeBandThresholds {
    fn default() -> Self {
        Self {
            low_max: 300.0,
            medium_max: 700.0,
        }
    }
}

impl FeeBandThresholds {
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if !self.low_max.is_finite() || !self.medium_max.is_finite() {
            return Err(DiscoveryError::ConfigurationError {
                message: "fee band thresholds must be finite".to_string(),
            });
        }
        if self.low_max <= 0.0 || self.medium_max <= self.low_max {
            return Err(DiscoveryError::ConfigurationError {
                message: format!(
                    "fee band thresholds must satisfy 0 < low_max ({}) < medium_max ({})",
                    self.low_max, self.medium_max
                ),
            });
        }
        Ok(())
    }

    /// Band a price falls into. Upper bounds are inclusive.
    pub fn classify(&self, price: f64) -> FeeBand {
        if price <= 0.0 {
            FeeBand::Free
        } else if price <= self.low_max {
            FeeBand::Low
        } else if price <= self.medium_max {
            FeeBand::Medium
        } else {
            FeeBand::High
        }
    }
}

/// Constraints applied to a catalog listing
///
/// Every field is optional and `None` means "no constraint". `Some(0.0)` is a
/// real bound, not a sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub location_equals: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub rating_min: Option<f64>,
    pub skill_level_equals: Option<SkillLevel>,
    /// The item must offer all of these
    pub required_facilities: Option<BTreeSet<String>>,
    pub date_equals: Option<NaiveDate>,
    /// Case-insensitive substring over name, description and organizer
    pub search_term: Option<String>,
    pub fee_band: Option<FeeBand>,
    /// Hide items with no open spots
    pub open_only: Option<bool>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location_equals = Some(location.into());
        self
    }

    pub fn with_price_min(mut self, min: f64) -> Self {
        self.price_min = Some(min);
        self
    }

    pub fn with_price_max(mut self, max: f64) -> Self {
        self.price_max = Some(max);
        self
    }

    pub fn with_rating_min(mut self, min: f64) -> Self {
        self.rating_min = Some(min);
        self
    }

    pub fn with_skill_level(mut self, level: SkillLevel) -> Self {
        self.skill_level_equals = Some(level);
        self
    }

    pub fn with_facility(mut self, facility: impl Into<String>) -> Self {
        self.required_facilities
            .get_or_insert_with(BTreeSet::new)
            .insert(facility.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date_equals = Some(date);
        self
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn with_fee_band(mut self, band: FeeBand) -> Self {
        self.fee_band = Some(band);
        self
    }

    pub fn only_open(mut self) -> Self {
        self.open_only = Some(true);
        self
    }

    /// Reject bounds that no well-formed request would carry
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        for (name, bound) in [("price_min", self.price_min), ("price_max", self.price_max)] {
            if let Some(value) = bound {
                if !value.is_finite() || value < 0.0 {
                    return Err(DiscoveryError::invalid_filter(format!(
                        "{} must be a non-negative number, got {}",
                        name, value
                    )));
                }
            }
        }

        if let (Some(min), Some(max)) = (self.price_min, self.price_max) {
            if min > max {
                return Err(DiscoveryError::invalid_filter(format!(
                    "price_min ({}) is greater than price_max ({})",
                    min, max
                )));
            }
        }

        if let Some(rating) = self.rating_min {
            if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
                return Err(DiscoveryError::invalid_filter(format!(
                    "rating_min must be within 0..=5, got {}",
                    rating
                )));
            }
        }

        Ok(())
    }

    /// True when no field constrains the listing
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }
}

type Predicate = Box<dyn Fn(&CatalogItem) -> bool + Send + Sync>;

/// Compiles filter specs into predicate pipelines and applies them
#[derive(Debug, Clone, Copy, Default)]
pub struct CriteriaFilter {
    fee_bands: FeeBandThresholds,
}

impl CriteriaFilter {
    pub fn new(fee_bands: FeeBandThresholds) -> Self {
        Self { fee_bands }
    }

    pub fn fee_bands(&self) -> FeeBandThresholds {
        self.fee_bands
    }

    /// Keep the items that satisfy every constraint, in input order
    pub fn filter(&self, items: &[CatalogItem], spec: &FilterSpec) -> Vec<CatalogItem> {
        let predicates = self.build_predicates(spec);

        let kept: Vec<CatalogItem> = items
            .iter()
            .filter(|item| predicates.iter().all(|predicate| predicate(item)))
            .cloned()
            .collect();

        debug!(
            "Filtered catalog with {} constraints: {} of {} items kept",
            predicates.len(),
            kept.len(),
            items.len()
        );

        kept
    }

    /// Check a single item against a spec
    pub fn matches(&self, item: &CatalogItem, spec: &FilterSpec) -> bool {
        self.build_predicates(spec)
            .iter()
            .all(|predicate| predicate(item))
    }

    fn build_predicates(&self, spec: &FilterSpec) -> Vec<Predicate> {
        let mut predicates: Vec<Predicate> = Vec::new();

        if let Some(location) = &spec.location_equals {
            let location = location.clone();
            predicates.push(Box::new(move |item| eq_ignore_case(&item.location, &location)));
        }

        if let Some(min) = spec.price_min {
            predicates.push(Box::new(move |item| item.price >= min));
        }

        if let Some(max) = spec.price_max {
            predicates.push(Box::new(move |item| item.price <= max));
        }

        if let Some(min) = spec.rating_min {
            predicates.push(Box::new(move |item| item.rating >= min));
        }

        if let Some(level) = spec.skill_level_equals {
            predicates.push(Box::new(move |item| item.skill_level == level));
        }

        if let Some(required) = &spec.required_facilities {
            let required: BTreeSet<String> = required
                .iter()
                .map(|facility| facility.trim().to_lowercase())
                .collect();
            if !required.is_empty() {
                predicates.push(Box::new(move |item| {
                    let offered: BTreeSet<String> = item
                        .facilities
                        .iter()
                        .map(|facility| facility.trim().to_lowercase())
                        .collect();
                    required.is_subset(&offered)
                }));
            }
        }

        if let Some(date) = spec.date_equals {
            predicates.push(Box::new(move |item| item.scheduled_date() == Some(date)));
        }

        if let Some(term) = &spec.search_term {
            let term = term.trim().to_lowercase();
            if !term.is_empty() {
                predicates.push(Box::new(move |item| item.search_text().contains(&term)));
            }
        }

        if let Some(band) = spec.fee_band {
            let thresholds = self.fee_bands;
            predicates.push(Box::new(move |item| thresholds.classify(item.price) == band));
        }

        if spec.open_only == Some(true) {
            predicates.push(Box::new(|item| !item.is_full()));
        }

        predicates
    }
}

/// Filter with the default fee band thresholds
pub fn filter(items: &[CatalogItem], spec: &FilterSpec) -> Vec<CatalogItem> {
    CriteriaFilter::default().filter(items, spec)
}
