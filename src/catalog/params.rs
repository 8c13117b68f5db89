//! Flat, string-friendly listing parameters
//!
//! Shared by the HTTP query string and the command line so both surfaces
//! accept the same names and produce the same [`FilterSpec`].

use crate::catalog::filter::{FeeBand, FilterSpec};
use crate::catalog::sort::SortKey;
use crate::error::DiscoveryError;
use crate::types::SkillLevel;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, Deserialize, clap::Args)]
pub struct FilterParams {
    /// Exact location, case-insensitive
    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub price_min: Option<f64>,

    #[arg(long)]
    pub price_max: Option<f64>,

    #[arg(long)]
    pub rating_min: Option<f64>,

    /// beginner, intermediate, advanced or open
    #[arg(long)]
    pub skill_level: Option<String>,

    /// Comma-separated facilities that must all be offered
    #[arg(long)]
    pub facilities: Option<String>,

    /// Scheduled day (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Free-text search over name, description and organizer
    #[arg(long)]
    pub search: Option<String>,

    /// free, low, medium or high
    #[arg(long)]
    pub fee_band: Option<String>,

    /// Hide items with no open spots
    #[arg(long)]
    pub open_only: Option<bool>,

    /// rating, price or distance
    #[arg(long)]
    pub sort: Option<String>,
}

impl FilterParams {
    /// Parse into a filter spec and an optional sort key
    pub fn into_request(self) -> Result<(FilterSpec, Option<SortKey>), DiscoveryError> {
        let skill_level_equals = self
            .skill_level
            .as_deref()
            .map(str::parse::<SkillLevel>)
            .transpose()?;

        let fee_band = self
            .fee_band
            .as_deref()
            .map(str::parse::<FeeBand>)
            .transpose()?;

        let sort = self.sort.as_deref().map(str::parse::<SortKey>).transpose()?;

        let required_facilities = self.facilities.map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|facility| !facility.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
        });

        let spec = FilterSpec {
            location_equals: self.location,
            price_min: self.price_min,
            price_max: self.price_max,
            rating_min: self.rating_min,
            skill_level_equals,
            required_facilities,
            date_equals: self.date,
            search_term: self.search,
            fee_band,
            open_only: self.open_only,
        };

        Ok((spec, sort))
    }
}
