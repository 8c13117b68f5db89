//! Common types used throughout the discovery and matchmaking engine

use crate::error::DiscoveryError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for venues, open matches and tournaments
pub type ItemId = String;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for a generated pairing proposal
pub type ProposalId = Uuid;

/// Kind of discoverable catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Venue,
    Match,
    Tournament,
}

impl CatalogKind {
    /// All catalog kinds, in display order
    pub fn all() -> [CatalogKind; 3] {
        [CatalogKind::Venue, CatalogKind::Match, CatalogKind::Tournament]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Venue => "venue",
            CatalogKind::Match => "match",
            CatalogKind::Tournament => "tournament",
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "venue" | "venues" => Ok(CatalogKind::Venue),
            "match" | "matches" => Ok(CatalogKind::Match),
            "tournament" | "tournaments" => Ok(CatalogKind::Tournament),
            other => Err(DiscoveryError::UnknownCatalogKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// Skill bracket advertised by a catalog item or declared by a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    /// Mixed or open to all levels
    Open,
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkillLevel::Beginner => write!(f, "Beginner"),
            SkillLevel::Intermediate => write!(f, "Intermediate"),
            SkillLevel::Advanced => write!(f, "Advanced"),
            SkillLevel::Open => write!(f, "Open"),
        }
    }
}

impl FromStr for SkillLevel {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(SkillLevel::Beginner),
            "intermediate" => Ok(SkillLevel::Intermediate),
            "advanced" | "professional" | "pro" => Ok(SkillLevel::Advanced),
            "open" | "mixed" | "all levels" | "all_levels" | "all" => Ok(SkillLevel::Open),
            other => Err(DiscoveryError::invalid_filter(format!(
                "unknown skill level '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for SkillLevel {
    type Error = DiscoveryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Whether a player can currently be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Busy,
}

/// Occupancy of a venue, match or tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub current_count: u32,
    pub max_count: u32,
}

impl Capacity {
    /// Create a capacity, rejecting `current_count > max_count`
    pub fn new(current_count: u32, max_count: u32) -> Result<Self, DiscoveryError> {
        if current_count > max_count {
            return Err(DiscoveryError::InvalidCatalogItem {
                item_id: String::new(),
                reason: format!(
                    "current count {} exceeds max count {}",
                    current_count, max_count
                ),
            });
        }
        Ok(Self {
            current_count,
            max_count,
        })
    }

    pub fn is_full(&self) -> bool {
        self.current_count >= self.max_count
    }

    pub fn open_spots(&self) -> u32 {
        self.max_count.saturating_sub(self.current_count)
    }
}

/// Unbounded unless the record says otherwise
impl Default for Capacity {
    fn default() -> Self {
        Self {
            current_count: 0,
            max_count: u32::MAX,
        }
    }
}

/// A discoverable venue, open match or tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub kind: CatalogKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub organizer: Option<String>,
    pub location: String,
    /// Venue starting price, match price or tournament entry fee
    pub price: f64,
    pub skill_level: SkillLevel,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u64,
    #[serde(default)]
    pub capacity: Capacity,
    #[serde(default)]
    pub facilities: BTreeSet<String>,
    #[serde(default)]
    pub scheduled_at: Option<NaiveDateTime>,
}

impl CatalogItem {
    /// Create an item with neutral defaults; refine with the `with_*` methods
    pub fn new(id: impl Into<String>, kind: CatalogKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            description: String::new(),
            organizer: None,
            location: String::new(),
            price: 0.0,
            skill_level: SkillLevel::Open,
            rating: 0.0,
            review_count: 0,
            capacity: Capacity::default(),
            facilities: BTreeSet::new(),
            scheduled_at: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_skill_level(mut self, skill_level: SkillLevel) -> Self {
        self.skill_level = skill_level;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_organizer(mut self, organizer: impl Into<String>) -> Self {
        self.organizer = Some(organizer.into());
        self
    }

    pub fn with_capacity(mut self, current_count: u32, max_count: u32) -> Self {
        self.capacity = Capacity {
            current_count,
            max_count,
        };
        self
    }

    pub fn with_facilities<I, S>(mut self, facilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facilities = facilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_schedule(mut self, scheduled_at: NaiveDateTime) -> Self {
        self.scheduled_at = Some(scheduled_at);
        self
    }

    /// Check the record invariants supplied by the repository
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        let invalid = |reason: String| DiscoveryError::InvalidCatalogItem {
            item_id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id cannot be empty".to_string()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(invalid(format!("price {} must be non-negative", self.price)));
        }
        if !self.rating.is_finite() || !(0.0..=5.0).contains(&self.rating) {
            return Err(invalid(format!("rating {} must be within 0..=5", self.rating)));
        }
        if self.capacity.current_count > self.capacity.max_count {
            return Err(invalid(format!(
                "current count {} exceeds max count {}",
                self.capacity.current_count, self.capacity.max_count
            )));
        }
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.capacity.is_full()
    }

    pub fn open_spots(&self) -> u32 {
        self.capacity.open_spots()
    }

    /// Full items stay visible but cannot be joined
    pub fn ensure_joinable(&self) -> Result<(), DiscoveryError> {
        if self.is_full() {
            return Err(DiscoveryError::ItemFull {
                item_id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Date part of the schedule, if any
    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        self.scheduled_at.map(|at| at.date())
    }

    /// Lowercased text searched by free-text queries
    pub fn search_text(&self) -> String {
        let organizer_len = self.organizer.as_ref().map_or(0, |o| o.len());
        let mut text =
            String::with_capacity(self.name.len() + self.description.len() + organizer_len + 2);
        text.push_str(&self.name);
        text.push('\n');
        text.push_str(&self.description);
        if let Some(organizer) = &self.organizer {
            text.push('\n');
            text.push_str(organizer);
        }
        text.to_lowercase()
    }
}

/// Player information for matchmaking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub name: Option<String>,
    pub skill_rating: f64,
    #[serde(default)]
    pub skill_level: Option<SkillLevel>,
    pub availability: Availability,
}

impl Player {
    pub fn new(id: impl Into<String>, skill_rating: f64, availability: Availability) -> Self {
        Self {
            id: id.into(),
            name: None,
            skill_rating,
            skill_level: None,
            availability,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_skill_level(mut self, skill_level: SkillLevel) -> Self {
        self.skill_level = Some(skill_level);
        self
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }
}

/// Two distinct players proposed to play each other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub first: PlayerId,
    pub second: PlayerId,
    pub first_rating: f64,
    pub second_rating: f64,
}

impl Pair {
    pub fn new(first: &Player, second: &Player) -> Self {
        Self {
            first: first.id.clone(),
            second: second.id.clone(),
            first_rating: first.skill_rating,
            second_rating: second.skill_rating,
        }
    }

    /// Absolute skill difference between the two players
    pub fn skill_gap(&self) -> f64 {
        crate::utils::rating_difference(self.first_rating, self.second_rating)
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.first == player_id || self.second == player_id
    }
}

/// A single star rating submitted by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingObservation {
    pub entity_id: ItemId,
    pub value: i64,
}

impl RatingObservation {
    pub fn new(entity_id: impl Into<String>, value: i64) -> Self {
        Self {
            entity_id: entity_id.into(),
            value,
        }
    }
}

/// Response returned after a rating has been folded and persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub entity_id: ItemId,
    pub count: u64,
    pub sum: f64,
    pub mean: f64,
    /// Mean rounded for display, as written back onto the catalog item
    pub display_rating: f64,
}

/// Pairings generated for the current available pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingProposal {
    pub proposal_id: ProposalId,
    pub skill_level: Option<SkillLevel>,
    pub pairs: Vec<Pair>,
    pub unpaired: Vec<Player>,
    pub max_skill_gap: f64,
    pub total_skill_gap: f64,
    pub generated_at: DateTime<Utc>,
}
