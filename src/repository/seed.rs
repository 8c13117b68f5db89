//! Data set loading and the built-in demo catalog

use crate::error::DiscoveryError;
use crate::types::{Availability, CatalogItem, CatalogKind, Player, SkillLevel};
use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything an in-memory repository is seeded from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSet {
    pub venues: Vec<CatalogItem>,
    pub matches: Vec<CatalogItem>,
    pub tournaments: Vec<CatalogItem>,
    pub players: Vec<Player>,
}

impl DataSet {
    /// Parse a JSON data set, checking each item sits in the right list
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        let data: DataSet =
            serde_json::from_str(json).context("Failed to parse data set JSON")?;
        data.check_kinds()?;
        Ok(data)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file {}", path.display()))?;
        Self::from_json_str(&contents)
    }

    /// Items of every kind, venues first
    pub fn all_items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.venues
            .iter()
            .chain(self.matches.iter())
            .chain(self.tournaments.iter())
    }

    fn check_kinds(&self) -> Result<(), DiscoveryError> {
        let lists = [
            (CatalogKind::Venue, &self.venues),
            (CatalogKind::Match, &self.matches),
            (CatalogKind::Tournament, &self.tournaments),
        ];

        for (kind, items) in lists {
            if let Some(item) = items.iter().find(|item| item.kind != kind) {
                return Err(DiscoveryError::InvalidCatalogItem {
                    item_id: item.id.clone(),
                    reason: format!("{} listed under {}", item.kind, kind),
                });
            }
        }
        Ok(())
    }

    /// Vadodara demo catalog and player pool
    pub fn demo() -> Self {
        Self {
            venues: demo_venues(),
            matches: demo_matches(),
            tournaments: demo_tournaments(),
            players: demo_players(),
        }
    }
}

fn at(date: (i32, u32, u32), hour: u32, minute: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)?.and_hms_opt(hour, minute, 0)
}

#[allow(clippy::too_many_arguments)]
fn venue(
    id: &str,
    name: &str,
    location: &str,
    price: f64,
    rating: f64,
    review_count: u64,
    facilities: &[&str],
    description: &str,
) -> CatalogItem {
    let mut item = CatalogItem::new(id, CatalogKind::Venue, name)
        .with_location(location)
        .with_price(price)
        .with_rating(rating)
        .with_facilities(facilities.iter().copied())
        .with_description(description);
    item.review_count = review_count;
    item
}

fn demo_venues() -> Vec<CatalogItem> {
    vec![
        venue(
            "venue-1",
            "Elite Sports Arena Vadodara",
            "Alkapuri",
            800.0,
            4.8,
            156,
            &["parking", "wifi", "cafe", "changing_rooms", "equipment_rental"],
            "Premium pickleball facility with 6 courts and professional coaching",
        ),
        venue(
            "venue-2",
            "Sayaji Sports Complex",
            "Sayajigunj",
            600.0,
            4.5,
            89,
            &["parking", "changing_rooms", "equipment_rental"],
            "Community sports complex with 4 well-maintained pickleball courts",
        ),
        venue(
            "venue-3",
            "Fatehgunj Recreation Center",
            "Fatehgunj",
            500.0,
            4.2,
            67,
            &["parking", "wifi", "cafe"],
            "Modern recreation center with 3 indoor pickleball courts",
        ),
        venue(
            "venue-4",
            "Manjalpur Sports Hub",
            "Manjalpur",
            700.0,
            4.6,
            124,
            &["parking", "changing_rooms", "equipment_rental", "coaching"],
            "Professional sports hub with 5 courts and certified coaches",
        ),
        venue(
            "venue-5",
            "Gotri Tennis & Pickleball Club",
            "Gotri",
            650.0,
            4.4,
            98,
            &["parking", "wifi", "cafe", "changing_rooms"],
            "Exclusive club with 4 premium courts and member facilities",
        ),
        venue(
            "venue-6",
            "Waghodia Road Sports Arena",
            "Waghodia Road",
            550.0,
            4.1,
            45,
            &["parking", "equipment_rental"],
            "Affordable sports arena with 3 outdoor courts",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn scheduled(
    id: &str,
    kind: CatalogKind,
    name: &str,
    organizer: &str,
    location: &str,
    level: SkillLevel,
    price: f64,
    (current, max): (u32, u32),
    scheduled_at: Option<NaiveDateTime>,
) -> CatalogItem {
    let mut item = CatalogItem::new(id, kind, name)
        .with_organizer(organizer)
        .with_location(location)
        .with_skill_level(level)
        .with_price(price)
        .with_capacity(current, max);
    item.scheduled_at = scheduled_at;
    item
}

fn demo_matches() -> Vec<CatalogItem> {
    vec![
        scheduled(
            "match-1",
            CatalogKind::Match,
            "Weekend Doubles Match",
            "John Smith",
            "Central Sports Complex, Court 1",
            SkillLevel::Intermediate,
            0.0,
            (2, 4),
            at((2025, 2, 15), 10, 0),
        )
        .with_description(
            "Looking for 2 more players for a fun doubles match. All skill levels welcome!",
        ),
        scheduled(
            "match-2",
            CatalogKind::Match,
            "Morning Singles Practice",
            "Sarah Johnson",
            "Community Center Courts",
            SkillLevel::Advanced,
            0.0,
            (1, 2),
            at((2025, 2, 16), 8, 0),
        )
        .with_description("Competitive singles match for advanced players."),
        scheduled(
            "match-3",
            CatalogKind::Match,
            "Beginner Friendly Match",
            "Mike Wilson",
            "Local Recreation Center",
            SkillLevel::Beginner,
            0.0,
            (3, 4),
            at((2025, 2, 17), 18, 0),
        )
        .with_description("Perfect for new players to learn and have fun!"),
        scheduled(
            "match-4",
            CatalogKind::Match,
            "Pro Training Session",
            "Elite Academy",
            "Professional Sports Arena",
            SkillLevel::Advanced,
            0.0,
            (4, 6),
            at((2025, 2, 18), 7, 0),
        )
        .with_description("High-intensity training session for professional players."),
    ]
}

fn demo_tournaments() -> Vec<CatalogItem> {
    vec![
        scheduled(
            "tournament-1",
            CatalogKind::Tournament,
            "Summer Championship 2025",
            "PicklePro Sports Club",
            "Central Sports Complex",
            SkillLevel::Advanced,
            500.0,
            (18, 32),
            at((2025, 2, 15), 9, 0),
        ),
        scheduled(
            "tournament-2",
            CatalogKind::Tournament,
            "Beginner's Cup",
            "Community Center",
            "Local Recreation Center",
            SkillLevel::Beginner,
            200.0,
            (8, 16),
            at((2025, 2, 20), 10, 0),
        ),
        scheduled(
            "tournament-3",
            CatalogKind::Tournament,
            "Pro League Tournament",
            "Elite Pickleball Academy",
            "Professional Sports Arena",
            SkillLevel::Advanced,
            1000.0,
            (20, 24),
            at((2025, 2, 25), 8, 0),
        ),
    ]
}

fn demo_players() -> Vec<Player> {
    let roster = [
        ("player-1", "Sarah Johnson", SkillLevel::Intermediate, 3.2, Availability::Available),
        ("player-2", "Mike Chen", SkillLevel::Advanced, 4.1, Availability::Available),
        ("player-3", "Lisa Rodriguez", SkillLevel::Beginner, 2.8, Availability::Available),
        ("player-4", "Tom Wilson", SkillLevel::Intermediate, 3.5, Availability::Busy),
        ("player-5", "Emily Davis", SkillLevel::Advanced, 4.3, Availability::Available),
        ("player-6", "David Kim", SkillLevel::Beginner, 2.5, Availability::Available),
        ("player-7", "Anna Martinez", SkillLevel::Intermediate, 3.0, Availability::Available),
        ("player-8", "James Brown", SkillLevel::Advanced, 4.5, Availability::Available),
    ];

    roster
        .into_iter()
        .map(|(id, name, level, rating, availability)| {
            Player::new(id, rating, availability)
                .with_name(name)
                .with_skill_level(level)
        })
        .collect()
}
