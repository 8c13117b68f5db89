//! Skill-aware pairing of available players
//!
//! The pool is sorted by skill rating and paired off in consecutive twos, so
//! each player faces the nearest-rated opponent left after the players below
//! them have been paired.

use crate::types::{Pair, Player, SkillLevel};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Result of one pairing run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairingOutcome {
    pub pairs: Vec<Pair>,
    /// Available players left over, at most one
    pub unpaired: Vec<Player>,
}

impl PairingOutcome {
    /// Largest skill gap of any proposed pair, 0.0 with no pairs
    pub fn max_skill_gap(&self) -> f64 {
        self.pairs
            .iter()
            .map(Pair::skill_gap)
            .fold(0.0, f64::max)
    }

    pub fn total_skill_gap(&self) -> f64 {
        self.pairs.iter().map(Pair::skill_gap).sum()
    }

    /// Number of players that received an opponent
    pub fn paired_count(&self) -> usize {
        self.pairs.len() * 2
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.unpaired.is_empty()
    }
}

/// Greedy sort-then-pair engine
#[derive(Debug, Clone, Copy, Default)]
pub struct PairingEngine;

impl PairingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Pair every available player in the pool
    pub fn pair(&self, players: &[Player]) -> PairingOutcome {
        self.pair_within(players, None)
    }

    /// Pair available players, optionally restricted to one declared skill level
    pub fn pair_within(&self, players: &[Player], bracket: Option<SkillLevel>) -> PairingOutcome {
        let mut pool = Self::eligible_pool(players, bracket);
        pool.sort_by(|a, b| Self::compare(a, b));

        let chunks = pool.chunks_exact(2);
        let unpaired = chunks.remainder().to_vec();
        let pairs: Vec<Pair> = chunks.map(|pair| Pair::new(&pair[0], &pair[1])).collect();

        debug!(
            "Paired {} players into {} pairs ({} unpaired, bracket: {:?})",
            pool.len(),
            pairs.len(),
            unpaired.len(),
            bracket
        );

        PairingOutcome { pairs, unpaired }
    }

    /// Ascending skill rating, ties broken by player id
    pub fn compare(a: &Player, b: &Player) -> Ordering {
        a.skill_rating
            .total_cmp(&b.skill_rating)
            .then_with(|| a.id.cmp(&b.id))
    }

    fn eligible_pool(players: &[Player], bracket: Option<SkillLevel>) -> Vec<Player> {
        let mut seen = HashSet::new();
        let mut pool = Vec::with_capacity(players.len());

        for player in players {
            if !player.is_available() {
                continue;
            }
            if let Some(level) = bracket {
                if player.skill_level != Some(level) {
                    continue;
                }
            }
            if !seen.insert(player.id.as_str()) {
                warn!("Duplicate player {} in pairing pool, keeping first entry", player.id);
                continue;
            }
            pool.push(player.clone());
        }

        pool
    }
}
