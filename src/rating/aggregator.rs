//! Incremental star-rating aggregation
//!
//! Each ratable entity keeps a running count and sum. The mean is derived on
//! read, so folding is O(1) and the result does not depend on the order in
//! which observations arrive.

use crate::error::DiscoveryError;
use crate::types::RatingObservation;
use crate::utils::round_to_precision;
use serde::{Deserialize, Serialize};

/// Lowest star value a user can submit
pub const MIN_RATING_VALUE: i64 = 1;

/// Highest star value a user can submit
pub const MAX_RATING_VALUE: i64 = 5;

/// Summary of every rating observation folded in for one entity.
///
/// Serializes as `{count, sum, mean}`; deserializing needs only `count` and
/// `sum`, and a stored `mean` is ignored in favour of the recomputed one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "RatingSummary")]
pub struct RatingState {
    /// Number of observations folded in
    pub count: u64,
    /// Sum of all observed values
    pub sum: f64,
}

impl RatingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a state from a stored (count, mean) summary
    pub fn from_mean(count: u64, mean: f64) -> Self {
        Self {
            count,
            sum: mean * count as f64,
        }
    }

    /// Arithmetic mean of all observations, 0.0 before the first one
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Mean rounded for display on a listing
    pub fn display_mean(&self, precision: u32) -> f64 {
        round_to_precision(self.mean(), precision)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Wire form of a [`RatingState`] carrying the derived mean
#[derive(Debug, Clone, Copy, Serialize)]
struct RatingSummary {
    count: u64,
    sum: f64,
    mean: f64,
}

impl From<RatingState> for RatingSummary {
    fn from(state: RatingState) -> Self {
        Self {
            count: state.count,
            sum: state.sum,
            mean: state.mean(),
        }
    }
}

/// Folds observations into rating states
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingAggregator;

impl RatingAggregator {
    /// Check that an observation is a whole star value within range
    pub fn validate(observation: &RatingObservation) -> Result<(), DiscoveryError> {
        if !(MIN_RATING_VALUE..=MAX_RATING_VALUE).contains(&observation.value) {
            return Err(DiscoveryError::InvalidObservation {
                entity_id: observation.entity_id.clone(),
                value: observation.value,
            });
        }
        Ok(())
    }

    /// Return the state with one more observation folded in.
    ///
    /// The input state is borrowed, so a rejected observation leaves the
    /// caller's state exactly as it was.
    pub fn fold(
        state: &RatingState,
        observation: &RatingObservation,
    ) -> Result<RatingState, DiscoveryError> {
        Self::validate(observation)?;

        Ok(RatingState {
            count: state.count + 1,
            sum: state.sum + observation.value as f64,
        })
    }

    /// Fold a batch. Either every observation is applied or none is.
    pub fn fold_all<'a, I>(state: &RatingState, observations: I) -> Result<RatingState, DiscoveryError>
    where
        I: IntoIterator<Item = &'a RatingObservation>,
    {
        let observations: Vec<&RatingObservation> = observations.into_iter().collect();
        for observation in &observations {
            Self::validate(observation)?;
        }

        observations
            .into_iter()
            .try_fold(*state, |acc, observation| Self::fold(&acc, observation))
    }
}
