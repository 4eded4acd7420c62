//! Two-dice roll models.
//!
//! Both models reproduce the triangular distribution of the sum of two
//! independent d6: probabilities 1,2,3,4,5,6,5,4,3,2,1 (out of 36) for the
//! sums 2..=12.

use std::fmt;
use std::str::FromStr;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Relative frequency of each roll from 2 to 12.
pub const ROLL_WEIGHTS: [u32; 11] = [1, 2, 3, 4, 5, 6, 5, 4, 3, 2, 1];

/// Exact probability of rolling `sum` with two dice.
pub fn roll_probability(sum: u8) -> f64 {
    match sum {
        2..=12 => f64::from(ROLL_WEIGHTS[usize::from(sum - 2)]) / 36.0,
        _ => 0.0,
    }
}

/// How a roll is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiceModel {
    /// Two independent `1..=6` draws, summed.
    #[default]
    TwoDice,
    /// One draw from the 11-outcome weighted distribution.
    Weighted,
}

impl DiceModel {
    pub const fn name(self) -> &'static str {
        match self {
            DiceModel::TwoDice => "two_dice",
            DiceModel::Weighted => "weighted",
        }
    }

    /// Builds a reusable sampler for this model.
    pub fn sampler(self) -> Dice {
        match self {
            DiceModel::TwoDice => Dice::TwoDice,
            DiceModel::Weighted => Dice::Weighted(weighted_sums()),
        }
    }
}

impl fmt::Display for DiceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiceModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two_dice" => Ok(DiceModel::TwoDice),
            "weighted" => Ok(DiceModel::Weighted),
            other => Err(ConfigError::InvalidDiceModel(other.to_string())),
        }
    }
}

fn weighted_sums() -> WeightedIndex<u32> {
    // The weights are positive constants, so construction cannot fail.
    match WeightedIndex::new(ROLL_WEIGHTS) {
        Ok(dist) => dist,
        Err(e) => unreachable!("static roll weights rejected: {e}"),
    }
}

/// A ready-to-use roll sampler.
#[derive(Debug, Clone)]
pub enum Dice {
    TwoDice,
    Weighted(WeightedIndex<u32>),
}

impl Dice {
    /// Rolls two dice and returns their sum in 2..=12.
    #[inline]
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> u8 {
        match self {
            Dice::TwoDice => rng.gen_range(1..=6u8) + rng.gen_range(1..=6u8),
            Dice::Weighted(dist) => dist.sample(rng) as u8 + 2,
        }
    }
}
