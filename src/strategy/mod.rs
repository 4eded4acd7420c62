//! Decision policies.
//!
//! A strategy picks which numbers to flip for a given board and roll. The
//! built-in policies are selected by name through [`StrategyKind`]; any other
//! policy (for example a trained model) plugs in by implementing
//! [`Strategy`] directly.

pub mod adaptive;
pub mod composite;
pub mod simple;

use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Move};
use crate::error::ConfigError;

pub use adaptive::{AdaptiveStrategy, PerformanceMetrics, ADAPTATION_INTERVAL};
pub use composite::CompositeStrategy;
pub use simple::{
    BalancedStrategy, HighestProbabilityStrategy, HighestValueStrategy, RandomStrategy,
    PROBABILITY_ORDER,
};

/// A move-selection policy.
///
/// `choose_move` returns [`Move::NONE`] when no legal move exists; the game
/// treats that as the end of the turn, never as an error. Returned moves are
/// trusted to be legal for `board`.
pub trait Strategy: Send {
    /// Display name.
    fn name(&self) -> &str;

    /// Picks the numbers to flip for `roll`.
    fn choose_move(&mut self, board: Board, roll: u8) -> Move;

    /// Called once per finished game with this player's score and outcome.
    fn record_game(&mut self, _score: u32, _won: bool) {}
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn choose_move(&mut self, board: Board, roll: u8) -> Move {
        (**self).choose_move(board, roll)
    }

    fn record_game(&mut self, score: u32, won: bool) {
        (**self).record_game(score, won)
    }
}

/// The built-in strategies, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyKind {
    Random,
    HighestValue,
    HighestProbability,
    Balanced,
    Composite,
    Adaptive,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Random,
        StrategyKind::HighestValue,
        StrategyKind::HighestProbability,
        StrategyKind::Balanced,
        StrategyKind::Composite,
        StrategyKind::Adaptive,
    ];

    /// The single-policy strategies that Composite and Adaptive draw from.
    pub const BASIC: [StrategyKind; 4] = [
        StrategyKind::Random,
        StrategyKind::HighestValue,
        StrategyKind::HighestProbability,
        StrategyKind::Balanced,
    ];

    /// The literal name accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            StrategyKind::Random => "Random",
            StrategyKind::HighestValue => "HighestValue",
            StrategyKind::HighestProbability => "HighestProbability",
            StrategyKind::Balanced => "Balanced",
            StrategyKind::Composite => "Composite",
            StrategyKind::Adaptive => "Adaptive",
        }
    }

    /// Builds a fresh instance. Randomized strategies derive their own
    /// streams from `seed`.
    pub fn build(self, seed: u64) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Random => Box::new(RandomStrategy::new(seed)),
            StrategyKind::HighestValue => Box::new(HighestValueStrategy),
            StrategyKind::HighestProbability => Box::new(HighestProbabilityStrategy),
            StrategyKind::Balanced => Box::new(BalancedStrategy),
            StrategyKind::Composite => {
                let mut rng = SmallRng::seed_from_u64(seed);
                let subs = basic_pool(&mut rng);
                Box::new(CompositeStrategy::new(subs, rng.gen()))
            }
            StrategyKind::Adaptive => {
                let mut rng = SmallRng::seed_from_u64(seed);
                let subs = basic_pool(&mut rng);
                Box::new(AdaptiveStrategy::new(subs, rng.gen()))
            }
        }
    }
}

/// One instance of each basic strategy, each with its own seed.
fn basic_pool(rng: &mut SmallRng) -> Vec<Box<dyn Strategy>> {
    StrategyKind::BASIC
        .iter()
        .map(|kind| kind.build(rng.gen()))
        .collect()
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
    }
}

/// Builds a strategy from its literal name.
pub fn create_strategy(name: &str, seed: u64) -> Result<Box<dyn Strategy>, ConfigError> {
    Ok(name.parse::<StrategyKind>()?.build(seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MAX_ROLL, MIN_ROLL};

    /// Boards that exercise empty, full, sparse, and high/low-only layouts.
    pub(crate) fn sample_boards() -> Vec<Board> {
        let mut boards = vec![Board::FULL, Board::EMPTY];
        let mut mask: u16 = 0x5A3;
        for _ in 0..40 {
            boards.push(Board::new(mask));
            mask = mask.wrapping_mul(0x9E37).wrapping_add(0x79B9) & 0xFFF;
        }
        boards.push(Board::new(0xF00));
        boards.push(Board::new(0x00F));
        boards
    }

    #[test]
    fn names_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "Greedy".parse::<StrategyKind>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStrategy(ref s) if s == "Greedy"));
        assert!(create_strategy("random", 1).is_err());
    }

    #[test]
    fn factory_builds_named_instances() {
        for kind in StrategyKind::ALL {
            let s = create_strategy(kind.name(), 3).unwrap();
            assert!(!s.name().is_empty());
        }
    }

    #[test]
    fn every_builtin_move_is_legal() {
        for kind in StrategyKind::ALL {
            let mut s = kind.build(11);
            for board in sample_boards() {
                for roll in MIN_ROLL..=MAX_ROLL {
                    let mv = s.choose_move(board, roll);
                    if mv.is_none() {
                        continue;
                    }
                    assert!(board.contains(mv), "{kind}: {mv:?} not within {board:?}");
                    assert_eq!(mv.mask().count_ones(), 1, "{kind}: multi-bit move");
                    assert!(mv.value() <= u32::from(roll), "{kind}: move above roll");
                }
            }
        }
    }

    #[test]
    fn every_builtin_passes_only_without_options() {
        for kind in StrategyKind::ALL {
            let mut s = kind.build(5);
            for board in sample_boards() {
                for roll in MIN_ROLL..=MAX_ROLL {
                    let has_option = board.values_up_to(roll).next().is_some();
                    let mv = s.choose_move(board, roll);
                    assert_eq!(!mv.is_none(), has_option, "{kind} on {board:?} roll {roll}");
                }
            }
        }
    }
}
