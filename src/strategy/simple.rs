//! Single-policy strategies.
//!
//! Each picks one present number no greater than the roll, or passes when
//! there is none.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::Strategy;
use crate::board::{Board, Move};

/// Dice sums from most to least likely.
pub const PROBABILITY_ORDER: [u8; 11] = [7, 6, 8, 5, 9, 4, 10, 3, 11, 2, 12];

/// Uniform choice among the present numbers up to the roll.
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    rng: SmallRng,
}

impl RandomStrategy {
    pub fn new(seed: u64) -> Self {
        RandomStrategy {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomStrategy {
    fn name(&self) -> &str {
        "Random"
    }

    fn choose_move(&mut self, board: Board, roll: u8) -> Move {
        let mut options = [0u8; 12];
        let mut len = 0;
        for n in board.values_up_to(roll) {
            options[len] = n;
            len += 1;
        }
        if len == 0 {
            return Move::NONE;
        }
        Move::single(options[self.rng.gen_range(0..len)])
    }
}

/// Greedy: the highest present number up to the roll.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestValueStrategy;

impl Strategy for HighestValueStrategy {
    fn name(&self) -> &str {
        "HighestValue"
    }

    fn choose_move(&mut self, board: Board, roll: u8) -> Move {
        (1..=roll.min(12))
            .rev()
            .find(|&n| board.is_set(n))
            .map_or(Move::NONE, Move::single)
    }
}

/// The first present number up to the roll in [`PROBABILITY_ORDER`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestProbabilityStrategy;

impl Strategy for HighestProbabilityStrategy {
    fn name(&self) -> &str {
        "HighestProbability"
    }

    fn choose_move(&mut self, board: Board, roll: u8) -> Move {
        PROBABILITY_ORDER
            .iter()
            .copied()
            .find(|&n| n <= roll && board.is_set(n))
            .map_or(Move::NONE, Move::single)
    }
}

/// Value weighted by closeness to 7: `i * (7 - |7 - i|)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedStrategy;

impl BalancedStrategy {
    #[inline]
    pub fn score(n: u8) -> i32 {
        let i = i32::from(n);
        i * (7 - (7 - i).abs())
    }
}

impl Strategy for BalancedStrategy {
    fn name(&self) -> &str {
        "Balanced"
    }

    fn choose_move(&mut self, board: Board, roll: u8) -> Move {
        // Strict `>` keeps the first-seen number on ties.
        let mut best: Option<(u8, i32)> = None;
        for n in board.values_up_to(roll) {
            let score = Self::score(n);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((n, score));
            }
        }
        best.map_or(Move::NONE, |(n, _)| Move::single(n))
    }
}
