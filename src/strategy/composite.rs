//! Uniform mixture over a fixed set of strategies.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::Strategy;
use crate::board::{Board, Move};

/// Delegates each decision to a sub-strategy chosen uniformly at random.
pub struct CompositeStrategy {
    strategies: Vec<Box<dyn Strategy>>,
    rng: SmallRng,
}

impl CompositeStrategy {
    /// # Panics
    ///
    /// Panics if `strategies` is empty.
    pub fn new(strategies: Vec<Box<dyn Strategy>>, seed: u64) -> Self {
        assert!(!strategies.is_empty(), "composite strategy needs at least one member");
        CompositeStrategy {
            strategies,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Strategy for CompositeStrategy {
    fn name(&self) -> &str {
        "Composite"
    }

    fn choose_move(&mut self, board: Board, roll: u8) -> Move {
        let idx = self.rng.gen_range(0..self.strategies.len());
        self.strategies[idx].choose_move(board, roll)
    }

    fn record_game(&mut self, score: u32, won: bool) {
        for s in &mut self.strategies {
            s.record_game(score, won);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::bit;
    use crate::strategy::{HighestValueStrategy, StrategyKind};

    /// Always plays the lowest present number.
    struct Lowest;

    impl Strategy for Lowest {
        fn name(&self) -> &str {
            "Lowest"
        }

        fn choose_move(&mut self, board: Board, roll: u8) -> Move {
            board.values_up_to(roll).next().map_or(Move::NONE, Move::single)
        }
    }

    #[test]
    fn single_member_is_transparent() {
        let mut c = CompositeStrategy::new(vec![Box::new(HighestValueStrategy)], 1);
        assert_eq!(c.choose_move(Board::FULL, 9), Move::single(9));
    }

    #[test]
    fn mixes_members() {
        let mut c = CompositeStrategy::new(vec![Box::new(HighestValueStrategy), Box::new(Lowest)], 2);
        let board = Board::new(bit(1) | bit(8));
        let mut highs = 0;
        let mut lows = 0;
        for _ in 0..400 {
            match c.choose_move(board, 10) {
                m if m == Move::single(8) => highs += 1,
                m if m == Move::single(1) => lows += 1,
                other => panic!("unexpected move {other:?}"),
            }
        }
        assert!(highs > 120 && lows > 120, "highs {highs} lows {lows}");
    }

    #[test]
    fn factory_composite_has_four_members() {
        let mut rng = SmallRng::seed_from_u64(0);
        let c = CompositeStrategy::new(crate::strategy::basic_pool(&mut rng), 0);
        assert_eq!(c.len(), StrategyKind::BASIC.len());
    }

    #[test]
    #[should_panic(expected = "at least one member")]
    fn empty_composite_panics() {
        let _ = CompositeStrategy::new(Vec::new(), 0);
    }
}
