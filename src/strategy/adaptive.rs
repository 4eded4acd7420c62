//! Performance-weighted mixture over a pool of strategies.
//!
//! Each decision is delegated to a sub-strategy drawn from a categorical
//! distribution. Every [`ADAPTATION_INTERVAL`] decisions the distribution is
//! recomputed from each sub-strategy's running win rate and average score:
//!
//! ```text
//! performance_i = 0.7 * win_rate_i + 0.3 * inverse_score(avg_score_i)
//! w_i           = performance_i / sum_j performance_j
//! ```
//!
//! Scores are penalties (lower is better), so the score term rewards a small
//! average. `inverse_score` floors the average at [`MIN_AVG_SCORE`] so that an
//! untried sub-strategy, or one that has only ever cleared the board, gets a
//! large but finite bonus instead of a division by zero.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::Strategy;
use crate::board::{Board, Move};

/// Decisions between two reweighting steps.
pub const ADAPTATION_INTERVAL: u32 = 100;

pub const WIN_RATE_WEIGHT: f64 = 0.7;
pub const SCORE_WEIGHT: f64 = 0.3;

/// Floor applied to the average score before inverting it.
pub const MIN_AVG_SCORE: f64 = 0.1;

/// Running statistics for one sub-strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerformanceMetrics {
    pub avg_score: f64,
    pub win_rate: f64,
    pub games_played: u32,
}

impl PerformanceMetrics {
    /// Folds one game into the running means.
    pub fn record(&mut self, score: f64, won: bool) {
        let n = f64::from(self.games_played);
        let win = if won { 1.0 } else { 0.0 };
        self.avg_score = (self.avg_score * n + score) / (n + 1.0);
        self.win_rate = (self.win_rate * n + win) / (n + 1.0);
        self.games_played += 1;
    }

    /// `1 / avg_score`, with the average floored at [`MIN_AVG_SCORE`].
    pub fn inverse_score(&self) -> f64 {
        1.0 / self.avg_score.max(MIN_AVG_SCORE)
    }

    pub fn performance(&self) -> f64 {
        WIN_RATE_WEIGHT * self.win_rate + SCORE_WEIGHT * self.inverse_score()
    }
}

/// Strategy that learns which of its sub-strategies to trust.
pub struct AdaptiveStrategy {
    strategies: Vec<Box<dyn Strategy>>,
    weights: Vec<f64>,
    sampler: WeightedIndex<f64>,
    metrics: Vec<PerformanceMetrics>,
    /// Sub-strategies consulted since the last `record_game`.
    used: Vec<bool>,
    calls: u32,
    rng: SmallRng,
}

impl AdaptiveStrategy {
    /// # Panics
    ///
    /// Panics if `strategies` is empty.
    pub fn new(strategies: Vec<Box<dyn Strategy>>, seed: u64) -> Self {
        assert!(!strategies.is_empty(), "adaptive strategy needs at least one member");
        let n = strategies.len();
        let weights = vec![1.0 / n as f64; n];
        let sampler = sampler_for(&weights);
        AdaptiveStrategy {
            strategies,
            weights,
            sampler,
            metrics: vec![PerformanceMetrics::default(); n],
            used: vec![false; n],
            calls: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn metrics(&self) -> &[PerformanceMetrics] {
        &self.metrics
    }

    /// Decisions made so far.
    pub fn calls(&self) -> u32 {
        self.calls
    }

    /// Records one game's outcome for sub-strategy `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn update_metrics(&mut self, index: usize, score: f64, win: bool) {
        self.metrics[index].record(score, win);
    }

    /// Recomputes the sampling weights from the current metrics.
    pub fn reweight(&mut self) {
        let performance: Vec<f64> = self.metrics.iter().map(PerformanceMetrics::performance).collect();
        let total: f64 = performance.iter().sum();
        let n = self.weights.len() as f64;
        if total > 0.0 && total.is_finite() {
            for (w, p) in self.weights.iter_mut().zip(&performance) {
                *w = p / total;
            }
        } else {
            self.weights.iter_mut().for_each(|w| *w = 1.0 / n);
        }
        self.sampler = sampler_for(&self.weights);
    }
}

/// Categorical sampler over `weights`, uniform if they are unusable.
fn sampler_for(weights: &[f64]) -> WeightedIndex<f64> {
    match WeightedIndex::new(weights) {
        Ok(dist) => dist,
        Err(_) => match WeightedIndex::new(vec![1.0; weights.len().max(1)]) {
            Ok(dist) => dist,
            Err(e) => unreachable!("uniform weights rejected: {e}"),
        },
    }
}

impl Strategy for AdaptiveStrategy {
    fn name(&self) -> &str {
        "Adaptive"
    }

    fn choose_move(&mut self, board: Board, roll: u8) -> Move {
        let idx = self.sampler.sample(&mut self.rng);
        self.used[idx] = true;
        let mv = self.strategies[idx].choose_move(board, roll);
        self.calls = self.calls.wrapping_add(1);
        if self.calls % ADAPTATION_INTERVAL == 0 {
            self.reweight();
        }
        mv
    }

    /// Credits the game to every sub-strategy consulted during it.
    fn record_game(&mut self, score: u32, won: bool) {
        for idx in 0..self.used.len() {
            if self.used[idx] {
                self.update_metrics(idx, f64::from(score), won);
                self.strategies[idx].record_game(score, won);
                self.used[idx] = false;
            }
        }
    }
}
