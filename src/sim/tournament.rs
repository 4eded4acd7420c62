//! Round-robin tournament: every pairing of strategies, both rule modes.

use std::collections::BTreeMap;
use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};

use super::config::SimulationConfig;
use super::harness::run_single;
use super::summary::{matchup_label, ResultSummary};
use crate::board::DiceModel;
use crate::error::{ConfigError, SimError};
use crate::game::{BoardUpdate, GameMode, DEFAULT_MAX_TURNS};
use crate::strategy::StrategyKind;

/// Tournament settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Games per pairing, per mode.
    pub games_per_matchup: u32,
    pub seed: u64,
    #[serde(default)]
    pub threads: Option<usize>,
    /// Entrants in seat order; pairing (i, j) with i < j puts `strategies[i]` in seat A.
    pub strategies: Vec<StrategyKind>,
    #[serde(default)]
    pub dice: DiceModel,
    #[serde(default)]
    pub board_update: BoardUpdate,
    /// Extended-mode turn limit per game.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

fn default_max_turns() -> u32 {
    DEFAULT_MAX_TURNS
}

impl Default for TournamentConfig {
    fn default() -> Self {
        TournamentConfig {
            games_per_matchup: 10_000,
            seed: 12345,
            threads: None,
            strategies: StrategyKind::ALL.to_vec(),
            dice: DiceModel::TwoDice,
            board_update: BoardUpdate::Sequential,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl TournamentConfig {
    /// All `(A, B)` pairings in play order.
    pub fn pairings(&self) -> Vec<(StrategyKind, StrategyKind)> {
        let s = &self.strategies;
        (0..s.len())
            .flat_map(|i| (i + 1..s.len()).map(move |j| (s[i], s[j])))
            .collect()
    }

    /// Batch configuration for one pairing in one mode.
    ///
    /// Each batch gets its own 2^32-wide block of worker seeds.
    fn batch(&self, pairing: usize, a: StrategyKind, b: StrategyKind, mode: GameMode) -> SimulationConfig {
        let slot = pairing as u64 * 2 + u64::from(mode == GameMode::Extended);
        SimulationConfig {
            threads: self.threads,
            dice: self.dice,
            board_update: self.board_update,
            max_turns: self.max_turns,
            ..SimulationConfig::new(
                self.games_per_matchup,
                mode,
                a.name(),
                b.name(),
                self.seed.wrapping_add(slot << 32),
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseGameStats {
    pub player_a_wins: usize,
    pub player_b_wins: usize,
    pub player_a_avg_score: f64,
    pub player_b_avg_score: f64,
}

/// Extended games carry no scores, only winners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedGameStats {
    pub player_a_wins: usize,
    pub player_b_wins: usize,
}

/// One pairing's results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchupReport {
    pub base_game: BaseGameStats,
    pub extended_game: ExtendedGameStats,
    /// Mean `rounds_played` over the games of both modes.
    pub avg_rounds: f64,
}

impl MatchupReport {
    pub fn from_summaries(base: &ResultSummary, extended: &ResultSummary) -> Self {
        let games = base.games + extended.games;
        let avg_rounds = if games == 0 {
            0.0
        } else {
            (base.avg_rounds * base.games as f64 + extended.avg_rounds * extended.games as f64)
                / games as f64
        };
        MatchupReport {
            base_game: BaseGameStats {
                player_a_wins: base.player_a_wins,
                player_b_wins: base.player_b_wins,
                player_a_avg_score: base.player_a_avg_score,
                player_b_avg_score: base.player_b_avg_score,
            },
            extended_game: ExtendedGameStats {
                player_a_wins: extended.player_a_wins,
                player_b_wins: extended.player_b_wins,
            },
            avg_rounds,
        }
    }
}

/// Pairing results keyed `"<A>_vs_<B>"`.
pub type TournamentReport = BTreeMap<String, MatchupReport>;

/// Plays every pairing of `config.strategies` in both modes.
pub fn run_tournament(config: &TournamentConfig) -> Result<TournamentReport, SimError> {
    if config.games_per_matchup == 0 {
        return Err(ConfigError::NonPositiveGameCount.into());
    }
    if config.threads == Some(0) {
        return Err(ConfigError::ZeroThreads.into());
    }
    if config.max_turns == 0 {
        return Err(ConfigError::ZeroTurnLimit.into());
    }

    let pairings = config.pairings();
    info!(
        "tournament: {} strategies, {} pairings, {} games per pairing and mode",
        config.strategies.len(),
        pairings.len(),
        config.games_per_matchup
    );

    let mut report = TournamentReport::new();
    for (i, &(a, b)) in pairings.iter().enumerate() {
        let start = Instant::now();
        let base = run_single(config.batch(i, a, b, GameMode::Base))?;
        let extended = run_single(config.batch(i, a, b, GameMode::Extended))?;
        let matchup = MatchupReport::from_summaries(&base.summary, &extended.summary);
        info!(
            "{a} vs {b}: base {}-{}, extended {}-{} ({:.2}s)",
            matchup.base_game.player_a_wins,
            matchup.base_game.player_b_wins,
            matchup.extended_game.player_a_wins,
            matchup.extended_game.player_b_wins,
            start.elapsed().as_secs_f64()
        );
        report.insert(matchup_label(a.name(), b.name()), matchup);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(strategies: Vec<StrategyKind>) -> TournamentConfig {
        TournamentConfig {
            games_per_matchup: 20,
            seed: 99,
            threads: Some(2),
            strategies,
            ..Default::default()
        }
    }

    #[test]
    fn pairings_are_unordered_and_distinct() {
        let config = TournamentConfig::default();
        let pairs = config.pairings();
        assert_eq!(pairs.len(), 15);
        assert_eq!(pairs[0], (StrategyKind::Random, StrategyKind::HighestValue));
        assert!(pairs.iter().all(|(a, b)| a != b));
    }

    #[test]
    fn batches_get_distinct_seeds() {
        let config = TournamentConfig::default();
        let (a, b) = (StrategyKind::Random, StrategyKind::Balanced);
        let seeds = [
            config.batch(0, a, b, GameMode::Base).seed,
            config.batch(0, a, b, GameMode::Extended).seed,
            config.batch(1, a, b, GameMode::Base).seed,
        ];
        assert_ne!(seeds[0], seeds[1]);
        assert_ne!(seeds[1], seeds[2]);
        assert_eq!(seeds[0], 12345);
    }

    #[test]
    fn report_covers_every_pairing() {
        let report = run_tournament(&small(StrategyKind::BASIC.to_vec())).unwrap();
        assert_eq!(report.len(), 6);
        let m = &report["HighestValue_vs_Balanced"];
        assert_eq!(m.base_game.player_a_wins + m.base_game.player_b_wins, 20);
        assert_eq!(m.extended_game.player_a_wins + m.extended_game.player_b_wins, 20);
        assert!(m.avg_rounds >= 2.5);
    }

    #[test]
    fn report_json_shape() {
        let report = run_tournament(&small(vec![StrategyKind::Random, StrategyKind::Adaptive])).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        let m = &json["Random_vs_Adaptive"];
        for field in ["player_a_wins", "player_b_wins", "player_a_avg_score", "player_b_avg_score"] {
            assert!(m["base_game"].get(field).is_some(), "base_game.{field}");
        }
        assert!(m["extended_game"].get("player_a_wins").is_some());
        assert!(m["extended_game"].get("player_a_avg_score").is_none());
        assert!(m["avg_rounds"].is_f64());
    }

    #[test]
    fn avg_rounds_weights_both_modes() {
        let base = ResultSummary {
            games: 10,
            avg_rounds: 5.0,
            ..Default::default()
        };
        let extended = ResultSummary {
            games: 10,
            avg_rounds: 35.0,
            ..Default::default()
        };
        assert_eq!(MatchupReport::from_summaries(&base, &extended).avg_rounds, 20.0);
        let empty = ResultSummary::default();
        assert_eq!(MatchupReport::from_summaries(&empty, &empty).avg_rounds, 0.0);
    }

    #[test]
    fn zero_games_is_rejected() {
        let config = TournamentConfig {
            games_per_matchup: 0,
            ..Default::default()
        };
        assert!(matches!(
            run_tournament(&config),
            Err(SimError::Config(ConfigError::NonPositiveGameCount))
        ));
    }

    #[test]
    fn full_default_field_finishes() {
        let config = TournamentConfig {
            games_per_matchup: 4,
            seed: 3,
            threads: Some(2),
            ..Default::default()
        };
        let report = run_tournament(&config).unwrap();
        assert_eq!(report.len(), 15);
        for (label, m) in &report {
            assert_eq!(m.extended_game.player_a_wins + m.extended_game.player_b_wins, 4, "{label}");
        }
    }

    #[test]
    fn turn_limit_reaches_extended_batches() {
        let config = TournamentConfig {
            max_turns: 7,
            ..small(vec![StrategyKind::Random, StrategyKind::Balanced])
        };
        let (a, b) = (StrategyKind::Random, StrategyKind::Balanced);
        assert_eq!(config.batch(0, a, b, GameMode::Extended).max_turns, 7);
        let report = run_tournament(&config).unwrap();
        // Base games average 5 rounds, Extended ones at most 7 turns.
        assert!(report["Random_vs_Balanced"].avg_rounds <= 6.0);
    }

    #[test]
    fn same_seed_same_tournament() {
        let config = small(vec![StrategyKind::Composite, StrategyKind::HighestProbability]);
        assert_eq!(run_tournament(&config).unwrap(), run_tournament(&config).unwrap());
    }
}
