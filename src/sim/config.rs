//! Simulation configuration.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::board::DiceModel;
use crate::error::ConfigError;
use crate::game::{BoardUpdate, GameMode, DEFAULT_MAX_TURNS};
use crate::strategy::StrategyKind;

use super::summary::matchup_label;

/// Configuration for one simulation batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Total games requested across every process.
    pub num_games: u32,
    pub mode: GameMode,
    /// Strategy names for seats A and B.
    pub strategy_names: [String; 2],
    /// Base seed; worker streams are derived from it.
    pub seed: u64,
    /// Worker threads per process (defaults to available parallelism).
    #[serde(default)]
    pub threads: Option<usize>,
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

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_games: 10_000,
            mode: GameMode::Base,
            strategy_names: ["Random".to_string(), "HighestValue".to_string()],
            seed: 12345,
            threads: None,
            dice: DiceModel::TwoDice,
            board_update: BoardUpdate::Sequential,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl SimulationConfig {
    pub fn new(num_games: u32, mode: GameMode, a: &str, b: &str, seed: u64) -> Self {
        SimulationConfig {
            num_games,
            mode,
            strategy_names: [a.to_string(), b.to_string()],
            seed,
            ..Default::default()
        }
    }

    /// Parses a JSON configuration document.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Resolves both strategy names.
    pub fn strategy_kinds(&self) -> Result<[StrategyKind; 2], ConfigError> {
        let [a, b] = &self.strategy_names;
        Ok([a.parse()?, b.parse()?])
    }

    /// Checks everything that must hold before any game is played.
    pub fn validate(&self) -> Result<[StrategyKind; 2], ConfigError> {
        if self.num_games == 0 {
            return Err(ConfigError::NonPositiveGameCount);
        }
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        if self.max_turns == 0 {
            return Err(ConfigError::ZeroTurnLimit);
        }
        self.strategy_kinds()
    }

    /// Worker threads per process.
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }

    /// The `"<A>_vs_<B>"` key results are reported under.
    pub fn label(&self) -> String {
        matchup_label(&self.strategy_names[0], &self.strategy_names[1])
    }
}
