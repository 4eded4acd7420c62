//! Game-state types.
//!
//! Holds per-player state, the rule mode, the phase of a game in progress,
//! and the immutable result a finished game produces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::ConfigError;

/// Rounds each player plays in Base mode.
pub const BASE_ROUNDS: u8 = 5;

/// The rule set a game is played under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Five independent rounds per player; lowest total penalty wins.
    #[default]
    Base,
    /// One shared board; A clears numbers, B claims them back.
    Extended,
}

impl GameMode {
    pub const fn name(self) -> &'static str {
        match self {
            GameMode::Base => "base",
            GameMode::Extended => "extended",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(GameMode::Base),
            "extended" => Ok(GameMode::Extended),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// One of the two seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    A,
    B,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::A, Player::B];

    pub const fn index(self) -> usize {
        match self {
            Player::A => 0,
            Player::B => 1,
        }
    }

    pub const fn other(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }
}

/// Where a game is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    NotStarted,
    /// `player` is taking moves.
    InRound(Player),
    /// `player` just finished a Base-mode round.
    RoundOver(Player),
    Finished,
}

/// One player's board and running totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerState {
    pub board: Board,
    pub score: u32,
    pub round: u8,
}

impl Default for PlayerState {
    fn default() -> Self {
        PlayerState {
            board: Board::FULL,
            score: 0,
            round: 0,
        }
    }
}

/// The outcome of one completed game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameResult {
    pub winner: Player,
    /// Total penalty per player (always zero in Extended mode).
    pub scores: [u32; 2],
    /// Base mode: rounds per player. Extended mode: turns taken.
    pub rounds_played: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names_round_trip() {
        for mode in [GameMode::Base, GameMode::Extended] {
            assert_eq!(mode.name().parse::<GameMode>().unwrap(), mode);
        }
        assert!(matches!(
            "turbo".parse::<GameMode>(),
            Err(ConfigError::InvalidMode(s)) if s == "turbo"
        ));
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&GameMode::Extended).unwrap(), "\"extended\"");
        let mode: GameMode = serde_json::from_str("\"base\"").unwrap();
        assert_eq!(mode, GameMode::Base);
    }

    #[test]
    fn players_alternate() {
        assert_eq!(Player::A.other(), Player::B);
        assert_eq!(Player::B.other().index(), 0);
    }

    #[test]
    fn fresh_player_state() {
        let s = PlayerState::default();
        assert_eq!(s.board, Board::FULL);
        assert_eq!(s.score, 0);
        assert_eq!(s.round, 0);
    }

    #[test]
    fn result_json_shape() {
        let r = GameResult {
            winner: Player::B,
            scores: [14, 9],
            rounds_played: 5,
        };
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"winner":"B","scores":[14,9],"rounds_played":5}"#);
    }
}
