//! Game rules.
//!
//! The per-player state types and the two-mode state machine that plays a
//! game between two strategies.

pub mod machine;
pub mod state;

pub use machine::{extended_winner, BoardUpdate, Game, PassStrategy, TurnOutcome, DEFAULT_MAX_TURNS};
pub use state::{GameMode, GamePhase, GameResult, Player, PlayerState, BASE_ROUNDS};
