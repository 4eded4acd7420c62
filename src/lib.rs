//! shutbox -- a parallel shut-the-box simulation engine.
//!
//! Exposes the bitboard and dice primitives, the two-mode game state
//! machine, the strategy framework, and the batch harness that spreads games
//! over worker threads and processes.

pub mod board;
pub mod error;
pub mod game;
pub mod sim;
pub mod strategy;

pub use error::{ConfigError, SimError};
