//! Board representation and dice.
//!
//! Contains the 12-bit board, moves, subset-sum legality, the two-dice roll
//! models, and the compare-and-swap board variant.

pub mod atomic;
pub mod bits;
pub mod dice;

pub use atomic::{AtomicBoard, AtomicStep};
pub use bits::{bit, sum_of_values, Board, Move, FULL_MASK, MAX_ROLL, MIN_ROLL};
pub use dice::{roll_probability, Dice, DiceModel, ROLL_WEIGHTS};
