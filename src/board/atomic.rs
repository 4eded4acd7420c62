//! Lock-free board variant.
//!
//! Stores the board in an `AtomicU16` and applies each move through a
//! compare-and-swap retry loop. Per-game boards are confined to the thread
//! running the game, so in practice the first exchange always succeeds; the
//! loop only matters if a board is ever shared between threads.

use std::sync::atomic::{AtomicU16, Ordering};

use super::bits::{Board, Move};

/// Outcome of one roll applied to an [`AtomicBoard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomicStep {
    /// A move was committed; holds the board after the move.
    Moved(Board),
    /// No legal move; holds the penalty (numbers left on the board).
    Blocked { penalty: u32 },
}

/// Board whose moves are committed by compare-and-swap.
#[derive(Debug)]
pub struct AtomicBoard {
    inner: AtomicU16,
}

impl AtomicBoard {
    pub fn new(board: Board) -> Self {
        AtomicBoard {
            inner: AtomicU16::new(board.mask()),
        }
    }

    pub fn load(&self) -> Board {
        Board::new(self.inner.load(Ordering::Acquire))
    }

    pub fn store(&self, board: Board) {
        self.inner.store(board.mask(), Ordering::Release);
    }

    /// Applies one subtractive move chosen by `choose` for `roll`.
    ///
    /// `choose` is re-invoked with the fresh board whenever another writer
    /// wins the race, so the committed move is always legal for the board it
    /// was chosen against.
    pub fn apply_clear<F>(&self, roll: u8, mut choose: F) -> AtomicStep
    where
        F: FnMut(Board, u8) -> Move,
    {
        loop {
            let old = self.inner.load(Ordering::Acquire);
            let mv = choose(Board::new(old), roll);
            if mv.is_none() {
                return AtomicStep::Blocked {
                    penalty: old.count_ones(),
                };
            }
            let new = Board::new(old).apply_clear(mv);
            if self
                .inner
                .compare_exchange_weak(old, new.mask(), Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return AtomicStep::Moved(new);
            }
            std::hint::spin_loop();
        }
    }
}
