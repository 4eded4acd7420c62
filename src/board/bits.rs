//! Bitboard and move primitives.
//!
//! A board is a 12-bit set over the numbers 1..=12: bit `n - 1` set means the
//! number `n` is present. All operations are pure and total over the legal
//! input domain (rolls in 2..=12).

use std::fmt;

/// Mask with all twelve numbers present.
pub const FULL_MASK: u16 = 0xFFF;

/// Smallest and largest possible two-dice roll.
pub const MIN_ROLL: u8 = 2;
pub const MAX_ROLL: u8 = 12;

/// Returns the single-bit mask for face value `n` (1..=12).
#[inline(always)]
pub const fn bit(n: u8) -> u16 {
    1 << (n - 1)
}

/// Sums the face values of every bit in `mask`.
pub fn sum_of_values(mask: u16) -> u32 {
    (1..=12u8)
        .filter(|&n| mask & bit(n) != 0)
        .map(u32::from)
        .sum()
}

/// A set of bits to flip, or the `NONE` sentinel when no legal move exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(u16);

impl Move {
    /// The "no legal move" sentinel.
    pub const NONE: Move = Move(0);

    pub const fn from_mask(mask: u16) -> Self {
        Move(mask & FULL_MASK)
    }

    /// Single-bit move for face value `n`.
    pub const fn single(n: u8) -> Self {
        Move(bit(n))
    }

    pub const fn mask(self) -> u16 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Total face value of the numbers this move flips.
    pub fn value(self) -> u32 {
        sum_of_values(self.0)
    }
}

/// A 12-bit board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(u16);

impl Board {
    /// All twelve numbers present.
    pub const FULL: Board = Board(FULL_MASK);
    /// No numbers present.
    pub const EMPTY: Board = Board(0);

    /// Creates a board from a raw mask. Bits above the twelfth are dropped.
    pub const fn new(mask: u16) -> Self {
        Board(mask & FULL_MASK)
    }

    pub const fn mask(self) -> u16 {
        self.0
    }

    /// Whether face value `n` (1..=12) is present.
    #[inline(always)]
    pub const fn is_set(self, n: u8) -> bool {
        self.0 & bit(n) != 0
    }

    /// Removes every bit in `mask`.
    #[inline(always)]
    pub const fn clear(self, mask: u16) -> Board {
        Board(self.0 & !mask)
    }

    /// Adds every bit in `mask`.
    #[inline(always)]
    pub const fn set(self, mask: u16) -> Board {
        Board((self.0 | mask) & FULL_MASK)
    }

    #[inline(always)]
    pub const fn popcount(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_full(self) -> bool {
        self.0 == FULL_MASK
    }

    /// The numbers not present on this board.
    ///
    /// In Extended mode player B claims numbers, so B's strategy is shown the
    /// complement: the numbers still free to claim.
    pub const fn complement(self) -> Board {
        Board(!self.0 & FULL_MASK)
    }

    /// Whether `mv` only touches numbers present on this board.
    pub const fn contains(self, mv: Move) -> bool {
        mv.mask() & self.0 == mv.mask()
    }

    /// The single-bit move `roll` if that number is present.
    pub fn single_bit_move(self, roll: u8) -> Option<Move> {
        debug_assert!((MIN_ROLL..=MAX_ROLL).contains(&roll), "roll out of range: {roll}");
        if self.is_set(roll) {
            Some(Move::single(roll))
        } else {
            None
        }
    }

    /// Every subset of present numbers whose values sum exactly to `roll`.
    ///
    /// The single-bit move is listed first when present; the rest follow in
    /// ascending mask order.
    pub fn subset_sum_candidates(self, roll: u8) -> Vec<Move> {
        assert!(
            (MIN_ROLL..=MAX_ROLL).contains(&roll),
            "roll out of range: {roll}"
        );
        let mut moves = Vec::new();
        if let Some(direct) = self.single_bit_move(roll) {
            moves.push(direct);
        }

        // Only numbers below the roll can take part in a multi-bit subset.
        let below = self.0 & (bit(roll) - 1);
        let mut sub = below;
        let mut multi = Vec::new();
        while sub != 0 {
            if sub.count_ones() > 1 && sum_of_values(sub) == u32::from(roll) {
                multi.push(Move(sub));
            }
            sub = (sub - 1) & below;
        }
        multi.reverse();
        moves.extend(multi);
        moves
    }

    /// Present numbers, ascending.
    pub fn values(self) -> impl Iterator<Item = u8> {
        (1..=12u8).filter(move |&n| self.is_set(n))
    }

    /// Present numbers no greater than `roll`, ascending.
    pub fn values_up_to(self, roll: u8) -> impl Iterator<Item = u8> {
        (1..=roll.min(12)).filter(move |&n| self.is_set(n))
    }

    /// Applies `mv` in subtractive semantics.
    pub const fn apply_clear(self, mv: Move) -> Board {
        self.clear(mv.mask())
    }

    /// Applies `mv` in additive semantics.
    pub const fn apply_set(self, mv: Move) -> Board {
        self.set(mv.mask())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#05x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for n in 1..=12u8 {
            if n > 1 {
                write!(f, " ")?;
            }
            if self.is_set(n) {
                write!(f, "{n}")?;
            } else {
                write!(f, "-")?;
            }
        }
        Ok(())
    }
}
