//! The game state machine.
//!
//! Base mode: each player plays [`BASE_ROUNDS`] rounds from a fresh full
//! board. A round repeatedly rolls and asks the player's strategy for a move;
//! a pass ends the round with the remaining numbers as penalty, and clearing
//! the board ends it with no penalty. Lower total wins; a tie goes to B.
//!
//! Extended mode: one shared board, single-roll turns alternating from A.
//! A clears numbers, B claims them back (B's strategy sees the complement of
//! the board). An empty board wins for A, a full board wins for B. After
//! `max_turns` turns the game stops and A wins only if fewer than half the
//! numbers are left on the board.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{GameMode, GamePhase, GameResult, Player, PlayerState, BASE_ROUNDS};
use crate::board::{AtomicBoard, AtomicStep, Board, Dice, Move, MAX_ROLL, MIN_ROLL};
use crate::strategy::Strategy;

/// Numbers on a board; a round can never take more moves than this.
const MAX_MOVES_PER_ROUND: u32 = 12;

/// Default Extended-mode turn limit.
pub const DEFAULT_MAX_TURNS: u32 = 200;

/// A capped Extended game goes to A below this many numbers left.
const CAP_SPLIT: u32 = 6;

/// Winner of an Extended game stopped on `board`. Agrees with the
/// empty-board and full-board wins.
pub fn extended_winner(board: Board) -> Player {
    if board.popcount() < CAP_SPLIT {
        Player::A
    } else {
        Player::B
    }
}

fn assert_roll(roll: u8) {
    assert!((MIN_ROLL..=MAX_ROLL).contains(&roll), "roll out of range: {roll}");
}

/// How a Base-mode round commits moves to its board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardUpdate {
    /// Plain mutation of a thread-owned board.
    #[default]
    Sequential,
    /// Compare-and-swap through an [`AtomicBoard`].
    Atomic,
}

/// Result of one Extended-mode turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Moved(Board),
    Passed,
    Won(Player),
}

/// A single game between two seats.
#[derive(Debug, Clone)]
pub struct Game {
    mode: GameMode,
    update: BoardUpdate,
    players: [PlayerState; 2],
    /// Extended mode's shared board.
    shared: Board,
    phase: GamePhase,
    turns: u32,
    max_turns: u32,
}

impl Game {
    pub fn new(mode: GameMode) -> Self {
        Game::with_update(mode, BoardUpdate::Sequential)
    }

    pub fn with_update(mode: GameMode, update: BoardUpdate) -> Self {
        Game {
            mode,
            update,
            players: [PlayerState::default(); 2],
            shared: Board::FULL,
            phase: GamePhase::NotStarted,
            turns: 0,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Sets the Extended-mode turn limit. Zero is treated as one.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn player(&self, player: Player) -> &PlayerState {
        &self.players[player.index()]
    }

    /// The board Extended-mode turns act on.
    pub fn shared_board(&self) -> Board {
        self.shared
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    /// Plays the game to completion.
    pub fn play<R: Rng + ?Sized>(
        mut self,
        a: &mut dyn Strategy,
        b: &mut dyn Strategy,
        dice: &Dice,
        rng: &mut R,
    ) -> GameResult {
        match self.mode {
            GameMode::Base => {
                for _ in 0..BASE_ROUNDS {
                    self.play_round(Player::A, a, || dice.roll(rng));
                    self.play_round(Player::B, b, || dice.roll(rng));
                }
            }
            GameMode::Extended => {
                while !self.is_finished() {
                    let roll = dice.roll(rng);
                    let seat = self.to_move();
                    let strategy: &mut dyn Strategy = match seat {
                        Player::A => &mut *a,
                        Player::B => &mut *b,
                    };
                    self.play_turn(strategy, roll);
                }
            }
        }
        match self.into_result() {
            Some(result) => result,
            None => unreachable!("game loop exited before the game finished"),
        }
    }

    /// The seat whose turn it is in Extended mode.
    pub fn to_move(&self) -> Player {
        match self.phase {
            GamePhase::InRound(p) => p,
            _ => Player::A,
        }
    }

    /// Plays one Base-mode round for `player`, drawing rolls from `next_roll`.
    /// Returns the penalty scored for the round.
    ///
    /// The game finishes once B has played its last round.
    pub fn play_round<F>(&mut self, player: Player, strategy: &mut dyn Strategy, mut next_roll: F) -> u32
    where
        F: FnMut() -> u8,
    {
        assert_eq!(self.mode, GameMode::Base, "rounds are a Base-mode concept");
        assert!(!self.is_finished(), "round played on a finished game");
        self.phase = GamePhase::InRound(player);

        let checked = move || {
            let roll = next_roll();
            assert_roll(roll);
            roll
        };
        let (board, penalty) = match self.update {
            BoardUpdate::Sequential => sequential_round(strategy, checked),
            BoardUpdate::Atomic => atomic_round(strategy, checked),
        };

        let state = &mut self.players[player.index()];
        state.board = board;
        state.score += penalty;
        state.round += 1;

        let both_done = self.players.iter().all(|p| p.round >= BASE_ROUNDS);
        self.phase = if both_done {
            GamePhase::Finished
        } else {
            GamePhase::RoundOver(player)
        };
        penalty
    }

    /// Plays one Extended-mode turn for the seat to move with a given roll.
    ///
    /// The turn that reaches the turn limit finishes the game even if the
    /// board is neither empty nor full.
    pub fn play_turn(&mut self, strategy: &mut dyn Strategy, roll: u8) -> TurnOutcome {
        assert_eq!(self.mode, GameMode::Extended, "turns are an Extended-mode concept");
        assert!(!self.is_finished(), "turn played on a finished game");
        assert_roll(roll);
        let seat = self.to_move();
        self.turns += 1;

        let view = match seat {
            Player::A => self.shared,
            Player::B => self.shared.complement(),
        };
        let mv = strategy.choose_move(view, roll);
        if !mv.is_none() {
            debug_assert!(view.contains(mv), "{} returned an illegal move", strategy.name());
            self.shared = match seat {
                Player::A => self.shared.apply_clear(mv),
                Player::B => self.shared.apply_set(mv),
            };
        }

        let decided = !mv.is_none() && (self.shared.is_empty() || self.shared.is_full());
        if decided || self.turns >= self.max_turns {
            self.phase = GamePhase::Finished;
            return TurnOutcome::Won(extended_winner(self.shared));
        }
        self.phase = GamePhase::InRound(seat.other());
        if mv.is_none() {
            TurnOutcome::Passed
        } else {
            TurnOutcome::Moved(self.shared)
        }
    }

    /// Consumes a finished game into its result; `None` if unfinished.
    pub fn into_result(self) -> Option<GameResult> {
        if !self.is_finished() {
            return None;
        }
        let result = match self.mode {
            GameMode::Base => {
                let [a, b] = self.players;
                GameResult {
                    winner: if a.score < b.score { Player::A } else { Player::B },
                    scores: [a.score, b.score],
                    rounds_played: u32::from(a.round),
                }
            }
            GameMode::Extended => GameResult {
                winner: extended_winner(self.shared),
                scores: [0, 0],
                rounds_played: self.turns,
            },
        };
        Some(result)
    }
}

fn sequential_round<F>(strategy: &mut dyn Strategy, mut next_roll: F) -> (Board, u32)
where
    F: FnMut() -> u8,
{
    let mut board = Board::FULL;
    let mut moves = 0;
    loop {
        let mv = strategy.choose_move(board, next_roll());
        if mv.is_none() {
            return (board, board.popcount());
        }
        debug_assert!(board.contains(mv), "{} returned an illegal move", strategy.name());
        board = board.apply_clear(mv);
        moves += 1;
        debug_assert!(moves <= MAX_MOVES_PER_ROUND);
        if board.is_empty() {
            return (board, 0);
        }
    }
}

fn atomic_round<F>(strategy: &mut dyn Strategy, mut next_roll: F) -> (Board, u32)
where
    F: FnMut() -> u8,
{
    let board = AtomicBoard::new(Board::FULL);
    loop {
        match board.apply_clear(next_roll(), |b, roll| strategy.choose_move(b, roll)) {
            AtomicStep::Moved(after) if after.is_empty() => return (after, 0),
            AtomicStep::Moved(_) => {}
            AtomicStep::Blocked { penalty } => return (board.load(), penalty),
        }
    }
}

/// A strategy that never moves; handy for driving one seat in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassStrategy;

impl Strategy for PassStrategy {
    fn name(&self) -> &str {
        "Pass"
    }

    fn choose_move(&mut self, _board: Board, _roll: u8) -> Move {
        Move::NONE
    }
}
