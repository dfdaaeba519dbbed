//! Core domain types for the number guessing game.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Smallest number the target can be.
pub const RANGE_MIN: u32 = 1;

/// Largest number the target can be.
pub const RANGE_MAX: u32 = 100;

/// Number of guesses allowed per session.
pub const MAX_GUESSES: usize = 10;

/// Directional hint for a guess.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Hint {
    /// Target is greater than the guess.
    Up,
    /// Target is less than the guess.
    Down,
    /// Guess equals the target.
    Correct,
}

impl Hint {
    /// Derives the hint for `value` against `target`.
    pub fn for_guess(value: u32, target: u32) -> Self {
        use std::cmp::Ordering;

        match value.cmp(&target) {
            Ordering::Less => Hint::Up,
            Ordering::Greater => Hint::Down,
            Ordering::Equal => Hint::Correct,
        }
    }

    /// Arrow glyph used when listing guesses.
    pub fn arrow(self) -> &'static str {
        match self {
            Hint::Up => "▲",
            Hint::Down => "▼",
            Hint::Correct => "●",
        }
    }
}

/// Lifecycle of a session.
///
/// Transitions are monotonic: `Idle -> Playing -> {Won | Lost}`. Only a fresh
/// start leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// No session has been started yet.
    Idle,
    /// Accepting guesses.
    Playing,
    /// Target was found.
    Won,
    /// Ran out of guesses.
    Lost,
}

impl GameStatus {
    /// Returns true once the session has been decided.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Won | GameStatus::Lost)
    }
}

/// A single accepted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GuessRecord {
    /// Guessed number.
    value: u32,
    /// Hint computed for the guess.
    hint: Hint,
    /// Milliseconds since the epoch, strictly increasing within a session.
    /// Display identity only.
    created_at: i64,
}

impl GuessRecord {
    pub(super) fn new(value: u32, hint: Hint, created_at: i64) -> Self {
        Self {
            value,
            hint,
            created_at,
        }
    }

    /// Returns true if this guess hit the target.
    pub fn is_correct(&self) -> bool {
        self.hint == Hint::Correct
    }
}
