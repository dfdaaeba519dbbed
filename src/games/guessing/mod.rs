//! Number guessing: find a secret number in `1..=100` within ten attempts.

mod rules;
mod types;

pub use rules::{GuessGame, GuessOutcome, GuessRejection};
pub use types::{GameStatus, GuessRecord, Hint, MAX_GUESSES, RANGE_MAX, RANGE_MIN};
