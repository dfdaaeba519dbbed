//! Session rules for the number guessing game.
//!
//! [`GuessGame`] owns the secret target and is the single authority on
//! whether a guess is legal, which hint it earns, and when the session ends.
//! Nothing outside this module can change the outcome of a session.

use super::types::{GameStatus, GuessRecord, Hint, MAX_GUESSES, RANGE_MAX, RANGE_MIN};
use derive_getters::Getters;
use derive_more::{Display, Error};
use rand::Rng;
use tracing::{debug, info, instrument, warn};

/// Why a guess was not accepted. None of these change session state.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GuessRejection {
    /// Input did not parse as an integer.
    #[display("'{input}' is not a number")]
    NotANumber {
        /// The raw input, as received.
        input: String,
    },
    /// Input parsed but lies outside the playable range.
    #[display("{value} is outside {}..={}", RANGE_MIN, RANGE_MAX)]
    OutOfRange {
        /// The parsed value.
        value: i64,
    },
    /// The session is not accepting guesses.
    #[display("guesses are not accepted while {status}")]
    NotPlaying {
        /// Status at the time of the guess.
        status: GameStatus,
    },
    /// The number was already guessed this session.
    #[display("{value} was already guessed")]
    Duplicate {
        /// The repeated value.
        value: u32,
    },
}

impl GuessRejection {
    /// Returns true for rejections the player should be told about.
    ///
    /// Invalid and out-of-turn input is dropped silently; repeating a guess
    /// gets explicit feedback.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, GuessRejection::Duplicate { .. })
    }
}

/// Result of an accepted guess, committed before any advisory is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct GuessOutcome {
    /// The record appended to the history.
    record: GuessRecord,
    /// Status after the termination check.
    status: GameStatus,
    /// History length after the guess.
    attempts: usize,
    /// Session the guess belongs to.
    generation: u64,
}

impl GuessOutcome {
    /// Hint earned by the guess.
    pub fn hint(&self) -> Hint {
        *self.record.hint()
    }
}

/// Number guessing session state machine.
#[derive(Debug, Clone)]
pub struct GuessGame {
    target: Option<u32>,
    status: GameStatus,
    history: Vec<GuessRecord>,
    generation: u64,
}

impl GuessGame {
    /// Creates an idle game. Call [`GuessGame::start`] before guessing.
    #[instrument]
    pub fn new() -> Self {
        Self {
            target: None,
            status: GameStatus::Idle,
            history: Vec::with_capacity(MAX_GUESSES),
            generation: 0,
        }
    }

    /// Starts a new session with a uniformly drawn target.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn start(&mut self) {
        self.start_with_rng(&mut rand::thread_rng());
    }

    /// Starts a new session drawing the target from `rng`.
    #[instrument(skip(self, rng), fields(generation = self.generation))]
    pub fn start_with_rng<R: Rng>(&mut self, rng: &mut R) {
        let target = rng.gen_range(RANGE_MIN..=RANGE_MAX);
        self.reset(target);
    }

    /// Starts a new session with a known target.
    ///
    /// # Errors
    ///
    /// Returns [`GuessRejection::OutOfRange`] if `target` is not playable.
    /// The current session is left untouched in that case.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn start_with_target(&mut self, target: u32) -> Result<(), GuessRejection> {
        if !(RANGE_MIN..=RANGE_MAX).contains(&target) {
            warn!(target, "Refusing to start with unplayable target");
            return Err(GuessRejection::OutOfRange {
                value: i64::from(target),
            });
        }
        self.reset(target);
        Ok(())
    }

    fn reset(&mut self, target: u32) {
        self.target = Some(target);
        self.history.clear();
        self.status = GameStatus::Playing;
        self.generation += 1;
        info!(generation = self.generation, "New session started");
    }

    /// Submits a raw guess token, typically straight from an input field.
    ///
    /// Surrounding whitespace is ignored. Anything that is not an integer is
    /// rejected as [`GuessRejection::NotANumber`].
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn submit_guess(&mut self, raw: &str) -> Result<GuessOutcome, GuessRejection> {
        let value = raw.trim().parse::<i64>().map_err(|_| {
            debug!(raw, "Ignoring non-numeric guess");
            GuessRejection::NotANumber {
                input: raw.to_string(),
            }
        })?;
        self.submit_value(value)
    }

    /// Submits an already-parsed guess.
    ///
    /// Checks run in order: range, session status, duplicate. The first
    /// failure is returned and the session is left unchanged.
    #[instrument(skip(self), fields(generation = self.generation, status = %self.status))]
    pub fn submit_value(&mut self, value: i64) -> Result<GuessOutcome, GuessRejection> {
        let value = u32::try_from(value)
            .ok()
            .filter(|v| (RANGE_MIN..=RANGE_MAX).contains(v))
            .ok_or_else(|| {
                debug!(value, "Ignoring out-of-range guess");
                GuessRejection::OutOfRange { value }
            })?;

        let target = match (self.status, self.target) {
            (GameStatus::Playing, Some(target)) => target,
            (status, _) => {
                debug!(value, %status, "Ignoring guess outside of play");
                return Err(GuessRejection::NotPlaying { status });
            }
        };

        if self.history.iter().any(|record| *record.value() == value) {
            info!(value, "Duplicate guess");
            return Err(GuessRejection::Duplicate { value });
        }

        let hint = Hint::for_guess(value, target);
        let record = GuessRecord::new(value, hint, self.next_timestamp());
        self.history.push(record);

        // Correctness is checked before exhaustion: a correct tenth guess wins.
        if record.is_correct() {
            self.status = GameStatus::Won;
        } else if self.history.len() >= MAX_GUESSES {
            self.status = GameStatus::Lost;
        }

        info!(
            value,
            %hint,
            attempts = self.history.len(),
            status = %self.status,
            "Guess accepted"
        );

        Ok(GuessOutcome {
            record,
            status: self.status,
            attempts: self.history.len(),
            generation: self.generation,
        })
    }

    fn next_timestamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        match self.history.last() {
            Some(last) if *last.created_at() >= now => last.created_at() + 1,
            _ => now,
        }
    }

    /// Returns the session status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns accepted guesses, oldest first.
    pub fn history(&self) -> &[GuessRecord] {
        &self.history
    }

    /// Returns accepted guess values, oldest first.
    pub fn history_values(&self) -> Vec<u32> {
        self.history.iter().map(|record| *record.value()).collect()
    }

    /// Returns accepted guesses, newest first.
    pub fn history_newest_first(&self) -> impl Iterator<Item = &GuessRecord> {
        self.history.iter().rev()
    }

    /// Number of guesses accepted this session.
    pub fn attempts(&self) -> usize {
        self.history.len()
    }

    /// Number of guesses left this session.
    pub fn attempts_remaining(&self) -> usize {
        MAX_GUESSES.saturating_sub(self.history.len())
    }

    /// Identity of the current session; increments on every start.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the target once the session has been decided.
    pub fn revealed_target(&self) -> Option<u32> {
        if self.status.is_terminal() {
            self.target
        } else {
            None
        }
    }

    /// Returns the target regardless of status.
    pub(crate) fn target(&self) -> Option<u32> {
        self.target
    }
}

impl Default for GuessGame {
    fn default() -> Self {
        Self::new()
    }
}
