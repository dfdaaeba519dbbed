//! Presentation boundary: one game session plus its advisory slot.
//!
//! The controller accepts exactly two commands, [`GameController::start`] and
//! [`GameController::submit_guess`], and exposes read-only views for display.
//! Guess outcomes are committed synchronously; the advisory for an accepted
//! guess is fetched afterwards and handed back through
//! [`GameController::resolve_advisory`]. While it is pending the controller is
//! `loading` and refuses further guesses.

use crate::advisory::{Advisory, AdvisoryClient, AdvisoryRequest};
use crate::games::guessing::{GameStatus, GuessGame, GuessOutcome, GuessRecord, GuessRejection};
use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

/// An advisory fetch the caller owes the controller.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PendingAdvisory {
    /// Session the request belongs to.
    generation: u64,
    /// What to ask the advisory service.
    request: AdvisoryRequest,
}

/// Result of [`GameController::submit_guess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// The guess was recorded and the outcome committed.
    Accepted {
        /// The committed outcome.
        outcome: GuessOutcome,
        /// Advisory to fetch and resolve.
        pending: PendingAdvisory,
    },
    /// The guess was refused; state is unchanged.
    Rejected(GuessRejection),
    /// A previous advisory is still pending; the guess was dropped.
    Busy,
}

/// Owns the authoritative game and the state the display reads.
#[derive(Debug, Clone, Default)]
pub struct GameController {
    game: GuessGame,
    advisory: Option<Advisory>,
    loading: bool,
}

impl GameController {
    /// Creates a controller with no session started.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating game controller");
        Self::default()
    }

    /// Starts a fresh session and shows the greeting.
    ///
    /// Any advisory still in flight for the previous session becomes stale.
    #[instrument(skip(self))]
    pub fn start(&mut self) {
        self.game.start();
        self.on_started();
    }

    /// Starts a fresh session with a known target.
    ///
    /// # Errors
    ///
    /// Returns [`GuessRejection::OutOfRange`] for an unplayable target.
    #[instrument(skip(self))]
    pub fn start_with_target(&mut self, target: u32) -> Result<(), GuessRejection> {
        self.game.start_with_target(target)?;
        self.on_started();
        Ok(())
    }

    fn on_started(&mut self) {
        if self.loading {
            debug!("Abandoning advisory from previous session");
        }
        self.loading = false;
        self.advisory = Some(Advisory::greeting());
    }

    /// Submits a raw guess.
    #[instrument(skip(self), fields(generation = self.game.generation()))]
    pub fn submit_guess(&mut self, raw: &str) -> SubmitResult {
        if self.loading {
            debug!(raw, "Guess dropped while advisory is pending");
            return SubmitResult::Busy;
        }

        let outcome = match self.game.submit_guess(raw) {
            Ok(outcome) => outcome,
            Err(rejection) => {
                if rejection.is_user_visible() {
                    self.advisory = Some(Advisory::duplicate());
                }
                return SubmitResult::Rejected(rejection);
            }
        };

        let Some(target) = self.game.target() else {
            // A playing session always has a target.
            warn!("Accepted guess without a target");
            return SubmitResult::Rejected(GuessRejection::NotPlaying {
                status: self.game.status(),
            });
        };

        let history = self
            .game
            .history_newest_first()
            .map(|record| *record.value())
            .collect();
        let request = AdvisoryRequest::new(*outcome.record().value(), target, history, outcome.hint());

        self.loading = true;
        SubmitResult::Accepted {
            outcome,
            pending: PendingAdvisory {
                generation: *outcome.generation(),
                request,
            },
        }
    }

    /// Applies a fetched advisory.
    ///
    /// Returns false and leaves state untouched when `generation` is not the
    /// session currently waiting on an advisory.
    #[instrument(skip(self, advisory), fields(current = self.game.generation()))]
    pub fn resolve_advisory(&mut self, generation: u64, advisory: Advisory) -> bool {
        if !self.loading || generation != self.game.generation() {
            debug!(generation, "Discarding stale advisory");
            return false;
        }
        self.advisory = Some(advisory);
        self.loading = false;
        true
    }

    /// Submits a guess and, if accepted, fetches and applies its advisory.
    #[instrument(skip(self, client))]
    pub async fn guess(&mut self, raw: &str, client: &AdvisoryClient) -> SubmitResult {
        let result = self.submit_guess(raw);
        if let SubmitResult::Accepted { pending, .. } = &result {
            let advisory = client.fetch(pending.request()).await;
            self.resolve_advisory(*pending.generation(), advisory);
        }
        result
    }

    /// Session status.
    pub fn status(&self) -> GameStatus {
        self.game.status()
    }

    /// Accepted guesses, oldest first.
    pub fn history(&self) -> &[GuessRecord] {
        self.game.history()
    }

    /// Accepted guesses, newest first.
    pub fn history_newest_first(&self) -> impl Iterator<Item = &GuessRecord> {
        self.game.history_newest_first()
    }

    /// The target, once the session is decided.
    pub fn revealed_target(&self) -> Option<u32> {
        self.game.revealed_target()
    }

    /// True while an advisory is pending.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current advisory, if a session has been started.
    pub fn advisory(&self) -> Option<&Advisory> {
        self.advisory.as_ref()
    }

    /// Guesses used this session.
    pub fn attempts(&self) -> usize {
        self.game.attempts()
    }

    /// Guesses left this session.
    pub fn attempts_remaining(&self) -> usize {
        self.game.attempts_remaining()
    }

    /// Current session identity.
    pub fn generation(&self) -> u64 {
        self.game.generation()
    }
}
