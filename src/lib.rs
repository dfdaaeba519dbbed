//! Strictly Guess library - a type-safe number guessing game
//!
//! The player has ten attempts to find a secret number between 1 and 100.
//! Every accepted guess earns a hint and, best effort, a short comment from an
//! LLM game master.
//!
//! # Architecture
//!
//! - **Games**: the authoritative session state machine ([`GuessGame`])
//! - **Advisory**: best-effort commentary that falls back to fixed hints
//! - **LLM client**: structured output from Gemini, OpenAI or Anthropic
//! - **Controller**: the presentation boundary with its loading guard
//! - **TUI**: a ratatui front end
//!
//! # Example
//!
//! ```no_run
//! use strictly_guess::{AdvisoryClient, GameController, GameStatus};
//!
//! # async fn example() {
//! let client = AdvisoryClient::offline();
//! let mut controller = GameController::new();
//! controller.start();
//!
//! controller.guess("50", &client).await;
//! if controller.status() == GameStatus::Playing {
//!     println!("{:?}", controller.advisory());
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod advisory;
mod config;
mod controller;
mod games;
mod llm_client;
mod tui;

// Crate-level exports - Advisory
pub use advisory::{
    Advisory, AdvisoryBackend, AdvisoryClient, AdvisoryError, AdvisoryRequest,
    DEFAULT_ADVISORY_TIMEOUT, parse_advisory,
};

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};

// Crate-level exports - Controller
pub use controller::{GameController, PendingAdvisory, SubmitResult};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - TUI
pub use tui::run_tui;

// Crate-level exports - Game types
pub use games::guessing::{
    GameStatus, GuessGame, GuessOutcome, GuessRecord, GuessRejection, Hint, MAX_GUESSES,
    RANGE_MAX, RANGE_MIN,
};
