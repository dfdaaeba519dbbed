//! Application state and key handling.

use crate::controller::{GameController, PendingAdvisory, SubmitResult};
use crate::games::guessing::GameStatus;
use crossterm::event::KeyCode;
use tracing::debug;

/// Longest input accepted; three digits cover the whole range.
const MAX_INPUT_LEN: usize = 3;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Nothing beyond redrawing.
    None,
    /// Fetch this advisory in the background.
    FetchAdvisory(PendingAdvisory),
    /// Leave the application.
    Quit,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    controller: GameController,
    input: String,
}

impl App {
    /// Creates the application with a session already started.
    pub fn new() -> Self {
        let mut controller = GameController::new();
        controller.start();
        Self {
            controller,
            input: String::new(),
        }
    }

    /// Gets the controller.
    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    /// Gets the controller mutably, for applying advisories.
    pub fn controller_mut(&mut self) -> &mut GameController {
        &mut self.controller
    }

    /// Text currently typed into the guess field.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyCode) -> AppAction {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => AppAction::Quit,
            KeyCode::Char('r') if self.controller.status().is_terminal() => {
                debug!("Restarting game");
                self.controller.start();
                self.input.clear();
                AppAction::None
            }
            KeyCode::Char(c) if c.is_ascii_digit() && self.accepts_input() => {
                if self.input.len() < MAX_INPUT_LEN {
                    self.input.push(c);
                }
                AppAction::None
            }
            KeyCode::Backspace => {
                self.input.pop();
                AppAction::None
            }
            KeyCode::Enter if self.accepts_input() && !self.input.is_empty() => self.submit(),
            _ => AppAction::None,
        }
    }

    fn accepts_input(&self) -> bool {
        self.controller.status() == GameStatus::Playing && !self.controller.is_loading()
    }

    fn submit(&mut self) -> AppAction {
        match self.controller.submit_guess(&self.input) {
            SubmitResult::Accepted { pending, .. } => {
                self.input.clear();
                AppAction::FetchAdvisory(pending)
            }
            SubmitResult::Rejected(rejection) => {
                debug!(%rejection, "Guess rejected");
                self.input.clear();
                AppAction::None
            }
            SubmitResult::Busy => AppAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::Advisory;

    fn type_guess(app: &mut App, digits: &str) -> AppAction {
        for c in digits.chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter)
    }

    #[test]
    fn enter_submits_and_requests_advisory() {
        let mut app = App::new();
        app.controller_mut().start_with_target(50).unwrap();

        let action = type_guess(&mut app, "25");

        let AppAction::FetchAdvisory(pending) = action else {
            panic!("expected advisory fetch, got {action:?}");
        };
        assert_eq!(*pending.request().guess(), 25);
        assert!(app.input().is_empty());
        assert!(app.controller().is_loading());
    }

    #[test]
    fn typing_is_ignored_while_loading() {
        let mut app = App::new();
        app.controller_mut().start_with_target(50).unwrap();
        type_guess(&mut app, "25");

        assert_eq!(type_guess(&mut app, "30"), AppAction::None);
        assert!(app.input().is_empty());
        assert_eq!(app.controller().attempts(), 1);
    }

    #[test]
    fn input_is_capped_at_three_digits() {
        let mut app = App::new();
        for c in "12345".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        assert_eq!(app.input(), "123");
        app.handle_key(KeyCode::Backspace);
        assert_eq!(app.input(), "12");
    }

    #[test]
    fn restart_only_after_game_ends() {
        let mut app = App::new();
        app.controller_mut().start_with_target(7).unwrap();
        let generation = app.controller().generation();

        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.controller().generation(), generation);

        let AppAction::FetchAdvisory(pending) = type_guess(&mut app, "7") else {
            panic!("expected advisory fetch");
        };
        app.controller_mut()
            .resolve_advisory(*pending.generation(), Advisory::fallback(crate::Hint::Correct));
        assert_eq!(app.controller().status(), GameStatus::Won);

        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.controller().generation(), generation + 1);
        assert_eq!(app.controller().status(), GameStatus::Playing);
    }

    #[test]
    fn quit_keys() {
        let mut app = App::new();
        assert_eq!(app.handle_key(KeyCode::Char('q')), AppAction::Quit);
        assert_eq!(app.handle_key(KeyCode::Esc), AppAction::Quit);
    }
}
