//! Tests for the number guessing session rules.

use strictly_guess::{
    GameStatus, GuessGame, GuessRejection, Hint, MAX_GUESSES, RANGE_MAX, RANGE_MIN,
};

fn playing(target: u32) -> GuessGame {
    let mut game = GuessGame::new();
    game.start_with_target(target).expect("Valid target");
    game
}

#[test]
fn test_new_game_is_idle() {
    let game = GuessGame::new();
    assert_eq!(game.status(), GameStatus::Idle);
    assert!(game.history().is_empty());
    assert_eq!(game.revealed_target(), None);
}

#[test]
fn test_guess_before_start_is_ignored() {
    let mut game = GuessGame::new();
    let result = game.submit_guess("50");
    assert_eq!(
        result,
        Err(GuessRejection::NotPlaying {
            status: GameStatus::Idle
        })
    );
    assert!(game.history().is_empty());
}

#[test]
fn test_winning_sequence() {
    let mut game = playing(50);

    let hints: Vec<Hint> = ["25", "75", "50"]
        .iter()
        .map(|raw| game.submit_guess(raw).expect("Valid guess").hint())
        .collect();

    assert_eq!(hints, vec![Hint::Up, Hint::Down, Hint::Correct]);
    assert_eq!(game.status(), GameStatus::Won);
    assert_eq!(game.attempts(), 3);
    assert_eq!(game.revealed_target(), Some(50));
}

#[test]
fn test_ten_misses_lose() {
    let mut game = playing(50);

    for (i, value) in (1..=10).enumerate() {
        let outcome = game.submit_value(value).expect("Valid guess");
        let expected = if i + 1 == MAX_GUESSES {
            GameStatus::Lost
        } else {
            GameStatus::Playing
        };
        assert_eq!(*outcome.status(), expected);
    }

    assert_eq!(game.history().len(), MAX_GUESSES);
    assert_eq!(game.revealed_target(), Some(50));
    assert_eq!(game.attempts_remaining(), 0);
}

#[test]
fn test_correct_tenth_guess_wins() {
    let mut game = playing(10);

    for value in 1..=9 {
        game.submit_value(value).expect("Valid guess");
    }
    assert_eq!(game.status(), GameStatus::Playing);

    let outcome = game.submit_value(10).expect("Valid guess");
    assert_eq!(outcome.hint(), Hint::Correct);
    assert_eq!(game.status(), GameStatus::Won);
    assert_eq!(game.history().len(), MAX_GUESSES);
}

#[test]
fn test_no_guesses_after_game_over() {
    let mut game = playing(50);
    game.submit_guess("50").expect("Valid guess");

    let result = game.submit_guess("49");
    assert_eq!(
        result,
        Err(GuessRejection::NotPlaying {
            status: GameStatus::Won
        })
    );
    assert_eq!(game.history().len(), 1);
    assert_eq!(game.status(), GameStatus::Won);
}

#[test]
fn test_invalid_input_leaves_state_unchanged() {
    let mut game = playing(50);
    game.submit_guess("10").expect("Valid guess");

    for raw in ["abc", "", "  ", "12.5", "1e2", "0x10", "-", "150", "0", "-3", "101"] {
        let result = game.submit_guess(raw);
        let rejection = result.expect_err("Input should be rejected");
        assert!(
            matches!(
                rejection,
                GuessRejection::NotANumber { .. } | GuessRejection::OutOfRange { .. }
            ),
            "unexpected rejection for {raw:?}: {rejection:?}"
        );
        assert!(!rejection.is_user_visible());
    }

    assert_eq!(game.history_values(), vec![10]);
    assert_eq!(game.status(), GameStatus::Playing);
}

#[test]
fn test_out_of_range_values() {
    let mut game = playing(50);
    for value in [i64::MIN, -1, 0, 101, i64::from(u32::MAX) + 1, i64::MAX] {
        assert_eq!(
            game.submit_value(value),
            Err(GuessRejection::OutOfRange { value })
        );
    }
    assert!(game.history().is_empty());
}

#[test]
fn test_range_bounds_are_playable() {
    let mut game = playing(50);
    assert_eq!(
        game.submit_value(i64::from(RANGE_MIN)).unwrap().hint(),
        Hint::Up
    );
    assert_eq!(
        game.submit_value(i64::from(RANGE_MAX)).unwrap().hint(),
        Hint::Down
    );
}

#[test]
fn test_whitespace_is_trimmed() {
    let mut game = playing(50);
    let outcome = game.submit_guess("  42\n").expect("Valid guess");
    assert_eq!(*outcome.record().value(), 42);
}

#[test]
fn test_duplicate_guess_is_signalled() {
    let mut game = playing(50);
    game.submit_guess("25").expect("Valid guess");

    let rejection = game.submit_guess("25").expect_err("Duplicate");

    assert_eq!(rejection, GuessRejection::Duplicate { value: 25 });
    assert!(rejection.is_user_visible());
    assert_eq!(game.history().len(), 1);
    assert_eq!(game.status(), GameStatus::Playing);
}

#[test]
fn test_hint_matches_comparison_for_every_value() {
    for value in RANGE_MIN..=RANGE_MAX {
        let mut game = playing(37);
        let hint = game.submit_value(i64::from(value)).unwrap().hint();
        let expected = match value {
            v if v < 37 => Hint::Up,
            v if v > 37 => Hint::Down,
            _ => Hint::Correct,
        };
        assert_eq!(hint, expected, "value {value}");
    }
}

#[test]
fn test_history_is_chronological_and_reversible() {
    let mut game = playing(99);
    for raw in ["10", "20", "30"] {
        game.submit_guess(raw).unwrap();
    }

    assert_eq!(game.history_values(), vec![10, 20, 30]);
    let newest_first: Vec<u32> = game
        .history_newest_first()
        .map(|record| *record.value())
        .collect();
    assert_eq!(newest_first, vec![30, 20, 10]);
}

#[test]
fn test_target_hidden_while_playing() {
    let mut game = playing(64);
    game.submit_guess("1").unwrap();
    assert_eq!(game.revealed_target(), None);
}

#[test]
fn test_restart_after_loss() {
    let mut game = playing(50);
    for value in 1..=10 {
        game.submit_value(value).unwrap();
    }
    assert_eq!(game.status(), GameStatus::Lost);

    game.start();

    assert_eq!(game.status(), GameStatus::Playing);
    assert!(game.history().is_empty());
    assert_eq!(game.revealed_target(), None);
    assert_eq!(game.generation(), 2);
}
