use guessweight_game::constants::{LEVEL_SIZE, SESSION_KEY};
use guessweight_game::{
    DifficultyId, GameController, GameError, GamePhase, GameStorage, GuessOutcome, GuessRejection,
    InitOutcome, LeaderboardStore, MemoryStorage, ModeId, NullRenderer, ScaleModel, SessionSetup,
    SessionStore, TimerEvent, TypedGuess,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn begin(storage: &MemoryStorage, mode: ModeId, difficulty: DifficultyId, timed: bool) {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5EED);
    SessionStore::new(storage)
        .begin(
            &SessionSetup::new("Rita", mode, difficulty, timed),
            &mut rng,
        )
        .unwrap();
}

fn typed_game(
    storage: &MemoryStorage,
) -> GameController<MemoryStorage, TypedGuess, NullRenderer> {
    let mut game = GameController::new(
        storage.clone(),
        TypedGuess::default(),
        NullRenderer,
        ModeId::Input,
        42,
    );
    assert!(matches!(game.init().unwrap(), InitOutcome::Resumed { .. }));
    game
}

fn guess_current<S: GameStorage>(
    game: &mut GameController<S, TypedGuess, NullRenderer>,
) -> GuessOutcome {
    let weight = game.current_animal().unwrap().weight;
    game.extractor_mut().set_text(weight.to_string());
    game.handle_submit().unwrap()
}

#[test]
fn perfect_easy_round_scores_fifty() {
    let storage = MemoryStorage::new();
    begin(&storage, ModeId::Input, DifficultyId::Easy, false);
    let mut game = typed_game(&storage);

    for _ in 0..LEVEL_SIZE - 1 {
        assert_eq!(
            guess_current(&mut game),
            GuessOutcome::Correct {
                points: 10,
                level_complete: false
            }
        );
    }
    assert_eq!(
        guess_current(&mut game),
        GuessOutcome::Correct {
            points: 10,
            level_complete: true
        }
    );
    assert_eq!(game.phase(), GamePhase::LevelComplete);
    let state = game.state().unwrap();
    assert_eq!(state.base_score, 50);
    assert_eq!(state.completed_animals, 5);
    assert_eq!(game.compute_final_score().unwrap(), 50 * 5);
}

#[test]
fn three_expiries_on_hard_lose_the_game() {
    let storage = MemoryStorage::new();
    begin(&storage, ModeId::Input, DifficultyId::Hard, true);
    let mut game = typed_game(&storage);

    for expiry in 1..=3 {
        let token = game.timer_token().unwrap();
        let mut event = game.tick(token).unwrap();
        while matches!(event, TimerEvent::Tick(_)) {
            event = game.tick(token).unwrap();
        }
        assert_eq!(event, TimerEvent::Expired, "expiry {expiry}");
    }
    assert_eq!(game.phase(), GamePhase::Lost);
    assert_eq!(game.timer_token(), None);
    assert_eq!(game.compute_final_score().unwrap(), 0);
}

#[test]
fn wrong_guesses_and_timeouts_share_the_attempt_budget() {
    let storage = MemoryStorage::new();
    begin(&storage, ModeId::Input, DifficultyId::Medium, false);
    let mut game = typed_game(&storage);
    let weight = f64::from(game.current_animal().unwrap().weight);

    assert!(matches!(
        game.submit_guess(weight * 3.0).unwrap(),
        GuessOutcome::Wrong { attempts_left: 3, .. }
    ));
    assert!(matches!(
        game.handle_timeout().unwrap(),
        GuessOutcome::Wrong {
            direction: None,
            attempts_left: 2
        }
    ));
    assert!(matches!(
        game.submit_guess(weight / 3.0).unwrap(),
        GuessOutcome::Wrong { attempts_left: 1, .. }
    ));
    assert_eq!(game.handle_timeout().unwrap(), GuessOutcome::Lost);
}

#[test]
fn session_survives_a_reload_mid_level() {
    let storage = MemoryStorage::new();
    begin(&storage, ModeId::Input, DifficultyId::Easy, true);
    let mut game = typed_game(&storage);
    guess_current(&mut game);
    game.handle_timeout().unwrap();
    let snapshot = game.state().cloned();
    drop(game);

    let reloaded = typed_game(&storage);
    assert_eq!(reloaded.state().cloned(), snapshot);
    assert_eq!(reloaded.phase(), GamePhase::Playing);
    assert_eq!(reloaded.remaining_seconds(), Some(60));
}

#[test]
fn climbing_all_tiers_then_saving() {
    let storage = MemoryStorage::new();
    begin(&storage, ModeId::Input, DifficultyId::Easy, true);
    let mut game = typed_game(&storage);

    for tier in [DifficultyId::Easy, DifficultyId::Medium, DifficultyId::Hard] {
        assert_eq!(game.state().unwrap().difficulty, tier);
        for _ in 0..LEVEL_SIZE {
            guess_current(&mut game);
        }
        assert_eq!(game.phase(), GamePhase::LevelComplete);
        if tier != DifficultyId::Hard {
            game.advance_level().unwrap();
        }
    }
    assert!(matches!(game.advance_level(), Err(GameError::NoNextTier)));

    let entry = game.save_and_exit().unwrap();
    assert_eq!(entry.score, 50 * 3 * 2 * 5);
    assert_eq!(entry.difficulty_label, "Hard");
    assert!(entry.timed);
    assert!(!storage.contains(SESSION_KEY));

    let board = LeaderboardStore::new(&storage).load().unwrap();
    assert_eq!(board.first(), Some(&entry));
    assert!(matches!(
        game.advance_level(),
        Err(GameError::InvalidPhase {
            phase: GamePhase::Saved,
            ..
        })
    ));
}

#[test]
fn used_window_keeps_levels_fresh_across_tiers() {
    let storage = MemoryStorage::new();
    begin(&storage, ModeId::Input, DifficultyId::Easy, false);
    let mut game = typed_game(&storage);
    let first_level = game.state().unwrap().level_animals.clone();
    for _ in 0..LEVEL_SIZE {
        guess_current(&mut game);
    }
    game.advance_level().unwrap();
    let state = game.state().unwrap();
    assert!(state.level_animals.iter().all(|id| !first_level.contains(id)));
    assert_eq!(state.used_animals.len(), 2 * LEVEL_SIZE);
}

#[test]
fn scale_mode_plays_through_the_same_machine() {
    let storage = MemoryStorage::new();
    begin(&storage, ModeId::Weights, DifficultyId::Easy, false);
    let mut game = GameController::new(
        storage.clone(),
        ScaleModel::weights(),
        NullRenderer,
        ModeId::Weights,
        9,
    );
    game.init().unwrap();

    assert_eq!(
        game.handle_submit().unwrap(),
        GuessOutcome::Rejected {
            reason: GuessRejection::NothingPlaced
        }
    );

    let mut left = game.current_animal().unwrap().weight;
    for piece in [1000, 500, 200, 100, 50, 20, 10, 5, 2, 1] {
        while left >= piece && game.extractor_mut().place(&piece.to_string()).is_ok() {
            left -= piece;
        }
    }
    assert!(matches!(
        game.handle_submit().unwrap(),
        GuessOutcome::Correct { points: 10, .. }
    ));
    assert!(game.extractor_mut().is_empty());
}

#[test]
fn page_for_another_mode_sends_player_back() {
    let storage = MemoryStorage::new();
    begin(&storage, ModeId::Animals, DifficultyId::Easy, false);
    let mut game = GameController::new(
        storage.clone(),
        TypedGuess::default(),
        NullRenderer,
        ModeId::Input,
        1,
    );
    assert_eq!(
        game.init().unwrap(),
        InitOutcome::ModeMismatch {
            stored: ModeId::Animals
        }
    );
    assert!(storage.contains(SESSION_KEY));
}

#[test]
fn corrupt_session_means_no_session() {
    let storage = MemoryStorage::new();
    storage.write(SESSION_KEY, "{\"playerName\":").unwrap();
    let mut game = GameController::new(
        storage,
        TypedGuess::default(),
        NullRenderer,
        ModeId::Input,
        1,
    );
    assert_eq!(game.init().unwrap(), InitOutcome::NoSession);
}
