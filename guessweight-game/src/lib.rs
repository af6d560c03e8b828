//! GuessWeight Game Engine
//!
//! Platform-agnostic core for the GuessWeight animal weight quiz: the content
//! catalog, level generation, countdown, round state machine, scoring and the
//! persistent leaderboard. Presentation layers plug in through the
//! [`GuessExtractor`] and [`RoundRenderer`] traits and a [`GameStorage`] backend.

pub mod adapters;
pub mod catalog;
pub mod constants;
pub mod controller;
pub mod error;
pub mod leaderboard;
pub mod level;
pub mod scale;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod storage;
pub mod timer;

// Re-export commonly used types
pub use adapters::{
    GuessExtractor, GuessRejection, Hint, NullRenderer, RoundRenderer, TypedGuess, check_guess,
};
pub use catalog::{
    ANIMALS, Animal, DIFFICULTIES, DifficultyId, DifficultyTier, MODES, Mode, ModeId,
    WEIGHT_PIECES, WeightPiece, animal_by_id,
};
pub use controller::{GameController, GamePhase, GuessOutcome, InitOutcome};
pub use error::GameError;
pub use leaderboard::{LeaderboardEntry, LeaderboardStore, seed_entries};
pub use level::{LevelSelection, select_level};
pub use scale::{ScaleError, ScaleModel};
pub use scoring::{GuessDirection, GuessVerdict, ScoreBreakdown, final_score, judge_guess};
pub use session::{RoundState, SessionSetup, SessionStore, new_session};
pub use settings::MenuSettings;
pub use storage::MemoryStorage;
pub use timer::{Countdown, TimerEvent, TimerToken, format_clock};

/// String key/value persistence contract.
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete the value under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

impl<T: GameStorage + ?Sized> GameStorage for &T {
    type Error = T::Error;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("disk on fire")
        }
    }

    impl std::error::Error for Broken {}

    struct FailingStorage;

    impl GameStorage for FailingStorage {
        type Error = Broken;

        fn read(&self, _key: &str) -> Result<Option<String>, Self::Error> {
            Err(Broken)
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), Self::Error> {
            Err(Broken)
        }

        fn remove(&self, _key: &str) -> Result<(), Self::Error> {
            Err(Broken)
        }
    }

    #[test]
    fn backend_failures_surface_as_storage_errors() {
        let store = LeaderboardStore::new(FailingStorage);
        let err = store.load().unwrap_err();
        assert!(matches!(err, GameError::Storage(ref msg) if msg == "disk on fire"));
    }

    #[test]
    fn borrowed_storage_shares_records() {
        let storage = MemoryStorage::new();
        let store = LeaderboardStore::new(&storage);
        store.ensure_seeded().unwrap();
        assert!(storage.contains(constants::LEADERBOARD_KEY));
    }
}
