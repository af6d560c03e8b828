//! Persisted round state and session creation.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::GameStorage;
use crate::catalog::{Animal, DifficultyId, DifficultyTier, ModeId, animal_by_id};
use crate::constants::{LEVEL_SIZE, SESSION_KEY};
use crate::error::GameError;
use crate::level::select_level;
use crate::settings::MenuSettings;
use crate::storage::{read_json, remove_record, write_json};

/// Everything needed to resume a game, stored as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    pub player_name: String,
    /// Absent in sessions created before modes existed; adopted on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ModeId>,
    pub difficulty: DifficultyId,
    pub highest_difficulty: DifficultyId,
    pub time_mode: bool,
    pub base_score: u32,
    pub current_index: usize,
    pub level_animals: Vec<String>,
    pub used_animals: Vec<String>,
    pub attempts_left: u32,
    pub failed_attempts_current: u32,
    pub completed_animals: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weight_animals: Vec<String>,
}

impl RoundState {
    #[must_use]
    pub fn tier(&self) -> &'static DifficultyTier {
        self.difficulty.tier()
    }

    /// The animal being guessed, or `None` once the level is finished.
    #[must_use]
    pub fn current_animal(&self) -> Option<&'static Animal> {
        self.level_animals
            .get(self.current_index)
            .and_then(|id| animal_by_id(id))
    }

    #[must_use]
    pub const fn is_lost(&self) -> bool {
        self.attempts_left == 0
    }

    #[must_use]
    pub fn is_level_complete(&self) -> bool {
        self.current_index >= self.level_animals.len()
    }

    /// Whether a finished level can continue on a harder tier.
    #[must_use]
    pub const fn has_next_tier(&self) -> bool {
        self.difficulty.next().is_some()
    }

    /// Reference animals resolved against the catalog.
    #[must_use]
    pub fn weight_animal_refs(&self) -> Vec<&'static Animal> {
        self.weight_animals
            .iter()
            .filter_map(|id| animal_by_id(id))
            .collect()
    }

    /// Structural sanity check for state read back from storage.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        !self.player_name.trim().is_empty()
            && !self.level_animals.is_empty()
            && self.current_index <= self.level_animals.len()
            && self.highest_difficulty >= self.difficulty
            && self.attempts_left <= self.tier().attempts
            && self.level_animals.iter().all(|id| animal_by_id(id).is_some())
            && self.weight_animals.iter().all(|id| animal_by_id(id).is_some())
    }
}

/// Choices made on the menu screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSetup {
    pub player_name: String,
    pub mode: ModeId,
    pub difficulty: DifficultyId,
    pub timed: bool,
}

impl SessionSetup {
    #[must_use]
    pub fn new(
        player_name: impl Into<String>,
        mode: ModeId,
        difficulty: DifficultyId,
        timed: bool,
    ) -> Self {
        Self {
            player_name: player_name.into(),
            mode,
            difficulty,
            timed,
        }
    }
}

impl From<&SessionSetup> for MenuSettings {
    fn from(setup: &SessionSetup) -> Self {
        Self {
            player_name: setup.player_name.trim().to_string(),
            difficulty: setup.difficulty,
            timed: setup.timed,
            mode: setup.mode,
        }
    }
}

/// Build the opening state for a new game.
///
/// # Errors
///
/// Returns [`GameError::EmptyPlayerName`] if the trimmed name is empty.
pub fn new_session<R: Rng + ?Sized>(
    setup: &SessionSetup,
    rng: &mut R,
) -> Result<RoundState, GameError> {
    let player_name = setup.player_name.trim();
    if player_name.is_empty() {
        return Err(GameError::EmptyPlayerName);
    }
    let level = select_level(setup.mode, &[], LEVEL_SIZE, rng);
    log::debug!(
        "new {} session for '{player_name}' at {} (timed: {})",
        setup.mode,
        setup.difficulty,
        setup.timed
    );
    Ok(RoundState {
        player_name: player_name.to_string(),
        mode: Some(setup.mode),
        difficulty: setup.difficulty,
        highest_difficulty: setup.difficulty,
        time_mode: setup.timed,
        base_score: 0,
        current_index: 0,
        level_animals: level.level_animals,
        used_animals: level.used_animals,
        attempts_left: setup.difficulty.tier().attempts,
        failed_attempts_current: 0,
        completed_animals: 0,
        weight_animals: level.weight_animals,
    })
}

/// The single active session record.
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    storage: S,
}

impl<S: GameStorage> SessionStore<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a session from menu choices, persist it and remember the choices.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or the backend fails.
    pub fn begin<R: Rng + ?Sized>(
        &self,
        setup: &SessionSetup,
        rng: &mut R,
    ) -> Result<RoundState, GameError> {
        let state = new_session(setup, rng)?;
        self.save(&state)?;
        MenuSettings::from(setup).save(&self.storage)?;
        Ok(state)
    }

    /// Stored session, or `None` when it is missing, malformed or inconsistent.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself fails.
    pub fn load(&self) -> Result<Option<RoundState>, GameError> {
        let state: Option<RoundState> = read_json(&self.storage, SESSION_KEY)?;
        Ok(state.filter(|state| {
            let ok = state.is_consistent();
            if !ok {
                log::warn!("discarding inconsistent session record");
            }
            ok
        }))
    }

    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub fn save(&self, state: &RoundState) -> Result<(), GameError> {
        write_json(&self.storage, SESSION_KEY, state)
    }

    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn clear(&self) -> Result<(), GameError> {
        remove_record(&self.storage, SESSION_KEY)
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }
}
