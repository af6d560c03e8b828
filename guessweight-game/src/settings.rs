//! Menu choices remembered between visits.
use serde::{Deserialize, Serialize};

use crate::GameStorage;
use crate::catalog::{DifficultyId, ModeId};
use crate::constants::SETTINGS_KEY;
use crate::error::GameError;
use crate::storage::{read_json, write_json};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuSettings {
    pub player_name: String,
    pub difficulty: DifficultyId,
    pub timed: bool,
    pub mode: ModeId,
}

impl MenuSettings {
    /// Stored settings, or defaults when none are saved or the record is corrupt.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn load<S: GameStorage + ?Sized>(storage: &S) -> Result<Self, GameError> {
        Ok(read_json(storage, SETTINGS_KEY)?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub fn save<S: GameStorage + ?Sized>(&self, storage: &S) -> Result<(), GameError> {
        write_json(storage, SETTINGS_KEY, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let storage = MemoryStorage::new();
        let settings = MenuSettings::load(&storage).unwrap();
        assert_eq!(settings.difficulty, DifficultyId::Easy);
        assert_eq!(settings.mode, ModeId::Weights);
        assert!(!settings.timed);
    }

    #[test]
    fn saved_settings_are_restored() {
        let storage = MemoryStorage::new();
        let settings = MenuSettings {
            player_name: "Fay".into(),
            difficulty: DifficultyId::Hard,
            timed: true,
            mode: ModeId::Input,
        };
        settings.save(&storage).unwrap();
        assert_eq!(MenuSettings::load(&storage).unwrap(), settings);
    }

    #[test]
    fn partial_record_fills_missing_fields() {
        let storage = MemoryStorage::new();
        storage.write(SETTINGS_KEY, r#"{"playerName":"Gus"}"#).unwrap();
        let settings = MenuSettings::load(&storage).unwrap();
        assert_eq!(settings.player_name, "Gus");
        assert_eq!(settings.difficulty, DifficultyId::Easy);
    }
}
