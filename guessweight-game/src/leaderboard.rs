//! Persistent ranked list of finished games.
use serde::{Deserialize, Serialize};

use crate::GameStorage;
use crate::constants::{LEADERBOARD_CAPACITY, LEADERBOARD_KEY};
use crate::error::GameError;
use crate::storage::{read_json, write_json};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    /// Label of the highest tier reached.
    #[serde(rename = "difficulty")]
    pub difficulty_label: String,
    pub timed: bool,
}

impl LeaderboardEntry {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        score: u32,
        difficulty_label: impl Into<String>,
        timed: bool,
    ) -> Self {
        Self {
            name: name.into(),
            score,
            difficulty_label: difficulty_label.into(),
            timed,
        }
    }
}

const SEED_ENTRIES: [(&str, u32, &str, bool); 20] = [
    ("Alice", 68, "Hard", true),
    ("Marco", 64, "Hard", true),
    ("Sonya", 61, "Hard", false),
    ("Kirill", 59, "Hard", true),
    ("Nikita", 56, "Hard", false),
    ("Polina", 54, "Hard", true),
    ("Artem", 52, "Hard", false),
    ("Yana", 50, "Hard", true),
    ("Denis", 47, "Medium", true),
    ("Eva", 46, "Medium", true),
    ("Oleg", 45, "Medium", false),
    ("Roman", 43, "Medium", true),
    ("Irina", 42, "Medium", false),
    ("Dasha", 41, "Medium", true),
    ("Sergey", 39, "Medium", false),
    ("Vika", 36, "Easy", true),
    ("Gleb", 35, "Easy", false),
    ("Liza", 33, "Easy", true),
    ("Maxim", 32, "Easy", false),
    ("Ilya", 30, "Easy", false),
];

/// Default content written the first time the leaderboard is read.
#[must_use]
pub fn seed_entries() -> Vec<LeaderboardEntry> {
    SEED_ENTRIES
        .iter()
        .map(|&(name, score, label, timed)| LeaderboardEntry::new(name, score, label, timed))
        .collect()
}

/// Insert, rank descending by score and trim to capacity.
///
/// The sort is stable, so among equal scores the entry that was on the board
/// first keeps the higher rank.
pub fn insert_ranked(entries: &mut Vec<LeaderboardEntry>, entry: LeaderboardEntry) {
    entries.push(entry);
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(LEADERBOARD_CAPACITY);
}

/// Leaderboard persisted through a [`GameStorage`] backend.
#[derive(Debug, Clone)]
pub struct LeaderboardStore<S> {
    storage: S,
}

impl<S: GameStorage> LeaderboardStore<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Write the seed content if no leaderboard record exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn ensure_seeded(&self) -> Result<(), GameError> {
        let existing = self.storage.read(LEADERBOARD_KEY).map_err(GameError::storage)?;
        if existing.is_none() {
            log::debug!("seeding leaderboard with default entries");
            write_json(&self.storage, LEADERBOARD_KEY, &seed_entries())?;
        }
        Ok(())
    }

    /// Ranked entries, seeding first if needed. A corrupt record reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn load(&self) -> Result<Vec<LeaderboardEntry>, GameError> {
        self.ensure_seeded()?;
        Ok(read_json(&self.storage, LEADERBOARD_KEY)?.unwrap_or_default())
    }

    /// Add an entry and persist the re-ranked, trimmed list.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn append(&self, entry: LeaderboardEntry) -> Result<Vec<LeaderboardEntry>, GameError> {
        let mut entries = self.load()?;
        insert_ranked(&mut entries, entry);
        write_json(&self.storage, LEADERBOARD_KEY, &entries)?;
        Ok(entries)
    }

    /// Like [`Self::append`], but skips an entry identical to one already listed.
    ///
    /// Guards against a results hand-off being replayed by a page reload.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn append_unique(
        &self,
        entry: LeaderboardEntry,
    ) -> Result<Vec<LeaderboardEntry>, GameError> {
        let entries = self.load()?;
        if entries.contains(&entry) {
            return Ok(entries);
        }
        self.append(entry)
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn seeding_happens_once() {
        let storage = MemoryStorage::new();
        let store = LeaderboardStore::new(storage.clone());
        let first = store.load().unwrap();
        assert_eq!(first.len(), LEADERBOARD_CAPACITY);
        assert_eq!(first[0].name, "Alice");

        write_json(&storage, LEADERBOARD_KEY, &Vec::<LeaderboardEntry>::new()).unwrap();
        store.ensure_seeded().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn append_ranks_and_trims() {
        let store = LeaderboardStore::new(MemoryStorage::new());
        let entries = store
            .append(LeaderboardEntry::new("Zed", 600, "Hard", true))
            .unwrap();
        assert_eq!(entries.len(), LEADERBOARD_CAPACITY);
        assert_eq!(entries[0].name, "Zed");
        assert!(entries.iter().all(|e| e.name != "Ilya"));

        let low = store
            .append(LeaderboardEntry::new("Low", 1, "Easy", false))
            .unwrap();
        assert!(low.iter().all(|e| e.name != "Low"));
    }

    #[test]
    fn equal_scores_keep_earlier_entry_first() {
        let mut entries = vec![LeaderboardEntry::new("First", 50, "Easy", false)];
        insert_ranked(
            &mut entries,
            LeaderboardEntry::new("Second", 50, "Easy", false),
        );
        assert_eq!(entries[0].name, "First");
        assert_eq!(entries[1].name, "Second");
    }

    #[test]
    fn append_unique_skips_duplicates() {
        let store = LeaderboardStore::new(MemoryStorage::new());
        let entry = LeaderboardEntry::new("Dup", 100, "Medium", true);
        let once = store.append_unique(entry.clone()).unwrap();
        let twice = store.append_unique(entry).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.iter().filter(|e| e.name == "Dup").count(), 1);
    }

    #[test]
    fn entry_uses_difficulty_key_on_the_wire() {
        let json = serde_json::to_string(&LeaderboardEntry::new("A", 1, "Easy", false)).unwrap();
        assert!(json.contains("\"difficulty\":\"Easy\""));
    }
}
