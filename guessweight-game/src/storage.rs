//! JSON record helpers over a [`GameStorage`] backend, plus an in-memory backend.
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use crate::GameStorage;
use crate::error::GameError;

/// Read and decode a JSON record.
///
/// A record that fails to decode is treated as absent: corrupt browser storage
/// must send the player back to the menu, never crash the page.
///
/// # Errors
///
/// Returns an error only if the backend itself fails to read.
pub fn read_json<S, T>(storage: &S, key: &str) -> Result<Option<T>, GameError>
where
    S: GameStorage + ?Sized,
    T: DeserializeOwned,
{
    let Some(raw) = storage.read(key).map_err(GameError::storage)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            log::warn!("discarding malformed record '{key}': {err}");
            Ok(None)
        }
    }
}

/// Encode and write a JSON record.
///
/// # Errors
///
/// Returns an error if encoding fails or the backend rejects the write.
pub fn write_json<S, T>(storage: &S, key: &str, value: &T) -> Result<(), GameError>
where
    S: GameStorage + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    storage.write(key, &raw).map_err(GameError::storage)
}

/// Remove a record; removing a missing key is not an error.
///
/// # Errors
///
/// Returns an error if the backend fails.
pub fn remove_record<S>(storage: &S, key: &str) -> Result<(), GameError>
where
    S: GameStorage + ?Sized,
{
    storage.remove(key).map_err(GameError::storage)
}

/// Shared in-memory key/value store. Clones see the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.records.borrow().contains_key(key)
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.records.borrow().get(key).cloned()
    }
}

impl GameStorage for MemoryStorage {
    type Error = Infallible;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.records.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.records.borrow_mut().remove(key);
        Ok(())
    }
}
