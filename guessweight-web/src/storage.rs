//! `localStorage` backend for the core [`GameStorage`] contract.
use guessweight_game::GameStorage;

use crate::dom;

/// Web-specific game storage using localStorage
#[derive(Debug, Clone, Copy, Default)]
pub struct WebStorage;

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WebStorageError {
    fn from_js(value: &wasm_bindgen::JsValue) -> Self {
        Self::Storage(dom::js_error_message(value))
    }
}

impl GameStorage for WebStorage {
    type Error = WebStorageError;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let storage = dom::local_storage().map_err(|e| WebStorageError::from_js(&e))?;
        storage.get_item(key).map_err(|e| WebStorageError::from_js(&e))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let storage = dom::local_storage().map_err(|e| WebStorageError::from_js(&e))?;
        storage
            .set_item(key, value)
            .map_err(|e| WebStorageError::from_js(&e))
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        let storage = dom::local_storage().map_err(|e| WebStorageError::from_js(&e))?;
        storage
            .remove_item(key)
            .map_err(|e| WebStorageError::from_js(&e))
    }
}
