//! Query-string payloads passed between pages.
//!
//! Both `?state=` (a session to resume) and `?result=` (a finished entry for
//! the leaderboard page) carry `base64(encodeURIComponent(JSON))`.
use guessweight_game::{LeaderboardEntry, RoundState};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::dom;

pub const STATE_PARAM: &str = "state";
pub const RESULT_PARAM: &str = "result";
pub const LEADERBOARD_PAGE: &str = "leaderboard.html";
pub const MENU_PAGE: &str = "menu.html";

#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn window() -> Result<web_sys::Window, HandoffError> {
    dom::window().ok_or_else(|| HandoffError::Encoding("window unavailable".into()))
}

/// # Errors
///
/// Returns an error if the value cannot be serialized or base64-encoded.
pub fn encode_payload<T: Serialize>(value: &T) -> Result<String, HandoffError> {
    let json = serde_json::to_string(value)?;
    let escaped: String = js_sys::encode_uri_component(&json).into();
    window()?
        .btoa(&escaped)
        .map_err(|e| HandoffError::Encoding(dom::js_error_message(&e)))
}

/// # Errors
///
/// Returns an error if the payload is not valid base64, URI escaping or JSON.
pub fn decode_payload<T: DeserializeOwned>(encoded: &str) -> Result<T, HandoffError> {
    let escaped = window()?
        .atob(encoded)
        .map_err(|e| HandoffError::Encoding(dom::js_error_message(&e)))?;
    let json: String = js_sys::decode_uri_component(&escaped)
        .map_err(|e| HandoffError::Encoding(dom::js_error_message(&e)))?
        .into();
    Ok(serde_json::from_str(&json)?)
}

/// Session carried in `?state=`, if present and readable.
#[must_use]
pub fn state_from_url() -> Option<RoundState> {
    let encoded = dom::query_param(STATE_PARAM)?;
    decode_payload(&encoded)
        .inspect_err(|err| log::warn!("ignoring unreadable state payload: {err}"))
        .ok()
}

/// Finished entry carried in `?result=`, if present and readable.
#[must_use]
pub fn result_from_url() -> Option<LeaderboardEntry> {
    let encoded = dom::query_param(RESULT_PARAM)?;
    decode_payload(&encoded)
        .inspect_err(|err| log::warn!("ignoring unreadable result payload: {err}"))
        .ok()
}

/// Leaderboard page URL announcing `entry`.
///
/// # Errors
///
/// Returns an error if the entry cannot be encoded.
pub fn result_url(entry: &LeaderboardEntry) -> Result<String, HandoffError> {
    let encoded = encode_payload(entry)?;
    let escaped: String = js_sys::encode_uri_component(&encoded).into();
    Ok(format!("{LEADERBOARD_PAGE}?{RESULT_PARAM}={escaped}"))
}
