//! Browser shell for GuessWeight.
//!
//! Pages keep their own markup and call into the round engine through the
//! exports in [`bridge`]; persistence goes to `localStorage`.
#![forbid(unsafe_code)]
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod bridge;
pub mod callbacks;
pub mod dom;
pub mod handoff;
pub mod storage;

pub use bridge::GameHandle;
pub use storage::{WebStorage, WebStorageError};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    if let Err(err) = guessweight_game::LeaderboardStore::new(WebStorage).ensure_seeded() {
        dom::console_error(&format!("leaderboard unavailable: {err}"));
    }
}
