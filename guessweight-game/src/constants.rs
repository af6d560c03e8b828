//! Centralized balance and tuning constants for GuessWeight game logic.
//!
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Storage keys -------------------------------------------------------------
pub const SESSION_KEY: &str = "gw_state";
pub const LEADERBOARD_KEY: &str = "gw_leaderboard";
pub const SETTINGS_KEY: &str = "gw_settings";

// Round shape --------------------------------------------------------------
/// Animals per level.
pub const LEVEL_SIZE: usize = 5;
/// Oldest used-animal entries dropped when the unused pool runs dry.
pub const USED_EVICTION_COUNT: usize = 5;

// Guess judging ------------------------------------------------------------
/// Accepted deviation from the true weight, in percent (inclusive).
pub const GUESS_TOLERANCE_PCT: u32 = 10;
pub const POINTS_PER_ANIMAL: u32 = 10;
pub const PENALTY_PER_FAILED_ATTEMPT: u32 = 2;

// Scoring ------------------------------------------------------------------
pub const TIMED_MULTIPLIER: u32 = 2;
pub const UNTIMED_MULTIPLIER: u32 = 1;

// Leaderboard --------------------------------------------------------------
pub const LEADERBOARD_CAPACITY: usize = 20;

// Comparison mode search ---------------------------------------------------
/// Copies of each reference animal available on the rack.
pub const COMPARISON_MAX_COPIES: u32 = 5;
pub const COMPARISON_MAX_RETRIES: u32 = 100;

// Timer --------------------------------------------------------------------
pub const TICK_SECONDS: u32 = 1;
pub const CLOCK_PLACEHOLDER: &str = "--:--";
