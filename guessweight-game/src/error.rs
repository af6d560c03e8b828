//! Error types surfaced by the game engine.
use crate::controller::GamePhase;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Player name must not be empty")]
    EmptyPlayerName,
    #[error("No active session")]
    NoSession,
    #[error("'{operation}' is not allowed while {phase:?}")]
    InvalidPhase {
        operation: &'static str,
        phase: GamePhase,
    },
    #[error("Already at the hardest tier")]
    NoNextTier,
}

impl GameError {
    /// Wrap any storage backend failure.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}
