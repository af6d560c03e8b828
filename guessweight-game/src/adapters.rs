//! Seams between the round engine and whatever presents it.
//!
//! Each play mode supplies a [`GuessExtractor`] (typed text, a scale of weight
//! pieces, a scale of reference animals) and a [`RoundRenderer`]. The engine
//! itself never touches the page.
use serde::Serialize;

use crate::catalog::{Animal, ModeId};
use crate::scoring::{GuessDirection, ScoreBreakdown};
use crate::session::RoundState;

/// Why a submission was refused before judging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
pub enum GuessRejection {
    #[error("Enter a number")]
    NotANumber,
    #[error("Weight must be greater than zero")]
    NonPositive,
    #[error("Place something on the scale first")]
    NothingPlaced,
}

/// Feedback line shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Hint {
    Correct { name: &'static str, weight: u32 },
    Wrong { direction: GuessDirection },
    TimeUp,
    OutOfAttempts,
    NewLevel,
    Rejected { reason: GuessRejection },
}

impl Hint {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Correct { name, weight } => format!("Correct! {name} weighs about {weight} kg."),
            Self::Wrong {
                direction: GuessDirection::TooHigh,
            } => "Too heavy! Try less.".to_string(),
            Self::Wrong {
                direction: GuessDirection::TooLow,
            } => "Too light! Try more.".to_string(),
            Self::TimeUp => "Time is up. Attempt spent.".to_string(),
            Self::OutOfAttempts => "No attempts left.".to_string(),
            Self::NewLevel => "New level!".to_string(),
            Self::Rejected { reason } => reason.to_string(),
        }
    }
}

/// Reads the player's current guess from the mode's input surface.
pub trait GuessExtractor {
    /// # Errors
    ///
    /// Returns a [`GuessRejection`] when there is no usable guess.
    fn extract_guess(&mut self) -> Result<f64, GuessRejection>;

    /// Reset the input surface after a judged submission.
    fn clear(&mut self) {}
}

/// Receives round events. Every hook defaults to doing nothing.
pub trait RoundRenderer {
    fn on_init(&mut self, _state: &RoundState) {}

    fn on_round_start(&mut self, _animal: &'static Animal, _state: &RoundState) {}

    fn on_clear_input(&mut self) {}

    fn on_mode_mismatch(&mut self, _stored: ModeId) {}

    /// Seconds left, or `None` for untimed sessions.
    fn on_tick(&mut self, _remaining: Option<u32>) {}

    fn on_hint(&mut self, _hint: &Hint) {}

    fn on_level_complete(
        &mut self,
        _state: &RoundState,
        _score: &ScoreBreakdown,
        _can_continue: bool,
    ) {
    }

    fn on_lost(&mut self, _state: &RoundState, _score: &ScoreBreakdown) {}
}

/// Renderer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl RoundRenderer for NullRenderer {}

/// Free-text numeric input.
#[derive(Debug, Clone, Default)]
pub struct TypedGuess {
    text: String,
}

impl TypedGuess {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Parse trimmed text as a positive number.
///
/// # Errors
///
/// Rejects non-numeric, non-finite and non-positive input.
pub fn parse_guess(text: &str) -> Result<f64, GuessRejection> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| GuessRejection::NotANumber)?;
    check_guess(value)
}

/// Accept only finite, positive weights.
///
/// # Errors
///
/// Returns [`GuessRejection::NotANumber`] for NaN or infinity and
/// [`GuessRejection::NonPositive`] for zero or less.
pub fn check_guess(value: f64) -> Result<f64, GuessRejection> {
    if !value.is_finite() {
        return Err(GuessRejection::NotANumber);
    }
    if value <= 0.0 {
        return Err(GuessRejection::NonPositive);
    }
    Ok(value)
}

impl GuessExtractor for TypedGuess {
    fn extract_guess(&mut self) -> Result<f64, GuessRejection> {
        parse_guess(&self.text)
    }

    fn clear(&mut self) {
        self.text.clear();
    }
}

impl<T: GuessExtractor + ?Sized> GuessExtractor for &mut T {
    fn extract_guess(&mut self) -> Result<f64, GuessRejection> {
        (**self).extract_guess()
    }

    fn clear(&mut self) {
        (**self).clear();
    }
}

impl<T: RoundRenderer + ?Sized> RoundRenderer for &mut T {
    fn on_init(&mut self, state: &RoundState) {
        (**self).on_init(state);
    }

    fn on_round_start(&mut self, animal: &'static Animal, state: &RoundState) {
        (**self).on_round_start(animal, state);
    }

    fn on_clear_input(&mut self) {
        (**self).on_clear_input();
    }

    fn on_mode_mismatch(&mut self, stored: ModeId) {
        (**self).on_mode_mismatch(stored);
    }

    fn on_tick(&mut self, remaining: Option<u32>) {
        (**self).on_tick(remaining);
    }

    fn on_hint(&mut self, hint: &Hint) {
        (**self).on_hint(hint);
    }

    fn on_level_complete(
        &mut self,
        state: &RoundState,
        score: &ScoreBreakdown,
        can_continue: bool,
    ) {
        (**self).on_level_complete(state, score, can_continue);
    }

    fn on_lost(&mut self, state: &RoundState, score: &ScoreBreakdown) {
        (**self).on_lost(state, score);
    }
}
