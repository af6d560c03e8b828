//! Guess judging and score arithmetic.
use serde::{Deserialize, Serialize};

use crate::catalog::{DifficultyId, ModeId};
use crate::constants::{
    GUESS_TOLERANCE_PCT, PENALTY_PER_FAILED_ATTEMPT, POINTS_PER_ANIMAL, TIMED_MULTIPLIER,
    UNTIMED_MULTIPLIER,
};

/// Which side of the true weight a wrong guess landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessDirection {
    TooHigh,
    TooLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "direction", rename_all = "lowercase")]
pub enum GuessVerdict {
    Correct,
    Wrong(GuessDirection),
}

/// Judge a guess against the true weight.
///
/// A guess is correct when it lies within the inclusive, symmetric tolerance band
/// around `target`. The comparison is scaled by 100 so the band edges stay exact
/// for integral weights instead of depending on how `0.1` rounds.
#[must_use]
pub fn judge_guess(target: u32, value: f64) -> GuessVerdict {
    let target = f64::from(target);
    let deviation = (target - value).abs();
    if deviation * 100.0 <= target * f64::from(GUESS_TOLERANCE_PCT) {
        GuessVerdict::Correct
    } else if value > target {
        GuessVerdict::Wrong(GuessDirection::TooHigh)
    } else {
        GuessVerdict::Wrong(GuessDirection::TooLow)
    }
}

/// Integer form of the tolerance check, used by the comparison-mode search.
#[must_use]
pub const fn within_tolerance(target: u64, candidate: u64) -> bool {
    target.abs_diff(candidate) * 100 <= target * GUESS_TOLERANCE_PCT as u64
}

/// Points for a correct guess after `failed_attempts` misses on the same animal.
#[must_use]
pub const fn points_for_animal(failed_attempts: u32) -> u32 {
    POINTS_PER_ANIMAL.saturating_sub(failed_attempts.saturating_mul(PENALTY_PER_FAILED_ATTEMPT))
}

/// Inputs to the final score, kept separate so callers can show a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base_score: u32,
    pub tier_multiplier: u32,
    pub timed_multiplier: u32,
    pub mode_modifier: u32,
}

impl ScoreBreakdown {
    #[must_use]
    pub fn new(base_score: u32, highest: DifficultyId, timed: bool, mode: ModeId) -> Self {
        Self {
            base_score,
            tier_multiplier: highest.tier().multiplier,
            timed_multiplier: if timed {
                TIMED_MULTIPLIER
            } else {
                UNTIMED_MULTIPLIER
            },
            mode_modifier: mode.settings().score_modifier,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.base_score
            .saturating_mul(self.tier_multiplier)
            .saturating_mul(self.timed_multiplier)
            .saturating_mul(self.mode_modifier)
    }
}

/// `base × tier multiplier × timed factor × mode modifier`.
#[must_use]
pub fn final_score(base_score: u32, highest: DifficultyId, timed: bool, mode: ModeId) -> u32 {
    ScoreBreakdown::new(base_score, highest, timed, mode).total()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_are_inclusive() {
        assert_eq!(judge_guess(100, 90.0), GuessVerdict::Correct);
        assert_eq!(judge_guess(100, 110.0), GuessVerdict::Correct);
        assert_eq!(judge_guess(45, 40.5), GuessVerdict::Correct);
        assert_eq!(judge_guess(45, 49.5), GuessVerdict::Correct);
    }

    #[test]
    fn just_outside_band_reports_direction() {
        assert_eq!(
            judge_guess(100, 110.01),
            GuessVerdict::Wrong(GuessDirection::TooHigh)
        );
        assert_eq!(
            judge_guess(100, 89.99),
            GuessVerdict::Wrong(GuessDirection::TooLow)
        );
        assert_eq!(
            judge_guess(45, 40.4),
            GuessVerdict::Wrong(GuessDirection::TooLow)
        );
    }

    #[test]
    fn points_decay_with_misses_and_floor_at_zero() {
        assert_eq!(points_for_animal(0), 10);
        assert_eq!(points_for_animal(1), 8);
        assert_eq!(points_for_animal(4), 2);
        assert_eq!(points_for_animal(5), 0);
        assert_eq!(points_for_animal(9), 0);
    }

    #[test]
    fn final_score_multiplies_every_factor() {
        assert_eq!(
            final_score(20, DifficultyId::Hard, true, ModeId::Input),
            600
        );
        assert_eq!(
            final_score(20, DifficultyId::Easy, false, ModeId::Weights),
            20
        );
        assert_eq!(final_score(0, DifficultyId::Hard, true, ModeId::Input), 0);
        let breakdown = ScoreBreakdown::new(7, DifficultyId::Medium, true, ModeId::Animals);
        assert_eq!(breakdown.total(), 7 * 2 * 2 * 3);
    }

    #[test]
    fn integer_tolerance_matches_float_band() {
        assert!(within_tolerance(100, 110));
        assert!(within_tolerance(100, 90));
        assert!(!within_tolerance(100, 111));
        assert!(!within_tolerance(100, 89));
        assert!(within_tolerance(27, 27));
    }
}
