use std::fmt;

use guessweight_game::{Animal, GuessDirection, GuessOutcome};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// What an automated player does on its turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerAction {
    Guess(f64),
    /// Let the countdown run out (or give up the attempt when untimed).
    Wait,
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Decide the next move for the animal on the scale.
    fn next_action(&mut self, animal: &Animal, attempts_left: u32) -> PlayerAction;

    /// Feedback for the previous action on `animal`.
    fn observe(&mut self, _animal: &Animal, _outcome: &GuessOutcome) {}
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    /// Always names the true weight.
    Perfect,
    /// Narrows a geometric interval using the higher/lower hints.
    Bisect,
    /// Guesses somewhere around the true weight, sometimes outside the band.
    Sloppy,
    /// Never answers.
    Idle,
}

impl GameplayStrategy {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GameplayStrategy::Perfect => "Perfect",
            GameplayStrategy::Bisect => "Bisect",
            GameplayStrategy::Sloppy => "Sloppy",
            GameplayStrategy::Idle => "Idle",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            GameplayStrategy::Perfect => Box::new(PerfectPolicy),
            GameplayStrategy::Bisect => Box::new(BisectPolicy::default()),
            GameplayStrategy::Sloppy => Box::new(SloppyPolicy::new(seed)),
            GameplayStrategy::Idle => Box::new(IdlePolicy),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct PerfectPolicy;
struct IdlePolicy;

impl PlayerPolicy for PerfectPolicy {
    fn name(&self) -> &'static str {
        "Perfect"
    }

    fn next_action(&mut self, animal: &Animal, _attempts_left: u32) -> PlayerAction {
        PlayerAction::Guess(f64::from(animal.weight))
    }
}

impl PlayerPolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn next_action(&mut self, _animal: &Animal, _attempts_left: u32) -> PlayerAction {
        PlayerAction::Wait
    }
}

const BISECT_FLOOR: f64 = 1.0;
const BISECT_CEILING: f64 = 10_000.0;

/// Search bounds for the animal currently being guessed.
#[derive(Default)]
struct BisectPolicy {
    animal: Option<&'static str>,
    low: f64,
    high: f64,
    last_guess: f64,
}

impl BisectPolicy {
    fn reset_for(&mut self, animal: &Animal) {
        if self.animal != Some(animal.id) {
            self.animal = Some(animal.id);
            self.low = BISECT_FLOOR;
            self.high = BISECT_CEILING;
        }
    }
}

impl PlayerPolicy for BisectPolicy {
    fn name(&self) -> &'static str {
        "Bisect"
    }

    fn next_action(&mut self, animal: &Animal, _attempts_left: u32) -> PlayerAction {
        self.reset_for(animal);
        // Geometric midpoint: the tolerance band is relative.
        self.last_guess = (self.low * self.high).sqrt().round().max(BISECT_FLOOR);
        PlayerAction::Guess(self.last_guess)
    }

    fn observe(&mut self, animal: &Animal, outcome: &GuessOutcome) {
        if self.animal != Some(animal.id) {
            return;
        }
        match outcome {
            GuessOutcome::Wrong {
                direction: Some(GuessDirection::TooHigh),
                ..
            } => self.high = self.last_guess,
            GuessOutcome::Wrong {
                direction: Some(GuessDirection::TooLow),
                ..
            } => self.low = self.last_guess,
            GuessOutcome::Correct { .. } | GuessOutcome::Lost => self.animal = None,
            _ => {}
        }
    }
}

struct SloppyPolicy {
    rng: ChaCha20Rng,
}

impl SloppyPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerPolicy for SloppyPolicy {
    fn name(&self) -> &'static str {
        "Sloppy"
    }

    fn next_action(&mut self, animal: &Animal, _attempts_left: u32) -> PlayerAction {
        let factor = self.rng.gen_range(0.6..=1.4);
        PlayerAction::Guess((f64::from(animal.weight) * factor).max(BISECT_FLOOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guessweight_game::{GuessVerdict, animal_by_id, judge_guess};

    #[test]
    fn perfect_policy_names_the_true_weight() {
        let moose = animal_by_id("moose").unwrap();
        let mut policy = GameplayStrategy::Perfect.create_policy(0);
        assert_eq!(policy.next_action(moose, 3), PlayerAction::Guess(408.0));
    }

    #[test]
    fn idle_policy_always_waits() {
        let fox = animal_by_id("fox").unwrap();
        let mut policy = GameplayStrategy::Idle.create_policy(0);
        assert_eq!(policy.next_action(fox, 5), PlayerAction::Wait);
        assert_eq!(policy.name(), "Idle");
    }

    #[test]
    fn bisect_converges_on_every_animal_within_a_dozen_hints() {
        for animal in &guessweight_game::ANIMALS {
            let mut policy = GameplayStrategy::Bisect.create_policy(0);
            let mut solved = false;
            for _ in 0..12 {
                let PlayerAction::Guess(value) = policy.next_action(animal, 5) else {
                    panic!("bisect never waits");
                };
                let outcome = match judge_guess(animal.weight, value) {
                    GuessVerdict::Correct => {
                        solved = true;
                        break;
                    }
                    GuessVerdict::Wrong(direction) => GuessOutcome::Wrong {
                        direction: Some(direction),
                        attempts_left: 5,
                    },
                };
                policy.observe(animal, &outcome);
            }
            assert!(solved, "bisect failed on {}", animal.id);
        }
    }

    #[test]
    fn sloppy_policy_is_reproducible_per_seed() {
        let wolf = animal_by_id("wolf").unwrap();
        let mut first = GameplayStrategy::Sloppy.create_policy(7);
        let mut second = GameplayStrategy::Sloppy.create_policy(7);
        for _ in 0..5 {
            assert_eq!(first.next_action(wolf, 4), second.next_action(wolf, 4));
        }
    }

    #[test]
    fn strategy_display_uses_label() {
        assert_eq!(GameplayStrategy::Bisect.to_string(), "Bisect");
    }
}
