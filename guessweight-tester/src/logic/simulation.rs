//! Drives a [`GameController`] end to end with a scripted player.
use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use guessweight_game::{
    Animal, DifficultyId, GameController, GamePhase, GuessExtractor, GuessOutcome, GuessRejection,
    Hint, InitOutcome, LeaderboardEntry, LeaderboardStore, MemoryStorage, ModeId, RoundRenderer,
    RoundState, ScaleModel, ScoreBreakdown, SessionSetup, SessionStore, TimerEvent, TypedGuess,
    format_clock,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use super::policy::{GameplayStrategy, PlayerAction, PlayerPolicy};

pub const SIMULATED_PLAYER: &str = "Autoplayer";
/// Hard stop for runaway loops; a full three-tier climb needs far fewer.
const MAX_TURNS: u32 = 500;

/// Declarative plan for running a simulation session.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub mode: ModeId,
    pub strategy: GameplayStrategy,
    pub difficulty: DifficultyId,
    pub timed: bool,
    /// Levels to play before stopping; `None` climbs as far as the run goes.
    pub max_levels: Option<u32>,
    pub save: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(mode: ModeId, strategy: GameplayStrategy) -> Self {
        Self {
            mode,
            strategy,
            difficulty: DifficultyId::Easy,
            timed: false,
            max_levels: None,
            save: true,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn starting_at(mut self, difficulty: DifficultyId) -> Self {
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub const fn timed(mut self) -> Self {
        self.timed = true;
        self
    }

    #[must_use]
    pub const fn with_max_levels(mut self, levels: u32) -> Self {
        self.max_levels = Some(levels);
        self
    }

    #[must_use]
    pub const fn without_saving(mut self) -> Self {
        self.save = false;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// # Errors
    ///
    /// Returns the first violated expectation.
    pub fn check(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// Animals and reference rack of one played level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRecord {
    pub difficulty: DifficultyId,
    pub animals: Vec<String>,
    pub weight_animals: Vec<String>,
}

/// Everything a run produced, for expectations and reports.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub mode: ModeId,
    pub strategy: GameplayStrategy,
    pub timed: bool,
    pub final_phase: GamePhase,
    /// Session as it stood when the run ended, before saving or exiting.
    pub final_state: RoundState,
    pub final_score: u32,
    pub levels: Vec<LevelRecord>,
    pub levels_cleared: u32,
    pub guesses: u32,
    pub correct: u32,
    pub timeouts: u32,
    pub rejected: u32,
    pub ticks: u32,
    pub events: EventLog,
    pub saved_entry: Option<LeaderboardEntry>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub session_cleared: bool,
}

/// Renderer that keeps a tally of what the page would have shown.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub inits: u32,
    pub rounds_started: u32,
    pub inputs_cleared: u32,
    pub hints: BTreeMap<String, u32>,
    pub clock_labels: Vec<String>,
    pub level_complete_screens: u32,
    pub lost_screens: u32,
}

impl EventLog {
    #[must_use]
    pub fn hint_count(&self, kind: &str) -> u32 {
        self.hints.get(kind).copied().unwrap_or(0)
    }
}

impl RoundRenderer for EventLog {
    fn on_init(&mut self, _state: &RoundState) {
        self.inits += 1;
    }

    fn on_round_start(&mut self, _animal: &'static Animal, _state: &RoundState) {
        self.rounds_started += 1;
    }

    fn on_clear_input(&mut self) {
        self.inputs_cleared += 1;
    }

    fn on_tick(&mut self, remaining: Option<u32>) {
        if let Some(seconds) = remaining {
            self.clock_labels.push(format_clock(seconds));
        }
    }

    fn on_hint(&mut self, hint: &Hint) {
        let kind = match hint {
            Hint::Correct { .. } => "correct",
            Hint::Wrong { .. } => "wrong",
            Hint::TimeUp => "timeUp",
            Hint::OutOfAttempts => "outOfAttempts",
            Hint::NewLevel => "newLevel",
            Hint::Rejected { .. } => "rejected",
        };
        *self.hints.entry(kind.to_string()).or_default() += 1;
    }

    fn on_level_complete(
        &mut self,
        _state: &RoundState,
        _score: &ScoreBreakdown,
        _can_continue: bool,
    ) {
        self.level_complete_screens += 1;
    }

    fn on_lost(&mut self, _state: &RoundState, _score: &ScoreBreakdown) {
        self.lost_screens += 1;
    }
}

/// Input surface matching the page for a mode.
#[derive(Debug, Clone)]
pub enum SimulatedInput {
    Typed(TypedGuess),
    Scale(ScaleModel),
}

impl SimulatedInput {
    fn for_mode(mode: ModeId, weight_animals: &[String]) -> Self {
        ScaleModel::for_mode(mode, weight_animals)
            .map_or_else(|| Self::Typed(TypedGuess::default()), Self::Scale)
    }

    /// Enter `value`, or the closest load the rack can make.
    fn enter(&mut self, value: f64) {
        match self {
            Self::Typed(input) => input.set_text(value.to_string()),
            Self::Scale(scale) => load_closest(scale, value),
        }
    }
}

impl GuessExtractor for SimulatedInput {
    fn extract_guess(&mut self) -> Result<f64, GuessRejection> {
        match self {
            Self::Typed(input) => input.extract_guess(),
            Self::Scale(scale) => scale.extract_guess(),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Typed(input) => input.clear(),
            Self::Scale(scale) => scale.clear(),
        }
    }
}

/// Place items so the total lands as close to `value` as the rack allows
/// without running past the upper tolerance edge.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn load_closest(scale: &mut ScaleModel, value: f64) {
    scale.clear();
    let target = value.round().max(0.0) as u64;
    let ceiling = target + target / 10 + 1;

    // Reachable total -> (previous total, slot that was added).
    let mut reach: BTreeMap<u64, Option<(u64, usize)>> = BTreeMap::from([(0, None)]);
    for (index, slot) in scale.slots().iter().enumerate() {
        for _ in 0..slot.supply {
            let snapshot: Vec<u64> = reach.keys().copied().collect();
            for sum in snapshot {
                let next = sum + u64::from(slot.mass);
                if next <= ceiling {
                    reach.entry(next).or_insert(Some((sum, index)));
                }
            }
        }
    }

    let Some(mut best) = reach.keys().copied().min_by_key(|sum| sum.abs_diff(target)) else {
        return;
    };
    let keys: Vec<String> = scale.slots().iter().map(|slot| slot.key.clone()).collect();
    while let Some(Some((previous, index))) = reach.get(&best) {
        if let Err(err) = scale.place(&keys[*index]) {
            log::warn!("could not load the scale: {err}");
            return;
        }
        best = *previous;
    }
}

/// Runs simulation plans against an in-memory browser stand-in.
pub struct Simulator {
    verbose: bool,
}

type SimulatedGame = GameController<MemoryStorage, SimulatedInput, EventLog>;

#[derive(Default)]
struct Tally {
    levels: Vec<LevelRecord>,
    levels_cleared: u32,
    guesses: u32,
    correct: u32,
    timeouts: u32,
    rejected: u32,
    ticks: u32,
}

impl Simulator {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Play one session from the menu to the leaderboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the controller refuses a move the run expects to be legal.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let storage = MemoryStorage::new();
        let leaderboard = LeaderboardStore::new(storage.clone());
        leaderboard.ensure_seeded()?;

        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let setup = SessionSetup::new(SIMULATED_PLAYER, plan.mode, plan.difficulty, plan.timed);
        let begun = SessionStore::new(storage.clone()).begin(&setup, &mut rng)?;

        let mut game: SimulatedGame = GameController::new(
            storage.clone(),
            SimulatedInput::for_mode(plan.mode, &begun.weight_animals),
            EventLog::default(),
            plan.mode,
            seed,
        );
        match game.init()? {
            InitOutcome::Resumed { .. } => {}
            other => bail!("fresh session did not resume: {other:?}"),
        }

        let mut policy = plan.strategy.create_policy(seed);
        let mut tally = Tally::default();
        record_level(&game, &mut tally)?;

        let mut turns = 0;
        loop {
            turns += 1;
            if turns > MAX_TURNS {
                bail!("run did not finish within {MAX_TURNS} turns");
            }
            match game.phase() {
                GamePhase::Playing => self.play_turn(&mut game, policy.as_mut(), &mut tally)?,
                GamePhase::LevelComplete => {
                    tally.levels_cleared += 1;
                    let state = game.state().context("level complete without a session")?;
                    let wants_more = plan
                        .max_levels
                        .is_none_or(|limit| tally.levels_cleared < limit);
                    if !(wants_more && state.has_next_tier()) {
                        break;
                    }
                    game.advance_level()?;
                    record_level(&game, &mut tally)?;
                }
                _ => break,
            }
        }

        let final_phase = game.phase();
        let final_state = game.state().cloned().context("run ended without a session")?;
        let final_score = game.compute_final_score()?;
        if self.verbose {
            println!(
                "     ↳ {} finished {:?} on {} with {} points",
                policy.name(),
                final_phase,
                final_state.difficulty,
                final_score
            );
        }

        let saved_entry = if plan.save {
            Some(game.save_and_exit()?)
        } else {
            game.exit_without_saving()?;
            None
        };

        Ok(SimulationSummary {
            seed,
            mode: plan.mode,
            strategy: plan.strategy,
            timed: plan.timed,
            final_phase,
            final_state,
            final_score,
            levels: tally.levels,
            levels_cleared: tally.levels_cleared,
            guesses: tally.guesses,
            correct: tally.correct,
            timeouts: tally.timeouts,
            rejected: tally.rejected,
            ticks: tally.ticks,
            events: game.renderer().clone(),
            saved_entry,
            leaderboard: leaderboard.load()?,
            session_cleared: SessionStore::new(storage).load()?.is_none(),
        })
    }

    fn play_turn(
        &self,
        game: &mut SimulatedGame,
        policy: &mut (dyn PlayerPolicy + Send),
        tally: &mut Tally,
    ) -> Result<()> {
        let state = game.state().context("playing without a session")?;
        let animal = state.current_animal().context("playing without an animal")?;
        let attempts_left = state.attempts_left;
        let rack = state.weight_animals.clone();

        let outcome = match policy.next_action(animal, attempts_left) {
            PlayerAction::Guess(value) => {
                // The reference rack changes between comparison levels.
                let mut input = SimulatedInput::for_mode(game.expected_mode(), &rack);
                input.enter(value);
                *game.extractor_mut() = input;
                tally.guesses += 1;
                match game.handle_submit()? {
                    GuessOutcome::Rejected { reason } => {
                        tally.rejected += 1;
                        if self.verbose {
                            println!("     ↳ {} rejected: {reason}", animal.id);
                        }
                        self.wait_out(game, tally)?
                    }
                    judged => judged,
                }
            }
            PlayerAction::Wait => self.wait_out(game, tally)?,
        };

        if let GuessOutcome::Correct { .. } = outcome {
            tally.correct += 1;
        }
        policy.observe(animal, &outcome);
        Ok(())
    }

    /// Let the countdown expire, or give the attempt up in untimed sessions.
    fn wait_out(&self, game: &mut SimulatedGame, tally: &mut Tally) -> Result<GuessOutcome> {
        tally.timeouts += 1;
        let Some(mut token) = game.timer_token() else {
            return Ok(game.handle_timeout()?);
        };
        loop {
            match game.tick(token)? {
                TimerEvent::Tick(_) => tally.ticks += 1,
                TimerEvent::Expired => break,
                TimerEvent::Ignored => {
                    token = game.timer_token().context("countdown vanished mid-wait")?;
                }
            }
        }
        if self.verbose {
            println!("     ↳ time ran out after {} ticks", tally.ticks);
        }
        let state = game.state().context("timeout without a session")?;
        Ok(if game.phase() == GamePhase::Lost {
            GuessOutcome::Lost
        } else {
            GuessOutcome::Wrong {
                direction: None,
                attempts_left: state.attempts_left,
            }
        })
    }
}

fn record_level(game: &SimulatedGame, tally: &mut Tally) -> Result<()> {
    let state = game.state().context("no session to record")?;
    tally.levels.push(LevelRecord {
        difficulty: state.difficulty,
        animals: state.level_animals.clone(),
        weight_animals: state.weight_animals.clone(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use guessweight_game::{GuessVerdict, judge_guess};

    #[test]
    fn perfect_typed_run_climbs_every_tier() {
        let plan = SimulationPlan::new(ModeId::Input, GameplayStrategy::Perfect);
        let summary = Simulator::new(false).run_plan(&plan, 1).unwrap();
        assert_eq!(summary.levels_cleared, 3);
        assert_eq!(summary.final_state.difficulty, DifficultyId::Hard);
        assert_eq!(summary.final_score, 50 * 3 * 5);
        assert_eq!(summary.saved_entry.as_ref().unwrap().score, 750);
        assert!(summary.session_cleared);
    }

    #[test]
    fn idle_timed_run_hears_the_clock() {
        let plan = SimulationPlan::new(ModeId::Input, GameplayStrategy::Idle)
            .starting_at(DifficultyId::Hard)
            .timed()
            .without_saving();
        let summary = Simulator::new(false).run_plan(&plan, 3).unwrap();
        assert_eq!(summary.final_phase, GamePhase::Lost);
        assert_eq!(summary.timeouts, 3);
        assert_eq!(summary.ticks, 3 * 30);
        assert_eq!(
            summary.events.clock_labels.first().map(String::as_str),
            Some("00:29")
        );
        assert!(summary.saved_entry.is_none());
    }

    #[test]
    fn closest_load_lands_in_band_for_weight_pieces() {
        let mut scale = ScaleModel::weights();
        for animal in &guessweight_game::ANIMALS {
            load_closest(&mut scale, f64::from(animal.weight));
            assert_eq!(scale.total(), animal.weight, "{}", animal.id);
        }
    }

    #[test]
    fn closest_load_never_overshoots_the_band() {
        let mut scale = ScaleModel::animals(&["moose", "wolf"]);
        load_closest(&mut scale, 100.0);
        assert_eq!(scale.total(), 90);
        assert_eq!(
            judge_guess(100, f64::from(scale.total())),
            GuessVerdict::Correct
        );
    }
}
