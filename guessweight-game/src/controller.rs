//! Round state machine.
//!
//! `Loading → Playing → {LevelComplete, Lost} → {Playing at the next tier, Saved, Exited}`.
//! Every mutating transition writes the session back to storage before any
//! presentation hook runs.
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

use crate::GameStorage;
use crate::adapters::{GuessExtractor, GuessRejection, Hint, RoundRenderer, check_guess};
use crate::catalog::{Animal, ModeId};
use crate::constants::LEVEL_SIZE;
use crate::error::GameError;
use crate::leaderboard::{LeaderboardEntry, LeaderboardStore};
use crate::level::select_level;
use crate::scoring::{GuessDirection, GuessVerdict, ScoreBreakdown, judge_guess, points_for_animal};
use crate::session::{RoundState, SessionStore};
use crate::timer::{Countdown, TimerEvent, TimerToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    Loading,
    Playing,
    LevelComplete,
    Lost,
    Saved,
    Exited,
}

impl GamePhase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Saved | Self::Exited)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum InitOutcome {
    /// Nothing usable in storage; the host should return to the menu.
    NoSession,
    /// The stored session belongs to another page.
    ModeMismatch { stored: ModeId },
    Resumed { phase: GamePhase },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum GuessOutcome {
    /// Input refused before judging; nothing changed.
    Rejected { reason: GuessRejection },
    Correct { points: u32, level_complete: bool },
    /// A miss with attempts to spare. Timeouts carry no direction.
    Wrong {
        direction: Option<GuessDirection>,
        attempts_left: u32,
    },
    Lost,
}

/// Owns one game session and drives it from discrete input events.
pub struct GameController<S, X, R> {
    storage: S,
    extractor: X,
    renderer: R,
    expected_mode: ModeId,
    state: Option<RoundState>,
    phase: GamePhase,
    countdown: Countdown,
    rng: ChaCha20Rng,
}

impl<S, X, R> GameController<S, X, R>
where
    S: GameStorage,
    X: GuessExtractor,
    R: RoundRenderer,
{
    /// Controller for the page that plays `expected_mode`. `seed` drives level draws.
    pub fn new(storage: S, extractor: X, renderer: R, expected_mode: ModeId, seed: u64) -> Self {
        Self {
            storage,
            extractor,
            renderer,
            expected_mode,
            state: None,
            phase: GamePhase::Loading,
            countdown: Countdown::new(),
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Load the stored session and resume it.
    ///
    /// # Errors
    ///
    /// Returns an error if called twice or the storage backend fails.
    pub fn init(&mut self) -> Result<InitOutcome, GameError> {
        self.require_phase("init", &[GamePhase::Loading])?;
        let loaded = SessionStore::new(&self.storage).load()?;
        self.resume(loaded)
    }

    /// Resume the stored session, or adopt `handoff` when storage holds none.
    ///
    /// A stored session always wins over the hand-off.
    ///
    /// # Errors
    ///
    /// Returns an error if called twice or the storage backend fails.
    pub fn init_with(&mut self, handoff: RoundState) -> Result<InitOutcome, GameError> {
        self.require_phase("init", &[GamePhase::Loading])?;
        let store = SessionStore::new(&self.storage);
        if let Some(stored) = store.load()? {
            log::debug!("stored session takes precedence over hand-off");
            return self.resume(Some(stored));
        }
        if !handoff.is_consistent() {
            log::warn!("ignoring inconsistent hand-off session");
            return self.resume(None);
        }
        store.save(&handoff)?;
        self.resume(Some(handoff))
    }

    fn resume(&mut self, loaded: Option<RoundState>) -> Result<InitOutcome, GameError> {
        let Some(mut state) = loaded else {
            log::debug!("no session to resume");
            return Ok(InitOutcome::NoSession);
        };

        let stored = *state.mode.get_or_insert(self.expected_mode);
        if stored != self.expected_mode {
            log::debug!("session is for {stored}, page plays {}", self.expected_mode);
            self.renderer.on_mode_mismatch(stored);
            return Ok(InitOutcome::ModeMismatch { stored });
        }

        self.phase = if state.is_lost() {
            GamePhase::Lost
        } else if state.is_level_complete() {
            GamePhase::LevelComplete
        } else {
            GamePhase::Playing
        };
        self.state = Some(state);
        self.persist();
        log::debug!("resumed session in {:?}", self.phase);

        let Some(state) = self.state.as_ref() else {
            return Err(GameError::NoSession);
        };
        self.renderer.on_init(state);
        match self.phase {
            GamePhase::Playing => self.announce_round(),
            GamePhase::LevelComplete => {
                let score = Self::breakdown_of(state, self.expected_mode);
                self.renderer
                    .on_level_complete(state, &score, state.has_next_tier());
            }
            GamePhase::Lost => {
                let score = Self::breakdown_of(state, self.expected_mode);
                self.renderer.on_lost(state, &score);
            }
            _ => {}
        }
        Ok(InitOutcome::Resumed { phase: self.phase })
    }

    /// Read the guess from the extractor and judge it.
    ///
    /// A rejected guess produces a hint and leaves the session untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPhase`] outside [`GamePhase::Playing`].
    pub fn handle_submit(&mut self) -> Result<GuessOutcome, GameError> {
        self.require_phase("submit", &[GamePhase::Playing])?;
        let value = match self.extractor.extract_guess() {
            Ok(value) => value,
            Err(reason) => {
                self.renderer.on_hint(&Hint::Rejected { reason });
                return Ok(GuessOutcome::Rejected { reason });
            }
        };
        self.countdown.stop();
        self.extractor.clear();
        self.renderer.on_clear_input();
        self.submit_guess(value)
    }

    /// Judge a guess value directly.
    ///
    /// Zero, negative and non-finite values are rejected without spending an attempt.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPhase`] outside [`GamePhase::Playing`].
    pub fn submit_guess(&mut self, value: f64) -> Result<GuessOutcome, GameError> {
        self.require_phase("submit", &[GamePhase::Playing])?;
        let animal = self
            .state
            .as_ref()
            .and_then(RoundState::current_animal)
            .ok_or(GameError::NoSession)?;
        let value = match check_guess(value) {
            Ok(value) => value,
            Err(reason) => {
                self.renderer.on_hint(&Hint::Rejected { reason });
                return Ok(GuessOutcome::Rejected { reason });
            }
        };
        self.countdown.stop();
        let verdict = judge_guess(animal.weight, value);
        log::debug!("{} guessed {value}: {verdict:?}", animal.id);
        match verdict {
            GuessVerdict::Correct => self.register_hit(animal),
            GuessVerdict::Wrong(direction) => self.register_miss(Some(direction)),
        }
    }

    /// Spend an attempt because the countdown ran out.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPhase`] outside [`GamePhase::Playing`].
    pub fn handle_timeout(&mut self) -> Result<GuessOutcome, GameError> {
        self.require_phase("timeout", &[GamePhase::Playing])?;
        self.countdown.stop();
        self.register_miss(None)
    }

    /// Forward one timer second. Ticks with a stale token are ignored.
    ///
    /// # Errors
    ///
    /// Propagates errors from the timeout transition.
    pub fn tick(&mut self, token: TimerToken) -> Result<TimerEvent, GameError> {
        let event = self.countdown.tick(token);
        match event {
            TimerEvent::Tick(remaining) => self.renderer.on_tick(Some(remaining)),
            TimerEvent::Expired => {
                log::debug!("countdown expired");
                self.register_miss(None)?;
            }
            TimerEvent::Ignored => {}
        }
        Ok(event)
    }

    /// Move a completed level up to the next tier with fresh animals.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPhase`] unless the level is complete, and
    /// [`GameError::NoNextTier`] at the hardest tier.
    pub fn advance_level(&mut self) -> Result<(), GameError> {
        self.require_phase("advance", &[GamePhase::LevelComplete])?;
        let mode = self.expected_mode;
        let state = self.state.as_mut().ok_or(GameError::NoSession)?;
        let next = state.difficulty.next().ok_or(GameError::NoNextTier)?;

        let level = select_level(mode, &state.used_animals, LEVEL_SIZE, &mut self.rng);
        state.difficulty = next;
        state.highest_difficulty = state.highest_difficulty.max(next);
        state.level_animals = level.level_animals;
        state.used_animals = level.used_animals;
        if mode.is_comparison() {
            state.weight_animals = level.weight_animals;
        }
        state.base_score = 0;
        state.current_index = 0;
        state.completed_animals = 0;
        state.failed_attempts_current = 0;
        state.attempts_left = next.tier().attempts;
        log::debug!("advanced to {next}");

        self.phase = GamePhase::Playing;
        self.persist();
        self.renderer.on_hint(&Hint::NewLevel);
        self.announce_round();
        Ok(())
    }

    /// `base × tier multiplier × timed factor × mode modifier`, recomputed on every call.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoSession`] when no session is loaded.
    pub fn compute_final_score(&self) -> Result<u32, GameError> {
        self.score_breakdown().map(|score| score.total())
    }

    /// # Errors
    ///
    /// Returns [`GameError::NoSession`] when no session is loaded.
    pub fn score_breakdown(&self) -> Result<ScoreBreakdown, GameError> {
        let state = self.state.as_ref().ok_or(GameError::NoSession)?;
        Ok(Self::breakdown_of(state, self.expected_mode))
    }

    /// Record the result on the leaderboard and end the session.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPhase`] unless the level is complete or
    /// lost, and surfaces leaderboard write failures.
    pub fn save_and_exit(&mut self) -> Result<LeaderboardEntry, GameError> {
        self.require_phase("save", &[GamePhase::LevelComplete, GamePhase::Lost])?;
        let score = self.compute_final_score()?;
        let state = self.state.as_ref().ok_or(GameError::NoSession)?;
        let entry = LeaderboardEntry::new(
            state.player_name.clone(),
            score,
            state.highest_difficulty.tier().label,
            state.time_mode,
        );
        LeaderboardStore::new(&self.storage).append(entry.clone())?;
        self.end_session(GamePhase::Saved)?;
        log::debug!("saved {} points for '{}'", entry.score, entry.name);
        Ok(entry)
    }

    /// Drop the session without recording anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the session record cannot be removed.
    pub fn exit_without_saving(&mut self) -> Result<(), GameError> {
        self.end_session(GamePhase::Exited)
    }

    #[must_use]
    pub const fn state(&self) -> Option<&RoundState> {
        self.state.as_ref()
    }

    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn current_animal(&self) -> Option<&'static Animal> {
        self.state.as_ref().and_then(RoundState::current_animal)
    }

    /// Token of the running countdown; changes whenever the countdown restarts.
    #[must_use]
    pub const fn timer_token(&self) -> Option<TimerToken> {
        self.countdown.token()
    }

    #[must_use]
    pub const fn remaining_seconds(&self) -> Option<u32> {
        self.countdown.remaining()
    }

    #[must_use]
    pub const fn expected_mode(&self) -> ModeId {
        self.expected_mode
    }

    pub const fn extractor_mut(&mut self) -> &mut X {
        &mut self.extractor
    }

    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    pub const fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn register_hit(&mut self, animal: &'static Animal) -> Result<GuessOutcome, GameError> {
        let state = self.state.as_mut().ok_or(GameError::NoSession)?;
        let points = points_for_animal(state.failed_attempts_current);
        state.base_score = state.base_score.saturating_add(points);
        state.completed_animals += 1;
        state.current_index += 1;
        state.failed_attempts_current = 0;
        state.attempts_left = state.tier().attempts;
        let level_complete = state.is_level_complete();
        if level_complete {
            self.phase = GamePhase::LevelComplete;
        }
        self.persist();

        self.renderer.on_hint(&Hint::Correct {
            name: animal.name,
            weight: animal.weight,
        });
        if level_complete {
            log::debug!("level complete");
            if let Some(state) = self.state.as_ref() {
                let score = Self::breakdown_of(state, self.expected_mode);
                self.renderer
                    .on_level_complete(state, &score, state.has_next_tier());
            }
        } else {
            self.announce_round();
        }
        Ok(GuessOutcome::Correct {
            points,
            level_complete,
        })
    }

    fn register_miss(
        &mut self,
        direction: Option<GuessDirection>,
    ) -> Result<GuessOutcome, GameError> {
        let state = self.state.as_mut().ok_or(GameError::NoSession)?;
        state.attempts_left = state.attempts_left.saturating_sub(1);
        state.failed_attempts_current += 1;
        let attempts_left = state.attempts_left;
        if attempts_left == 0 {
            self.phase = GamePhase::Lost;
        }
        self.persist();

        if attempts_left == 0 {
            log::debug!("out of attempts");
            self.renderer.on_hint(&Hint::OutOfAttempts);
            if let Some(state) = self.state.as_ref() {
                let score = Self::breakdown_of(state, self.expected_mode);
                self.renderer.on_lost(state, &score);
            }
            return Ok(GuessOutcome::Lost);
        }

        let hint = direction.map_or(Hint::TimeUp, |direction| Hint::Wrong { direction });
        self.renderer.on_hint(&hint);
        self.start_timer();
        Ok(GuessOutcome::Wrong {
            direction,
            attempts_left,
        })
    }

    fn announce_round(&mut self) {
        if let Some(state) = self.state.as_ref()
            && let Some(animal) = state.current_animal()
        {
            self.renderer.on_round_start(animal, state);
        }
        self.start_timer();
    }

    fn start_timer(&mut self) {
        self.countdown.stop();
        let limit = self
            .state
            .as_ref()
            .filter(|state| state.time_mode)
            .map(|state| state.tier().time_limit);
        if let Some(limit) = limit {
            self.countdown.start(limit);
        }
        self.renderer.on_tick(limit);
    }

    fn end_session(&mut self, phase: GamePhase) -> Result<(), GameError> {
        self.countdown.stop();
        SessionStore::new(&self.storage).clear()?;
        self.state = None;
        self.phase = phase;
        Ok(())
    }

    fn persist(&self) {
        if let Some(state) = self.state.as_ref()
            && let Err(err) = SessionStore::new(&self.storage).save(state)
        {
            log::warn!("failed to autosave session: {err}");
        }
    }

    fn require_phase(
        &self,
        operation: &'static str,
        allowed: &[GamePhase],
    ) -> Result<(), GameError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(GameError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    fn breakdown_of(state: &RoundState, fallback_mode: ModeId) -> ScoreBreakdown {
        ScoreBreakdown::new(
            state.base_score,
            state.highest_difficulty,
            state.time_mode,
            state.mode.unwrap_or(fallback_mode),
        )
    }
}
