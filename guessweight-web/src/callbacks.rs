//! Presentation adapters backed by JavaScript callbacks.
//!
//! The page passes a hooks object whose optional members mirror
//! [`RoundRenderer`]: `onInit`, `onRoundStart`, `onClearInput`,
//! `onModeMismatch`, `onTick`, `onHint`, `onLevelComplete`, `onLost`.
use guessweight_game::adapters::parse_guess;
use guessweight_game::constants::CLOCK_PLACEHOLDER;
use guessweight_game::{
    Animal, GuessExtractor, GuessRejection, Hint, ModeId, RoundRenderer, RoundState,
    ScoreBreakdown, format_clock,
};
use js_sys::{Function, Object, Reflect};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom;

/// Reads the guess from a page callback.
///
/// The callback may return a number, numeric text, or `null` when nothing is
/// entered or placed.
pub struct JsGuessExtractor {
    get_guess: Function,
    clear: Option<Function>,
}

impl JsGuessExtractor {
    #[must_use]
    pub const fn new(get_guess: Function, clear: Option<Function>) -> Self {
        Self { get_guess, clear }
    }
}

impl GuessExtractor for JsGuessExtractor {
    fn extract_guess(&mut self) -> Result<f64, GuessRejection> {
        let value = self.get_guess.call0(&JsValue::NULL).map_err(|err| {
            dom::console_error(&format!("getGuessValue failed: {}", dom::js_error_message(&err)));
            GuessRejection::NotANumber
        })?;
        if value.is_null() || value.is_undefined() {
            return Err(GuessRejection::NothingPlaced);
        }
        if let Some(text) = value.as_string() {
            return parse_guess(&text);
        }
        match value.as_f64() {
            Some(number) if !number.is_finite() => Err(GuessRejection::NotANumber),
            Some(number) if number <= 0.0 => Err(GuessRejection::NonPositive),
            Some(number) => Ok(number),
            None => Err(GuessRejection::NotANumber),
        }
    }

    fn clear(&mut self) {
        if let Some(clear) = &self.clear
            && let Err(err) = clear.call0(&JsValue::NULL)
        {
            log::warn!("clear callback failed: {}", dom::js_error_message(&err));
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoundStartPayload<'a> {
    animal: &'a Animal,
    state: &'a RoundState,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HintPayload<'a> {
    #[serde(flatten)]
    hint: &'a Hint,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomePayload<'a> {
    state: &'a RoundState,
    score: &'a ScoreBreakdown,
    final_score: u32,
    can_continue: bool,
}

/// Forwards round events to optional members of a JS hooks object.
pub struct JsRoundRenderer {
    hooks: Object,
}

impl JsRoundRenderer {
    /// Wrap a hooks object; anything that is not an object gets no hooks.
    #[must_use]
    pub fn new(hooks: JsValue) -> Self {
        let hooks = hooks.dyn_into::<Object>().unwrap_or_else(|_| Object::new());
        Self { hooks }
    }

    fn emit(&self, name: &str, arg: &JsValue) {
        let Ok(member) = Reflect::get(&self.hooks, &JsValue::from_str(name)) else {
            return;
        };
        let Some(callback) = member.dyn_ref::<Function>() else {
            return;
        };
        if let Err(err) = callback.call1(&JsValue::NULL, arg) {
            dom::console_error(&format!("{name} failed: {}", dom::js_error_message(&err)));
        }
    }

    fn emit_serialized<T: Serialize + ?Sized>(&self, name: &str, payload: &T) {
        match serde_wasm_bindgen::to_value(payload) {
            Ok(value) => self.emit(name, &value),
            Err(err) => log::warn!("could not convert {name} payload: {err}"),
        }
    }
}

impl RoundRenderer for JsRoundRenderer {
    fn on_init(&mut self, state: &RoundState) {
        self.emit_serialized("onInit", state);
    }

    fn on_round_start(&mut self, animal: &'static Animal, state: &RoundState) {
        self.emit_serialized("onRoundStart", &RoundStartPayload { animal, state });
    }

    fn on_clear_input(&mut self) {
        self.emit("onClearInput", &JsValue::UNDEFINED);
    }

    fn on_mode_mismatch(&mut self, stored: ModeId) {
        self.emit("onModeMismatch", &JsValue::from_str(stored.as_str()));
    }

    fn on_tick(&mut self, remaining: Option<u32>) {
        let label = remaining.map_or_else(|| CLOCK_PLACEHOLDER.to_string(), format_clock);
        self.emit("onTick", &JsValue::from_str(&label));
    }

    fn on_hint(&mut self, hint: &Hint) {
        self.emit_serialized(
            "onHint",
            &HintPayload {
                hint,
                message: hint.message(),
            },
        );
    }

    fn on_level_complete(
        &mut self,
        state: &RoundState,
        score: &ScoreBreakdown,
        can_continue: bool,
    ) {
        self.emit_serialized(
            "onLevelComplete",
            &OutcomePayload {
                state,
                score,
                final_score: score.total(),
                can_continue,
            },
        );
    }

    fn on_lost(&mut self, state: &RoundState, score: &ScoreBreakdown) {
        self.emit_serialized(
            "onLost",
            &OutcomePayload {
                state,
                score,
                final_score: score.total(),
                can_continue: false,
            },
        );
    }
}
