//! `wasm_bindgen` surface used by the menu, game and leaderboard pages.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use guessweight_game::constants::TICK_SECONDS;
use guessweight_game::{
    ANIMALS, DIFFICULTIES, DifficultyId, GameController, GameError, LeaderboardStore, MODES,
    MenuSettings, ModeId, SessionSetup, SessionStore, TimerToken, WEIGHT_PIECES,
};
use js_sys::Function;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::callbacks::{JsGuessExtractor, JsRoundRenderer};
use crate::dom;
use crate::handoff;
use crate::storage::WebStorage;

type WebController = GameController<WebStorage, JsGuessExtractor, JsRoundRenderer>;

fn to_js_error(err: &GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Hooks receive event payloads directly; calling back into the handle from a
/// hook finds the controller borrowed.
fn busy() -> JsValue {
    JsValue::from_str("game is handling another event")
}

fn entropy_seed() -> u64 {
    js_sys::Date::now().to_bits() ^ js_sys::Math::random().to_bits()
}

fn parse_mode(mode: &str) -> Result<ModeId, JsValue> {
    mode.parse()
        .map_err(|()| JsValue::from_str(&format!("unknown mode '{mode}'")))
}

/// One `setInterval` bound to a countdown token.
struct ArmedTimer {
    token: TimerToken,
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

struct Shared {
    controller: RefCell<WebController>,
    armed: RefCell<Option<ArmedTimer>>,
    /// The previous interval's closure may still be on the stack when it is
    /// replaced, so it is dropped one re-arm later.
    retired: RefCell<Option<ArmedTimer>>,
}

/// Re-arm the browser interval whenever the controller's countdown token changes.
fn sync_timer(shared: &Rc<Shared>) {
    let Ok(wanted) = shared.controller.try_borrow().map(|game| game.timer_token()) else {
        return;
    };
    let current = shared.armed.borrow().as_ref().map(|armed| armed.token);
    if wanted == current {
        return;
    }
    let Some(window) = dom::window() else {
        return;
    };
    if let Some(old) = shared.armed.borrow_mut().take() {
        window.clear_interval_with_handle(old.handle);
        shared.retired.replace(Some(old));
    }
    let Some(token) = wanted else {
        return;
    };

    let weak: Weak<Shared> = Rc::downgrade(shared);
    let callback = Closure::<dyn FnMut()>::new(move || {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let Ok(mut controller) = shared.controller.try_borrow_mut() else {
            return;
        };
        let result = controller.tick(token);
        drop(controller);
        if let Err(err) = result {
            dom::console_error(&format!("tick failed: {err}"));
        }
        sync_timer(&shared);
    });
    let millis = i32::try_from(TICK_SECONDS * 1000).unwrap_or(1000);
    match window.set_interval_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        millis,
    ) {
        Ok(handle) => {
            shared.armed.replace(Some(ArmedTimer {
                token,
                handle,
                _callback: callback,
            }));
        }
        Err(err) => dom::console_error(&format!(
            "could not start countdown: {}",
            dom::js_error_message(&err)
        )),
    }
}

/// Game page handle.
#[wasm_bindgen]
pub struct GameHandle {
    shared: Rc<Shared>,
}

impl GameHandle {
    fn run<T>(
        &self,
        op: impl FnOnce(&mut WebController) -> Result<T, GameError>,
    ) -> Result<T, JsValue> {
        let result = {
            let mut controller = self.shared.controller.try_borrow_mut().map_err(|_| busy())?;
            op(&mut controller)
        };
        sync_timer(&self.shared);
        result.map_err(|err| to_js_error(&err))
    }

    fn read<T>(&self, op: impl FnOnce(&WebController) -> T) -> Result<T, JsValue> {
        let controller = self.shared.controller.try_borrow().map_err(|_| busy())?;
        Ok(op(&controller))
    }
}

impl Drop for GameHandle {
    fn drop(&mut self) {
        if let Some(armed) = self.shared.armed.borrow_mut().take()
            && let Some(window) = dom::window()
        {
            window.clear_interval_with_handle(armed.handle);
        }
    }
}

#[wasm_bindgen]
impl GameHandle {
    /// `mode` is the page's play mode; `hooks` holds optional render callbacks.
    ///
    /// # Errors
    /// Returns an error for an unknown mode.
    #[wasm_bindgen(constructor)]
    pub fn new(
        mode: &str,
        hooks: JsValue,
        get_guess: Function,
        clear_input: Option<Function>,
    ) -> Result<Self, JsValue> {
        let mode = parse_mode(mode)?;
        let controller = GameController::new(
            WebStorage,
            JsGuessExtractor::new(get_guess, clear_input),
            JsRoundRenderer::new(hooks),
            mode,
            entropy_seed(),
        );
        Ok(Self {
            shared: Rc::new(Shared {
                controller: RefCell::new(controller),
                armed: RefCell::new(None),
                retired: RefCell::new(None),
            }),
        })
    }

    /// Resume the stored session, falling back to `?state=` when storage is empty.
    /// The parameter is removed from the address bar once read.
    ///
    /// # Errors
    /// Returns an error if storage fails.
    pub fn init(&self) -> Result<JsValue, JsValue> {
        let handed_off = handoff::state_from_url();
        let outcome = self.run(|game| match handed_off {
            Some(state) => game.init_with(state),
            None => game.init(),
        })?;
        if dom::query_param(handoff::STATE_PARAM).is_some()
            && let Err(err) = dom::remove_query_param(handoff::STATE_PARAM)
        {
            log::warn!(
                "could not clear hand-off from the URL: {}",
                dom::js_error_message(&err)
            );
        }
        to_js(&outcome)
    }

    /// # Errors
    /// Returns an error outside the playing phase.
    #[wasm_bindgen(js_name = handleSubmit)]
    pub fn handle_submit(&self) -> Result<JsValue, JsValue> {
        let outcome = self.run(WebController::handle_submit)?;
        to_js(&outcome)
    }

    /// # Errors
    /// Returns an error if the level is not complete or already at the hardest tier.
    #[wasm_bindgen(js_name = advanceLevel)]
    pub fn advance_level(&self) -> Result<(), JsValue> {
        self.run(WebController::advance_level)
    }

    /// Record the score and return the leaderboard URL announcing it.
    /// With `navigate` set the tab goes there directly.
    ///
    /// # Errors
    /// Returns an error outside the finished phases or if the leaderboard cannot be written.
    #[wasm_bindgen(js_name = saveAndExit)]
    pub fn save_and_exit(&self, navigate: bool) -> Result<String, JsValue> {
        let entry = self.run(WebController::save_and_exit)?;
        let url = handoff::result_url(&entry).map_err(|err| JsValue::from_str(&err.to_string()))?;
        if navigate {
            dom::navigate(&url)?;
        }
        Ok(url)
    }

    /// # Errors
    /// Returns an error if the session record cannot be removed.
    #[wasm_bindgen(js_name = exitWithoutSaving)]
    pub fn exit_without_saving(&self) -> Result<(), JsValue> {
        self.run(WebController::exit_without_saving)
    }

    /// # Errors
    /// Returns an error if the state cannot be converted.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        self.read(|game| to_js(&game.state()))?
    }

    /// # Errors
    /// Returns an error while the game is busy handling another event.
    #[wasm_bindgen(js_name = getPhase)]
    pub fn get_phase(&self) -> Result<JsValue, JsValue> {
        self.read(|game| to_js(&game.phase()))?
    }

    /// # Errors
    /// Returns an error when no session is loaded.
    #[wasm_bindgen(js_name = computeFinalScore)]
    pub fn compute_final_score(&self) -> Result<u32, JsValue> {
        self.read(WebController::compute_final_score)?
            .map_err(|err| to_js_error(&err))
    }
}

/// Create and store a new session from menu choices.
///
/// # Errors
/// Returns an error for an empty name, unknown ids, or storage failure.
#[wasm_bindgen(js_name = startSession)]
pub fn start_session(
    player_name: &str,
    mode: &str,
    difficulty: &str,
    timed: bool,
) -> Result<(), JsValue> {
    let mode = parse_mode(mode)?;
    let difficulty: DifficultyId = difficulty
        .parse()
        .map_err(|()| JsValue::from_str(&format!("unknown difficulty '{difficulty}'")))?;
    let mut rng = ChaCha20Rng::seed_from_u64(entropy_seed());
    SessionStore::new(WebStorage)
        .begin(
            &SessionSetup::new(player_name, mode, difficulty, timed),
            &mut rng,
        )
        .map(|_| ())
        .map_err(|err| to_js_error(&err))
}

/// Send the tab back to the menu, e.g. after `init` reports no session or a mode mismatch.
///
/// # Errors
/// Returns an error if the browser refuses the navigation.
#[wasm_bindgen(js_name = returnToMenu)]
pub fn return_to_menu() -> Result<(), JsValue> {
    dom::navigate(handoff::MENU_PAGE)
}

/// Remembered menu choices.
///
/// # Errors
/// Returns an error if storage fails.
#[wasm_bindgen(js_name = loadMenuSettings)]
pub fn load_menu_settings() -> Result<JsValue, JsValue> {
    let settings = MenuSettings::load(&WebStorage).map_err(|err| to_js_error(&err))?;
    to_js(&settings)
}

/// Ranked leaderboard, folding in a `?result=` hand-off once.
///
/// # Errors
/// Returns an error if storage fails.
#[wasm_bindgen(js_name = loadLeaderboard)]
pub fn load_leaderboard() -> Result<JsValue, JsValue> {
    let store = LeaderboardStore::new(WebStorage);
    let entries = match handoff::result_from_url() {
        Some(entry) => store.append_unique(entry),
        None => store.load(),
    }
    .map_err(|err| to_js_error(&err))?;
    to_js(&entries)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogView {
    difficulties: &'static [guessweight_game::DifficultyTier],
    modes: &'static [guessweight_game::Mode],
    animals: &'static [guessweight_game::Animal],
    weight_pieces: &'static [guessweight_game::WeightPiece],
}

/// Static content for menus and racks.
///
/// # Errors
/// Returns an error if the catalog cannot be converted.
#[wasm_bindgen]
pub fn catalog() -> Result<JsValue, JsValue> {
    to_js(&CatalogView {
        difficulties: &DIFFICULTIES,
        modes: &MODES,
        animals: &ANIMALS,
        weight_pieces: &WEIGHT_PIECES,
    })
}
