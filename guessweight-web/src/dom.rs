use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Storage, UrlSearchParams, Window};

/// Retrieve the global `window` object, if running in a browser.
#[must_use]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from(message));
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `localStorage` is unavailable.
pub fn local_storage() -> Result<Storage, JsValue> {
    window()
        .ok_or_else(|| JsValue::from_str("window unavailable"))?
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))
}

/// Read one query parameter from the current page URL.
#[must_use]
pub fn query_param(name: &str) -> Option<String> {
    let search = window()?.location().search().ok()?;
    UrlSearchParams::new_with_str(&search).ok()?.get(name)
}

/// Navigate the current tab.
///
/// # Errors
/// Returns an error if the window is unavailable or the browser rejects the URL.
pub fn navigate(url: &str) -> Result<(), JsValue> {
    window()
        .ok_or_else(|| JsValue::from_str("window unavailable"))?
        .location()
        .set_href(url)
}

/// Drop one query parameter from the address bar without reloading.
///
/// # Errors
/// Returns an error if the window is unavailable or the history update is refused.
pub fn remove_query_param(name: &str) -> Result<(), JsValue> {
    let window = window().ok_or_else(|| JsValue::from_str("window unavailable"))?;
    let location = window.location();
    let params = UrlSearchParams::new_with_str(&location.search()?)?;
    params.delete(name);
    let query = String::from(params.to_string());
    let mut url = location.pathname()?;
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    url.push_str(&location.hash()?);
    window
        .history()?
        .replace_state_with_url(&JsValue::NULL, "", Some(&url))
}
