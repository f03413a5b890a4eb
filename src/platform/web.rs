//! Browser bindings
//!
//! The page owns the canvas and the `requestAnimationFrame` loop. It feeds
//! clock readings and UI actions in, and paints the JSON views that come out.

use wasm_bindgen::prelude::*;

use crate::app::{App, UiAction};
use crate::lobby::Lobby;
use crate::sim::FrameInput;
use crate::tuning::RaceTuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    // A second init only happens on hot reload; keep the first logger
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Skate Race starting...");
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Handle the page keeps for the whole session
#[wasm_bindgen]
pub struct WebApp {
    app: App,
}

#[wasm_bindgen]
impl WebApp {
    /// `tuning_json` may be omitted for the default balance
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> Result<WebApp, JsValue> {
        let tuning = match tuning_json {
            Some(json) => RaceTuning::from_json(&json).map_err(js_err)?,
            None => RaceTuning::default(),
        };
        Ok(Self {
            app: App::new(Lobby::new(), tuning),
        })
    }

    /// Called once per animation frame with `performance.now()` and the
    /// time since the previous frame, both in ms
    pub fn update(&mut self, time: f64, delta: f64) {
        self.app.update(FrameInput::new(time, delta));
    }

    /// Apply a JSON-encoded action; returns the JSON response
    pub fn dispatch(&mut self, action_json: &str) -> Result<String, JsValue> {
        let action: UiAction = serde_json::from_str(action_json).map_err(js_err)?;
        let response = self.app.handle(action).map_err(js_err)?;
        serde_json::to_string(&response).map_err(js_err)
    }

    /// Current scene as JSON
    pub fn view_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.app.view()).map_err(js_err)
    }
}
