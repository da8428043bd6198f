//! `wasm-bindgen` surface for a browser host.
//!
//! Everything crosses the boundary as JSON text. Returned action arrays hold
//! one object per [`Action`]: `{"Send": "<wire text>"}` or `"RenderNeeded"`.

use js_sys::{Array, JSON};
use wasm_bindgen::prelude::*;

use crate::config::EditorConfig;
use crate::engine::{Action, Editor};
use crate::input::Event;

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn actions_to_js(actions: &[Action]) -> Result<Array, JsValue> {
    let array = Array::new();
    for action in actions {
        let json = serde_json::to_string(action).map_err(js_error)?;
        array.push(&JSON::parse(&json)?);
    }
    Ok(array)
}

#[wasm_bindgen]
pub struct EditorHandle {
    editor: Editor,
}

#[wasm_bindgen]
impl EditorHandle {
    /// An editor for a drawing surface of the given size, in CSS pixels.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(width: f64, height: f64) -> EditorHandle {
        let config = EditorConfig { width, height, ..EditorConfig::default() };
        EditorHandle { editor: Editor::new(config) }
    }

    /// Handle one event given as JSON, e.g. `{"MouseDown": {"x": 10, "y": 20}}`.
    ///
    /// # Errors
    ///
    /// Returns a string error if the JSON is not an event.
    pub fn handle(&mut self, event_json: &str) -> Result<Array, JsValue> {
        let event: Event = serde_json::from_str(event_json).map_err(js_error)?;
        actions_to_js(&self.editor.handle(event))
    }

    /// Handle an event named by its kind, with a JSON payload or `null`.
    ///
    /// # Errors
    ///
    /// Returns a string error if the payload is not JSON or does not fit the
    /// kind.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&mut self, msg_type: &str, payload_json: &str) -> Result<Array, JsValue> {
        let payload = serde_json::from_str(payload_json).map_err(js_error)?;
        let actions = self.editor.handle_message(msg_type, payload).map_err(js_error)?;
        actions_to_js(&actions)
    }

    /// Apply wire text received from the relay.
    ///
    /// # Errors
    ///
    /// Returns a string error if the text is not a valid envelope.
    pub fn receive(&mut self, text: &str) -> Result<Array, JsValue> {
        let actions = self.editor.receive(text).map_err(js_error)?;
        actions_to_js(&actions)
    }

    /// # Errors
    ///
    /// Fails only if an action cannot be rendered as JSON.
    pub fn reconnected(&mut self) -> Result<Array, JsValue> {
        actions_to_js(&self.editor.reconnected())
    }

    /// The current diagram as snapshot JSON.
    ///
    /// # Errors
    ///
    /// Fails only if the snapshot cannot be rendered as JSON.
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.editor.snapshot()).map_err(js_error)
    }

    /// Current state of a machine by name (`"Mode"`, `"Move"`, ...).
    #[wasm_bindgen(js_name = stateOf)]
    #[must_use]
    pub fn state_of(&self, machine: &str) -> Option<String> {
        let machine = self.editor.chain().machines().into_iter().find(|m| format!("{m:?}") == machine)?;
        self.editor.state_of(machine).map(str::to_owned)
    }
}
