//! WASM bridge for Kin — exposes the family-tree session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host canvas does its own
//! drawing and hit testing; it hands us normalized clicks and receives full
//! render snapshots back through the callbacks given to the constructor.

mod bridge;

pub use bridge::{Bridge, PersonForm, tool_kind_from_name, tool_kind_to_name};

use kin_core::id::PersonId;
use kin_editor::adapter::{CanvasAdapter, RenderSnapshot};
use kin_editor::config::EditorConfig;
use wasm_bindgen::prelude::*;

/// Forwards the render contract to JS callbacks.
///
/// `on_render(snapshotJson)` receives the whole frame;
/// `on_icon(id, imageOrNull)` swaps one node's image.
struct JsCanvas {
    on_render: Option<js_sys::Function>,
    on_icon: Option<js_sys::Function>,
}

impl CanvasAdapter for JsCanvas {
    fn render(&mut self, snapshot: &RenderSnapshot) {
        let Some(callback) = &self.on_render else {
            return;
        };
        match serde_json::to_string(snapshot) {
            Ok(json) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    console_error(&callback_failure("render", &e));
                }
            }
            Err(e) => console_error(&format!("Kin: failed to serialize snapshot: {e}")),
        }
    }

    fn update_node_icon(&mut self, id: PersonId, image: Option<&str>) {
        let Some(callback) = &self.on_icon else {
            return;
        };
        let image = image.map(JsValue::from_str).unwrap_or(JsValue::NULL);
        if let Err(e) = callback.call2(&JsValue::NULL, &JsValue::from_str(id.as_str()), &image) {
            console_error(&callback_failure("icon", &e));
        }
    }
}

/// The main WASM-facing canvas controller.
///
/// Holds the editing session. All interaction from the page goes through
/// this struct.
#[wasm_bindgen]
pub struct FamilyCanvas {
    bridge: Bridge<JsCanvas>,
}

#[wasm_bindgen]
impl FamilyCanvas {
    /// Create a controller. `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: &str,
        on_render: Option<js_sys::Function>,
        on_icon: Option<js_sys::Function>,
    ) -> Self {
        // Set up panic hook for better error messages in console
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            serde_json::from_str(config_json).unwrap_or_else(|e| {
                web_sys::console::warn_1(&format!("Kin: bad config, using defaults: {e}").into());
                EditorConfig::default()
            })
        };
        let adapter = JsCanvas { on_render, on_icon };
        Self {
            bridge: Bridge::new(adapter, config),
        }
    }

    /// Replace the tree with `{"nodes":[...],"edges":[...]}`.
    pub fn load(&mut self, json: &str) -> String {
        self.bridge.load(json)
    }

    /// Export the tree as `{"nodes":[...],"edges":[...]}`.
    pub fn export_json(&self) -> String {
        self.bridge.export_json()
    }

    /// Add a person from the add-member form.
    pub fn add_person(&mut self, json: &str) -> String {
        self.bridge.add_person(json)
    }

    /// Replace a person with the record from the edit-member form.
    pub fn edit_person(&mut self, json: &str) -> String {
        self.bridge.edit_person(json)
    }

    /// Change a person's photo. An empty string clears it.
    pub fn set_photo(&mut self, id: &str, photo: &str) -> String {
        self.bridge.set_photo(id, photo)
    }

    pub fn remove_person(&mut self, id: &str) -> String {
        self.bridge.remove_person(id)
    }

    /// Remove the person clicked last.
    pub fn remove_selected(&mut self) -> String {
        self.bridge.remove_selected()
    }

    pub fn add_relation(&mut self, source: &str, target: &str) -> String {
        self.bridge.add_relation(source, target)
    }

    pub fn remove_relation(&mut self, source: &str, target: &str) -> String {
        self.bridge.remove_relation(source, target)
    }

    /// `"select"`, `"addRelation"` or `"removeRelation"`.
    pub fn set_tool(&mut self, name: &str) {
        self.bridge.set_tool(name);
    }

    /// Mode-button toggle. Returns the tool now active.
    pub fn toggle_tool(&mut self, name: &str) -> String {
        self.bridge.toggle_tool(name)
    }

    pub fn get_tool_name(&self) -> String {
        self.bridge.tool_name()
    }

    pub fn click_node(&mut self, id: &str, x: f32, y: f32) -> String {
        self.bridge.click_node(id, x, y)
    }

    pub fn click_edge(&mut self, source: &str, target: &str, x: f32, y: f32) -> String {
        self.bridge.click_edge(source, target, x, y)
    }

    pub fn click_empty(&mut self, x: f32, y: f32) -> String {
        self.bridge.click_empty(x, y)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> String {
        self.bridge.pointer_move(x, y)
    }

    /// Get the selected person ID, or empty string if none.
    pub fn get_selected_id(&self) -> String {
        self.bridge.selected_id()
    }

    pub fn get_selected_person(&self) -> String {
        self.bridge.selected_person_json()
    }

    /// Father or mother options for the form pickers.
    pub fn get_candidates(&self, slot: &str) -> String {
        self.bridge.candidates_json(slot)
    }

    pub fn lint(&self) -> String {
        self.bridge.lint_json()
    }
}

// ─── Console reporting ───────────────────────────────────────────────────

fn callback_failure(callback: &str, err: &impl std::fmt::Debug) -> String {
    format!("Kin: {callback} callback threw: {err:?}")
}

/// Errors raised inside host callbacks. Goes to the browser console on
/// wasm32; native builds (tests) have no console, so it falls back to `log`.
fn console_error(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    log::error!("{msg}");
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Kin WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no canvas needed) ────────────────────────────

/// Check family data without loading it. Returns JSON:
/// `{"ok":true,"people":N}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate(json: &str) -> String {
    let result = kin_core::data::FamilyData::from_json(json)
        .map_err(|e| format!("invalid family data: {e}"))
        .and_then(|data| {
            kin_core::model::FamilyGraph::from_data(data, Default::default())
                .map_err(|e| e.to_string())
        });
    match result {
        Ok(graph) => serde_json::json!({ "ok": true, "people": graph.len() }).to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e }).to_string(),
    }
}
