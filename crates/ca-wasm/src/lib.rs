//! WASM bridge for Component Animator: exposes the editor engine to the page.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the DOM; this
//! side only hands back SVG markup, export text and JSON strings.

use ca_core::compositor::Interaction;
use ca_core::config::SliderConfig;
use ca_core::export::parse_export;
use ca_core::extract::extract_groups;
use ca_core::id::GroupId;
use ca_core::model::{GroupAnimationParams, StateKind, TransformField};
use ca_core::tuner::{TunerLayer, TunerTarget};
use ca_editor::app::{Action, AppState, Notice, ProjectUpload, SvgFile, View};
use ca_editor::session::ModifierSession;
use ca_editor::tuner::TunerSession;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Page-level controller: routing, the open project and the card tuner.
#[wasm_bindgen]
pub struct AnimatorApp {
    state: AppState,
    /// Session for the project behind the current modifier route.
    modifier: Option<(String, ModifierSession)>,
    tuner: TunerSession,
}

#[derive(Serialize)]
struct GroupParamsJson<'a> {
    id: &'a str,
    #[serde(flatten)]
    params: &'a GroupAnimationParams,
}

impl Default for AnimatorApp {
    fn default() -> Self {
        Self::new("/")
    }
}

#[wasm_bindgen]
impl AnimatorApp {
    #[wasm_bindgen(constructor)]
    pub fn new(path: &str) -> Self {
        console_error_panic_hook_setup();

        let mut app = Self {
            state: AppState::at(path),
            modifier: None,
            tuner: TunerSession::default(),
        };
        app.sync_modifier(false);
        app
    }

    // ─── Routing ─────────────────────────────────────────────────────────

    /// Go to `path`. Returns the new view as JSON.
    pub fn navigate(&mut self, path: &str) -> String {
        self.dispatch(Action::Navigate(path.to_string()));
        self.view_json()
    }

    /// Current view: `{"kind":"modifier","slug":"..."}`, `{"kind":"home"}`, ...
    pub fn view_json(&self) -> String {
        serde_json::to_string(&self.state.view()).unwrap_or_else(|_| r#"{"kind":"blank"}"#.to_string())
    }

    /// Store an uploaded pair of SVG files and open it.
    ///
    /// Returns `{"ok":true,"path":"/<slug>-modifier"}` or
    /// `{"ok":false,"error":"..."}`.
    pub fn create_project(
        &mut self,
        collapsed_name: Option<String>,
        collapsed_text: Option<String>,
        expanded_name: Option<String>,
        expanded_text: Option<String>,
    ) -> String {
        let upload = ProjectUpload {
            collapsed: svg_file(collapsed_name, collapsed_text),
            expanded: svg_file(expanded_name, expanded_text),
        };
        match self.dispatch(Action::CreateProject(upload)) {
            Some(notice) => serde_json::json!({ "ok": false, "error": notice.message }).to_string(),
            None => serde_json::json!({ "ok": true, "path": self.state.route().path() }).to_string(),
        }
    }

    // ─── Modifier ────────────────────────────────────────────────────────

    /// Group identifiers of the open project, in registry order.
    pub fn group_ids_json(&self) -> String {
        let ids: Vec<&str> = self
            .modifier
            .as_ref()
            .map(|(_, s)| s.params().ids().map(|id| id.as_str()).collect())
            .unwrap_or_default();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Group identifiers as a JS array.
    pub fn group_ids(&self) -> js_sys::Array {
        self.modifier
            .as_ref()
            .map(|(_, s)| {
                s.params()
                    .ids()
                    .map(|id| JsValue::from_str(id.as_str()))
                    .collect()
            })
            .unwrap_or_else(js_sys::Array::new)
    }

    /// `[{"id":"a","collapsed":{...},"expanded":{...}}, ...]`
    pub fn params_json(&self) -> String {
        let Some((_, session)) = &self.modifier else {
            return "[]".to_string();
        };
        let rows: Vec<GroupParamsJson<'_>> = session
            .params()
            .iter()
            .map(|(id, params)| GroupParamsJson {
                id: id.as_str(),
                params,
            })
            .collect();
        serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
    }

    /// Slider edit. Returns `false` when nothing was applied.
    pub fn set_field(&mut self, id: &str, state: &str, field: &str, value: f64) -> bool {
        let (Some((_, session)), Some(id), Some(state), Some(field)) = (
            self.modifier.as_mut(),
            GroupId::lookup(id),
            StateKind::from_name(state),
            TransformField::from_name(field),
        ) else {
            return false;
        };
        if !session.registry().contains(id) {
            return false;
        }
        session.set_field(id, state, field, value);
        true
    }

    pub fn hover(&mut self, hovered: bool) {
        if let Some((_, session)) = self.modifier.as_mut() {
            session.set_interaction(Interaction::from_hovered(hovered));
        }
    }

    /// Advance the preview animation. Returns whether it is still running.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        self.modifier
            .as_mut()
            .is_some_and(|(_, session)| session.tick(dt_ms))
    }

    /// Current preview frame as an `<svg>` document, or empty when no
    /// project is open.
    pub fn render_svg(&self) -> String {
        self.modifier
            .as_ref()
            .map(|(_, s)| s.render_svg())
            .unwrap_or_default()
    }

    pub fn export_text(&self) -> String {
        self.modifier
            .as_ref()
            .map(|(_, s)| s.export_text())
            .unwrap_or_default()
    }

    /// Replace the open project's sources. Returns `false` with no project.
    pub fn replace_sources(&mut self, collapsed_svg: &str, expanded_svg: &str) -> bool {
        match self.modifier.as_mut() {
            Some((_, session)) => {
                session.replace_sources(collapsed_svg, expanded_svg);
                true
            }
            None => false,
        }
    }

    /// Advisory slider ranges: `{"x":{"min":..,"max":..,"step":..},...}`.
    pub fn slider_config_json(&self, tuner: bool) -> String {
        let config = if tuner {
            SliderConfig::TUNER
        } else {
            SliderConfig::MODIFIER
        };
        serde_json::to_string(&config).unwrap_or_else(|_| "{}".to_string())
    }

    // ─── Card tuner ──────────────────────────────────────────────────────

    pub fn tuner_set_field(
        &mut self,
        layer: &str,
        target: &str,
        state: &str,
        field: &str,
        value: f64,
    ) -> bool {
        let (Some(layer), Some(target), Some(state), Some(field)) = (
            TunerLayer::from_name(layer),
            TunerTarget::from_key(target),
            StateKind::from_name(state),
            TransformField::from_name(field),
        ) else {
            return false;
        };
        self.tuner.set_field(layer, target, state, field, value);
        true
    }

    pub fn tuner_hover(&mut self, hovered: bool) {
        self.tuner.set_interaction(Interaction::from_hovered(hovered));
    }

    pub fn tuner_tick(&mut self, dt_ms: f64) -> bool {
        self.tuner.tick(dt_ms)
    }

    pub fn tuner_reset(&mut self) {
        self.tuner.reset();
    }

    /// Sampled card and icon poses.
    pub fn tuner_frame_json(&self) -> String {
        serde_json::to_string(&self.tuner.frame()).unwrap_or_else(|_| "[]".to_string())
    }

    /// `{"cards":{"gcp":{...},...},"icons":{...}}`
    pub fn tuner_params_json(&self) -> String {
        serde_json::to_string(self.tuner.params()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn tuner_export_text(&self) -> String {
        self.tuner.export_text()
    }
}

impl AnimatorApp {
    fn dispatch(&mut self, action: Action) -> Option<Notice> {
        let force = matches!(action, Action::CreateProject(_));
        let (next, notice) = std::mem::take(&mut self.state).reduce(action);
        self.state = next;
        if notice.is_none() {
            self.sync_modifier(force);
        }
        notice
    }

    /// Keep the open session in step with the route.
    fn sync_modifier(&mut self, force: bool) {
        let View::Modifier(slug) = self.state.view() else {
            self.modifier = None;
            return;
        };
        let already_open = self.modifier.as_ref().is_some_and(|(open, _)| *open == slug);
        if already_open && !force {
            return;
        }
        if let Some(project) = self.state.project(&slug) {
            self.modifier = Some((slug, ModifierSession::from_project(project.clone())));
        }
    }
}

fn svg_file(name: Option<String>, text: Option<String>) -> Option<SvgFile> {
    name.zip(text).map(|(name, text)| SvgFile::new(name, text))
}

/// Set up a panic hook that forwards panics to `console.error`.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Component Animator WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no app needed) ────────────────────────────────

/// Groups found in one SVG document:
/// `{"envelope":{...},"groups":[{"id":"a","inner":"..."}]}`.
#[wasm_bindgen]
pub fn extract_groups_json(svg: &str) -> String {
    serde_json::to_string(&extract_groups(svg)).unwrap_or_else(|_| r#"{"groups":[]}"#.to_string())
}

/// Check exported variant text. Returns JSON: `{"ok":true,"blocks":N}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_export(text: &str) -> String {
    match parse_export(text) {
        Ok(blocks) => serde_json::json!({ "ok": true, "blocks": blocks.len() }).to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}
