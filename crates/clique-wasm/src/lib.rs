//! WASM bridge for Clique — exposes the viewport engine to the
//! `<clique-viewport>` web component.
//!
//! Compiled via `wasm-pack build --target web`. The component constructs one
//! [`CliqueViewport`] per shadow root; everything else (node state, edge
//! creation, what a drag *means*) stays on the JS side.

mod dom;
mod frames;
mod observer;
mod pointer;

use clique_core::{EngineConfig, HandleUpdate, ViewportRef};
use clique_editor::{DragSessionManager, ResizeBatcher, ViewportResizeTracker};
use dom::{DomElement, WeakViewport, find_viewport, rect_to_array, set_host_property};
use frames::RafScheduler;
use gloo_events::EventListener;
use js_sys::{Array, Function};
use observer::DomResizeSource;
use pointer::WindowDragHost;
use wasm_bindgen::prelude::*;
use web_sys::{Element, ShadowRoot};

pub use dom::{measure_viewport, prevent_default, stop_propagation};

/// Per-component controller: handle tracking, viewport tracking, and drag
/// sessions for one `<clique-viewport>`.
#[wasm_bindgen]
pub struct CliqueViewport {
    shadow_root: ShadowRoot,
    viewport: WeakViewport,
    handles: ResizeBatcher<DomResizeSource, WeakViewport, RafScheduler>,
    tracker: Option<ViewportResizeTracker<DomResizeSource>>,
    drags: DragSessionManager<WindowDragHost, RafScheduler>,
    host_listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl CliqueViewport {
    /// Start tracking handles inside `shadow_root`.
    ///
    /// `on_updates` receives one array per frame of `[node, handle, x, y]`
    /// tuples. `config` is an optional JSON object overriding
    /// [`EngineConfig`] fields (camelCase keys).
    #[wasm_bindgen(constructor)]
    pub fn new(
        shadow_root: ShadowRoot,
        on_updates: Function,
        config: Option<String>,
    ) -> Result<CliqueViewport, JsValue> {
        console_error_panic_hook_setup();

        let config = parse_config(config.as_deref()).map_err(|e| JsValue::from_str(&e))?;
        let viewport = WeakViewport::new(&find_viewport(&shadow_root, &config.viewport_selector)?);

        let handles = ResizeBatcher::start(
            DomResizeSource::new(),
            viewport.clone(),
            RafScheduler,
            &config,
            move |updates| {
                if let Err(err) = on_updates.call1(&JsValue::NULL, &updates_to_js(&updates)) {
                    log::warn!("handle update callback threw: {err:?}");
                }
            },
        );
        let drags = DragSessionManager::new(WindowDragHost::new(&config)?, RafScheduler, &config);

        Ok(Self {
            shadow_root,
            viewport,
            handles,
            tracker: None,
            drags,
            host_listeners: Vec::new(),
        })
    }

    /// Register a node element; its handles are re-measured whenever it
    /// resizes.
    pub fn observe_node(&self, node: Element) {
        self.handles.observe(&DomElement::new(node));
    }

    /// Report the viewport rectangle as `[x, y, width, height]` on every
    /// change. Replaces an earlier tracker. Returns `false` if the viewport
    /// is already gone.
    pub fn track_viewport(&mut self, on_rect: Function) -> bool {
        let Some(viewport) = self.viewport.upgrade() else {
            return false;
        };
        let tracker = ViewportResizeTracker::start(DomResizeSource::new(), &viewport, move |rect| {
            let [x, y, width, height] = rect_to_array(rect);
            let tuple = Array::of4(&x.into(), &y.into(), &width.into(), &height.into());
            if let Err(err) = on_rect.call1(&JsValue::NULL, &tuple) {
                log::warn!("viewport callback threw: {err:?}");
            }
        });
        self.tracker = Some(tracker);
        true
    }

    /// Start a page-wide drag. `on_move` receives at most one pointer event
    /// per frame; `on_end` runs once, after cleanup, on pointer-up.
    pub fn begin_drag(&self, on_move: Function, on_end: Function) {
        self.drags.begin_drag(
            move |event| {
                if let Err(err) = on_move.call1(&JsValue::NULL, &event) {
                    log::warn!("drag move callback threw: {err:?}");
                }
            },
            move || {
                if let Err(err) = on_end.call0(&JsValue::NULL) {
                    log::warn!("drag end callback threw: {err:?}");
                }
            },
        );
    }

    /// End the active drag as if the pointer had been released.
    pub fn end_drag(&self) {
        self.drags.end_drag();
    }

    pub fn is_dragging(&self) -> bool {
        self.drags.is_active()
    }

    /// Set a CSS custom property on the component host (pan/zoom vars).
    pub fn set_css_property(&self, property: &str, value: &str) -> Result<(), JsValue> {
        set_host_property(&self.shadow_root, property, value)
    }

    /// Listen for `name` on the component host for the controller's lifetime.
    pub fn add_host_listener(&mut self, name: String, handler: Function) {
        let host = self.shadow_root.host();
        let listener = EventListener::new(&host, name, move |event| {
            if let Err(err) = handler.call1(&JsValue::NULL, event) {
                log::warn!("host listener threw: {err:?}");
            }
        });
        self.host_listeners.push(listener);
    }

    /// Stop every observer and listener and end any drag.
    pub fn disconnect(&mut self) {
        self.handles.disconnect();
        if let Some(tracker) = self.tracker.take() {
            tracker.disconnect();
        }
        self.drags.end_drag();
        self.host_listeners.clear();
    }
}

// ─── Conversions ─────────────────────────────────────────────────────────

/// Parse an optional JSON config; absent means all defaults.
fn parse_config(json: Option<&str>) -> Result<EngineConfig, String> {
    match json {
        None => Ok(EngineConfig::default()),
        Some(text) if text.trim().is_empty() => Ok(EngineConfig::default()),
        Some(text) => serde_json::from_str(text).map_err(|e| format!("invalid config: {e}")),
    }
}

fn updates_to_js(updates: &[HandleUpdate]) -> Array {
    updates
        .iter()
        .map(|u| {
            Array::of4(
                &JsValue::from_str(u.node.as_str()),
                &JsValue::from_str(&u.handle),
                &JsValue::from_f64(u.x),
                &JsValue::from_f64(u.y),
            )
        })
        .collect()
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Clique WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
