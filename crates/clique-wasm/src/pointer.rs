//! Window listeners and the selection-suppressing stylesheet backing a
//! drag session.

use clique_core::{DragHost, EngineConfig};
use gloo_events::EventListener;
use wasm_bindgen::JsValue;
use web_sys::{Element, Event, Window};

pub struct WindowDragHost {
    window: Window,
    move_event: String,
    up_event: String,
}

impl WindowDragHost {
    pub fn new(config: &EngineConfig) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        Ok(Self {
            window,
            move_event: config.move_event.clone(),
            up_event: config.up_event.clone(),
        })
    }

    fn append_style(&self, css: &str) -> Result<Element, JsValue> {
        let document = self
            .window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let head = document
            .head()
            .ok_or_else(|| JsValue::from_str("document has no <head>"))?;
        let style = document.create_element("style")?;
        style.set_text_content(Some(css));
        head.append_child(&style)?;
        Ok(style)
    }
}

impl DragHost for WindowDragHost {
    type Event = Event;
    type MoveListener = EventListener;
    type UpListener = EventListener;
    /// `None` when the stylesheet could not be inserted; the drag still runs.
    type StyleGuard = Option<Element>;

    fn install_style(&self, css: &str) -> Option<Element> {
        self.append_style(css)
            .inspect_err(|err| log::warn!("selection override not installed: {err:?}"))
            .ok()
    }

    fn remove_style(&self, guard: Option<Element>) {
        if let Some(style) = guard {
            style.remove();
        }
    }

    fn listen_move(&self, mut on_move: Box<dyn FnMut(Event)>) -> EventListener {
        EventListener::new(&self.window, self.move_event.clone(), move |event| {
            on_move(event.clone());
        })
    }

    fn unlisten_move(&self, listener: EventListener) {
        drop(listener);
    }

    fn listen_up_once(&self, on_up: Box<dyn FnOnce()>) -> EventListener {
        EventListener::once(&self.window, self.up_event.clone(), move |_| on_up())
    }

    fn unlisten_up(&self, listener: EventListener) {
        drop(listener);
    }
}
