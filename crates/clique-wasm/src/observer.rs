//! `ResizeObserver` as a [`ResizeSource`].

use crate::dom::DomElement;
use clique_core::ResizeSource;
use js_sys::Array;
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{ResizeObserver, ResizeObserverEntry};

type EntriesCallback = Closure<dyn FnMut(Array)>;

/// One browser `ResizeObserver` plus the closure it calls into.
///
/// The closure must outlive the observer, so both live here and are
/// replaced together on `subscribe`.
#[derive(Default)]
pub struct DomResizeSource {
    observer: RefCell<Option<ResizeObserver>>,
    callback: RefCell<Option<EntriesCallback>>,
}

impl DomResizeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResizeSource for DomResizeSource {
    type Element = DomElement;

    fn subscribe(&self, mut sink: Box<dyn FnMut(Vec<DomElement>)>) {
        self.disconnect();

        let callback = Closure::<dyn FnMut(Array)>::new(move |entries: Array| {
            let targets = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<ResizeObserverEntry>().ok())
                .map(|entry| DomElement::new(entry.target()))
                .collect();
            sink(targets);
        });

        match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => {
                *self.observer.borrow_mut() = Some(observer);
                *self.callback.borrow_mut() = Some(callback);
            }
            Err(err) => log::warn!("ResizeObserver unavailable: {err:?}"),
        }
    }

    fn observe(&self, element: &DomElement) {
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer.observe(element.as_element());
        }
    }

    fn disconnect(&self) {
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer.disconnect();
        }
    }
}
