//! DOM-backed implementations of the layout seams, plus the small host
//! helpers the web components call directly.

use clique_core::{LayoutElement, Rect, Size, ViewportRef, rect_from_xywh};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{DomRect, Element, Event, HtmlElement, ShadowRoot};

#[wasm_bindgen]
extern "C" {
    /// The JS `WeakRef` builtin.
    #[wasm_bindgen(js_name = WeakRef)]
    #[derive(Clone)]
    type JsWeakRef;

    #[wasm_bindgen(constructor, js_class = "WeakRef")]
    fn new(target: &Element) -> JsWeakRef;

    #[wasm_bindgen(method, js_class = "WeakRef", js_name = deref)]
    fn target(this: &JsWeakRef) -> JsValue;
}

// ─── Elements ────────────────────────────────────────────────────────────

/// A live DOM element.
#[derive(Clone)]
pub struct DomElement(Element);

impl DomElement {
    pub fn new(element: Element) -> Self {
        Self(element)
    }

    pub fn as_element(&self) -> &Element {
        &self.0
    }
}

impl LayoutElement for DomElement {
    fn attribute(&self, key: &str) -> Option<String> {
        self.0.get_attribute(key)
    }

    fn bounding_rect(&self) -> Rect {
        dom_rect(&self.0.get_bounding_client_rect())
    }

    fn intrinsic_size(&self) -> Size {
        Size::new(
            f64::from(self.0.client_width()),
            f64::from(self.0.client_height()),
        )
    }

    fn query_all(&self, selector: &str) -> Vec<Self> {
        let list = match self.0.query_selector_all(selector) {
            Ok(list) => list,
            Err(err) => {
                log::warn!("bad selector {selector:?}: {err:?}");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(DomElement)
            .collect()
    }

    fn find(&self, selector: &str) -> Option<Self> {
        self.0.query_selector(selector).ok().flatten().map(DomElement)
    }
}

/// Viewport reference that neither keeps the element alive nor outlives
/// its detachment from the document.
#[derive(Clone)]
pub struct WeakViewport(JsWeakRef);

impl WeakViewport {
    pub fn new(viewport: &Element) -> Self {
        Self(JsWeakRef::new(viewport))
    }
}

impl ViewportRef for WeakViewport {
    type Element = DomElement;

    fn upgrade(&self) -> Option<DomElement> {
        let element = self.0.target().dyn_into::<Element>().ok()?;
        element.is_connected().then(|| DomElement(element))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

pub fn dom_rect(rect: &DomRect) -> Rect {
    rect_from_xywh(rect.x(), rect.y(), rect.width(), rect.height())
}

/// `[x, y, width, height]`, the shape the components consume.
pub fn rect_to_array(rect: Rect) -> [f64; 4] {
    [rect.x0, rect.y0, rect.width(), rect.height()]
}

// ─── Host helpers ────────────────────────────────────────────────────────

/// Look up the viewport element inside a component's shadow root.
pub fn find_viewport(shadow_root: &ShadowRoot, selector: &str) -> Result<Element, JsValue> {
    shadow_root
        .query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("no viewport matching {selector:?}")))
}

/// Set an inline custom property on the shadow root's host element.
pub fn set_host_property(
    shadow_root: &ShadowRoot,
    property: &str,
    value: &str,
) -> Result<(), JsValue> {
    match shadow_root.host().dyn_ref::<HtmlElement>() {
        Some(host) => host.style().set_property(property, value),
        None => Ok(()),
    }
}

#[wasm_bindgen]
pub fn prevent_default(event: &Event, yes: bool) {
    if yes {
        event.prevent_default();
    }
}

#[wasm_bindgen]
pub fn stop_propagation(event: &Event, yes: bool) {
    if yes {
        event.stop_propagation();
    }
}

/// Bounds of the first `<clique-viewport>` on the page as
/// `[x, y, width, height]`, or zeros when there is none.
#[wasm_bindgen]
pub fn measure_viewport() -> Vec<f64> {
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.query_selector("clique-viewport").ok().flatten())
        .map(|viewport| rect_to_array(dom_rect(&viewport.get_bounding_client_rect())))
        .unwrap_or([0.0; 4])
        .to_vec()
}
