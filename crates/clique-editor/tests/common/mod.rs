//! In-memory stand-ins for the browser: an element tree, a resize observer,
//! a manually ticked frame clock, and window-level drag listeners.

#![allow(dead_code)]

use clique_core::{
    DragHost, FrameScheduler, LayoutElement, Point, Rect, ResizeSource, Size, ViewportRef,
    rect_from_xywh,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

// ─── Elements ────────────────────────────────────────────────────────────

pub struct Node {
    tag: String,
    attrs: RefCell<HashMap<String, String>>,
    rect: Cell<Rect>,
    intrinsic: Cell<Size>,
    children: RefCell<Vec<El>>,
}

#[derive(Clone)]
pub struct El(Rc<Node>);

impl El {
    pub fn new(tag: &str) -> Self {
        El(Rc::new(Node {
            tag: tag.to_string(),
            attrs: RefCell::new(HashMap::new()),
            rect: Cell::new(Rect::ZERO),
            intrinsic: Cell::new(Size::ZERO),
            children: RefCell::new(Vec::new()),
        }))
    }

    pub fn attr(self, key: &str, value: &str) -> Self {
        self.0
            .attrs
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn at(self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.set_rect(x, y, width, height);
        self
    }

    pub fn set_rect(&self, x: f64, y: f64, width: f64, height: f64) {
        self.0.rect.set(rect_from_xywh(x, y, width, height));
    }

    pub fn set_intrinsic(&self, width: f64, height: f64) {
        self.0.intrinsic.set(Size::new(width, height));
    }

    pub fn child(self, child: &El) -> Self {
        self.0.children.borrow_mut().push(child.clone());
        self
    }

    pub fn downgrade(&self) -> WeakEl {
        WeakEl(Rc::downgrade(&self.0))
    }

    fn matches(&self, selector: &str) -> bool {
        match selector.strip_prefix('#') {
            Some(id) => self.0.attrs.borrow().get("id").is_some_and(|v| v == id),
            None => self.0.tag == selector,
        }
    }

    fn collect(&self, selector: &str, out: &mut Vec<El>) {
        for child in self.0.children.borrow().iter() {
            if child.matches(selector) {
                out.push(child.clone());
            }
            child.collect(selector, out);
        }
    }
}

impl LayoutElement for El {
    fn attribute(&self, key: &str) -> Option<String> {
        self.0.attrs.borrow().get(key).cloned()
    }

    fn bounding_rect(&self) -> Rect {
        self.0.rect.get()
    }

    fn intrinsic_size(&self) -> Size {
        self.0.intrinsic.get()
    }

    fn query_all(&self, selector: &str) -> Vec<Self> {
        let mut out = Vec::new();
        self.collect(selector, &mut out);
        out
    }
}

pub struct WeakEl(Weak<Node>);

impl ViewportRef for WeakEl {
    type Element = El;

    fn upgrade(&self) -> Option<El> {
        self.0.upgrade().map(El)
    }
}

/// A node element with one handle per `(name, x, y)`, each 10x10 and
/// centered on `(x, y)`.
pub fn node_with_handles(id: &str, handles: &[(&str, f64, f64)]) -> (El, Vec<El>) {
    let mut node = El::new("clique-node").attr("id", id);
    let mut made = Vec::new();
    for &(name, x, y) in handles {
        let handle = El::new("clique-handle")
            .attr("name", name)
            .at(x - 5.0, y - 5.0, 10.0, 10.0);
        node = node.child(&handle);
        made.push(handle);
    }
    (node, made)
}

pub fn move_handle(handle: &El, x: f64, y: f64) {
    handle.set_rect(x - 5.0, y - 5.0, 10.0, 10.0);
}

// ─── Resize observer ─────────────────────────────────────────────────────

type ResizeSink = Box<dyn FnMut(Vec<El>)>;

#[derive(Default)]
pub struct ResizeState {
    sink: RefCell<Option<ResizeSink>>,
    observed: RefCell<Vec<El>>,
    disconnected: Cell<bool>,
}

#[derive(Clone, Default)]
pub struct FakeResize(Rc<ResizeState>);

impl FakeResize {
    /// Deliver one notification batch, as the observer would within a task.
    pub fn notify(&self, targets: &[El]) {
        if self.0.disconnected.get() {
            return;
        }
        let sink = self.0.sink.borrow_mut().take();
        if let Some(mut sink) = sink {
            sink(targets.to_vec());
            self.0.sink.borrow_mut().get_or_insert(sink);
        }
    }

    pub fn observed_count(&self) -> usize {
        self.0.observed.borrow().len()
    }

    pub fn is_disconnected(&self) -> bool {
        self.0.disconnected.get()
    }
}

impl ResizeSource for FakeResize {
    type Element = El;

    fn subscribe(&self, sink: ResizeSink) {
        *self.0.sink.borrow_mut() = Some(sink);
    }

    fn observe(&self, element: &El) {
        let mut observed = self.0.observed.borrow_mut();
        if !observed.iter().any(|e| Rc::ptr_eq(&e.0, &element.0)) {
            observed.push(element.clone());
        }
    }

    fn disconnect(&self) {
        self.0.disconnected.set(true);
        self.0.observed.borrow_mut().clear();
    }
}

// ─── Frame clock ─────────────────────────────────────────────────────────

type FrameCallback = Box<dyn FnOnce()>;

#[derive(Default)]
pub struct FramesState {
    queue: RefCell<Vec<(u64, FrameCallback)>>,
    next: Cell<u64>,
    refuse: Cell<bool>,
    cancelled: Cell<usize>,
}

#[derive(Clone, Default)]
pub struct ManualFrames(Rc<FramesState>);

impl ManualFrames {
    /// Fire every callback queued before this tick. Returns how many ran.
    pub fn tick(&self) -> usize {
        let due = std::mem::take(&mut *self.0.queue.borrow_mut());
        let count = due.len();
        for (_, callback) in due {
            callback();
        }
        count
    }

    pub fn queued(&self) -> usize {
        self.0.queue.borrow().len()
    }

    pub fn cancelled(&self) -> usize {
        self.0.cancelled.get()
    }

    /// Make subsequent requests fail, as a headless page might.
    pub fn refuse_requests(&self) {
        self.0.refuse.set(true);
    }
}

impl FrameScheduler for ManualFrames {
    type Handle = u64;

    fn request_frame(&self, callback: FrameCallback) -> Option<u64> {
        if self.0.refuse.get() {
            return None;
        }
        let id = self.0.next.get();
        self.0.next.set(id + 1);
        self.0.queue.borrow_mut().push((id, callback));
        Some(id)
    }

    fn cancel_frame(&self, handle: u64) {
        let mut queue = self.0.queue.borrow_mut();
        let before = queue.len();
        queue.retain(|(id, _)| *id != handle);
        if queue.len() < before {
            self.0.cancelled.set(self.0.cancelled.get() + 1);
        }
    }
}

// ─── Drag host ───────────────────────────────────────────────────────────

type MoveSink = Rc<RefCell<Box<dyn FnMut(Point)>>>;

#[derive(Default)]
pub struct HostState {
    next: Cell<u64>,
    styles: RefCell<Vec<(u64, String)>>,
    moves: RefCell<Vec<(u64, MoveSink)>>,
    ups: RefCell<Vec<(u64, Box<dyn FnOnce()>)>>,
    /// Teardown steps in the order they happened.
    log: RefCell<Vec<String>>,
    /// Removals of something that was not installed.
    violations: RefCell<Vec<String>>,
}

#[derive(Clone, Default)]
pub struct FakeHost(Rc<HostState>);

impl FakeHost {
    fn next_id(&self) -> u64 {
        let id = self.0.next.get();
        self.0.next.set(id + 1);
        id
    }

    pub fn pointer_move(&self, x: f64, y: f64) {
        let sinks: Vec<MoveSink> = self.0.moves.borrow().iter().map(|(_, s)| s.clone()).collect();
        for sink in sinks {
            (sink.borrow_mut())(Point::new(x, y));
        }
    }

    /// Fire pointer-up. One-shot listeners are consumed, as with `{ once: true }`.
    pub fn pointer_up(&self) {
        let ups = std::mem::take(&mut *self.0.ups.borrow_mut());
        for (_, on_up) in ups {
            on_up();
        }
    }

    pub fn style_count(&self) -> usize {
        self.0.styles.borrow().len()
    }

    pub fn style_css(&self) -> Option<String> {
        self.0.styles.borrow().first().map(|(_, css)| css.clone())
    }

    pub fn move_listener_count(&self) -> usize {
        self.0.moves.borrow().len()
    }

    pub fn up_listener_count(&self) -> usize {
        self.0.ups.borrow().len()
    }

    pub fn log(&self) -> Vec<String> {
        self.0.log.borrow().clone()
    }

    pub fn record(&self, entry: &str) {
        self.0.log.borrow_mut().push(entry.to_string());
    }

    pub fn violations(&self) -> Vec<String> {
        self.0.violations.borrow().clone()
    }
}

impl DragHost for FakeHost {
    type Event = Point;
    type MoveListener = u64;
    type UpListener = u64;
    type StyleGuard = u64;

    fn install_style(&self, css: &str) -> u64 {
        let id = self.next_id();
        self.0.styles.borrow_mut().push((id, css.to_string()));
        id
    }

    fn remove_style(&self, guard: u64) {
        let mut styles = self.0.styles.borrow_mut();
        let before = styles.len();
        styles.retain(|(id, _)| *id != guard);
        if styles.len() == before {
            self.0.violations.borrow_mut().push(format!("style {guard}"));
        }
        self.0.log.borrow_mut().push("remove style".to_string());
    }

    fn listen_move(&self, on_move: Box<dyn FnMut(Point)>) -> u64 {
        let id = self.next_id();
        self.0.moves.borrow_mut().push((id, Rc::new(RefCell::new(on_move))));
        id
    }

    fn unlisten_move(&self, listener: u64) {
        let mut moves = self.0.moves.borrow_mut();
        let before = moves.len();
        moves.retain(|(id, _)| *id != listener);
        if moves.len() == before {
            self.0.violations.borrow_mut().push(format!("move {listener}"));
        }
        self.0.log.borrow_mut().push("remove move".to_string());
    }

    fn listen_up_once(&self, on_up: Box<dyn FnOnce()>) -> u64 {
        let id = self.next_id();
        self.0.ups.borrow_mut().push((id, on_up));
        id
    }

    fn unlisten_up(&self, listener: u64) {
        self.0.ups.borrow_mut().retain(|(id, _)| *id != listener);
    }
}
