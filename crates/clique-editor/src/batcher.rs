//! Resize batching: raw resize notifications → one handle-update batch per
//! display refresh.
//!
//! A single resize observer watches every node in the viewport. Notifications
//! can arrive many times per frame (a node animating its size, a burst of
//! nodes mounting), so the batcher only records *which* nodes changed and
//! measures their handles once, on the next animation frame:
//!
//! ```text
//! notify ─┐
//! notify ─┼─► PendingUpdateSet ──(next frame)──► flush ──► on_updates(batch)
//! notify ─┘
//! ```
//!
//! The viewport is held through a [`ViewportRef`]. Once it is gone, flushes
//! silently do nothing.

use clique_core::{
    EngineConfig, FrameScheduler, HandleUpdate, LayoutElement, NodeId, ResizeSource, ViewportRef,
    normalize,
};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Handle elements of one node.
pub type HandleList<E> = SmallVec<[E; 4]>;

type UpdateSink = Box<dyn FnMut(Vec<HandleUpdate>)>;

// ─── Pending set ─────────────────────────────────────────────────────────

/// Nodes observed to have resized since the last flush, in first-seen order.
///
/// Re-inserting a node replaces its handle list but keeps its position, so a
/// flush reports nodes in the order they first changed.
pub struct PendingUpdateSet<E> {
    entries: Vec<(NodeId, HandleList<E>)>,
    index: HashMap<NodeId, usize>,
}

impl<E> Default for PendingUpdateSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> PendingUpdateSet<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Record the current handles of `node`, replacing any earlier entry.
    pub fn insert(&mut self, node: NodeId, handles: HandleList<E>) {
        match self.index.get(&node) {
            Some(&slot) => self.entries[slot].1 = handles,
            None => {
                self.index.insert(node, self.entries.len());
                self.entries.push((node, handles));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|(node, _)| *node)
    }

    /// Take every entry, leaving the set empty.
    pub fn drain(&mut self) -> Vec<(NodeId, HandleList<E>)> {
        self.index.clear();
        std::mem::take(&mut self.entries)
    }
}

// ─── Batcher ─────────────────────────────────────────────────────────────

/// Coalesces node resize notifications into per-frame handle updates.
///
/// Returned by [`ResizeBatcher::start`]; it is the observation handle that
/// nodes are registered through. Dropping it disconnects the observer and
/// cancels a scheduled flush.
pub struct ResizeBatcher<R, V, S>
where
    R: ResizeSource<Element = V::Element> + 'static,
    V: ViewportRef + 'static,
    S: FrameScheduler + 'static,
{
    inner: Rc<BatcherInner<R, V, S>>,
}

struct BatcherInner<R, V: ViewportRef, S: FrameScheduler> {
    source: R,
    viewport: V,
    scheduler: S,
    handle_selector: String,
    node_id_attribute: String,
    handle_name_attribute: String,
    pending: RefCell<PendingUpdateSet<V::Element>>,
    /// Sole gate for flush scheduling: at most one flush is queued at a time.
    scheduled: Cell<bool>,
    frame: RefCell<Option<S::Handle>>,
    on_updates: RefCell<UpdateSink>,
}

impl<R, V, S> ResizeBatcher<R, V, S>
where
    R: ResizeSource<Element = V::Element> + 'static,
    V: ViewportRef + 'static,
    S: FrameScheduler + 'static,
{
    /// Subscribe to `source` and start batching.
    ///
    /// `on_updates` receives one non-empty batch per flush, ordered by node
    /// (first-seen) and then by handle (document order within the node).
    pub fn start(
        source: R,
        viewport: V,
        scheduler: S,
        config: &EngineConfig,
        on_updates: impl FnMut(Vec<HandleUpdate>) + 'static,
    ) -> Self {
        let inner = Rc::new(BatcherInner {
            source,
            viewport,
            scheduler,
            handle_selector: config.handle_selector.clone(),
            node_id_attribute: config.node_id_attribute.clone(),
            handle_name_attribute: config.handle_name_attribute.clone(),
            pending: RefCell::new(PendingUpdateSet::new()),
            scheduled: Cell::new(false),
            frame: RefCell::new(None),
            on_updates: RefCell::new(Box::new(on_updates)),
        });

        let weak = Rc::downgrade(&inner);
        inner.source.subscribe(Box::new(move |targets| {
            if let Some(inner) = weak.upgrade() {
                inner.enqueue(targets);
            }
        }));

        log::debug!("resize batcher started (handles: {})", inner.handle_selector);
        Self { inner }
    }

    /// Register a node element for resize notification.
    pub fn observe(&self, node: &V::Element) {
        self.inner.source.observe(node);
    }

    pub fn is_flush_scheduled(&self) -> bool {
        self.inner.scheduled.get()
    }

    /// Nodes waiting for the next flush, in first-seen order.
    pub fn pending_nodes(&self) -> Vec<NodeId> {
        self.inner.pending.borrow().nodes().collect()
    }

    /// Stop observing, cancel a scheduled flush, and drop pending entries.
    pub fn disconnect(&self) {
        self.inner.source.disconnect();
        self.inner.scheduled.set(false);
        let frame = self.inner.frame.borrow_mut().take();
        if let Some(frame) = frame {
            self.inner.scheduler.cancel_frame(frame);
        }
        self.inner.pending.borrow_mut().drain();
        log::debug!("resize batcher disconnected");
    }
}

impl<R, V, S> Drop for ResizeBatcher<R, V, S>
where
    R: ResizeSource<Element = V::Element> + 'static,
    V: ViewportRef + 'static,
    S: FrameScheduler + 'static,
{
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<R, V, S> BatcherInner<R, V, S>
where
    R: ResizeSource<Element = V::Element> + 'static,
    V: ViewportRef + 'static,
    S: FrameScheduler + 'static,
{
    /// Observer callback: record changed nodes, then make sure a flush is
    /// queued.
    fn enqueue(self: &Rc<Self>, targets: Vec<V::Element>) {
        let has_pending = {
            let mut pending = self.pending.borrow_mut();
            for target in targets {
                let id = target.attribute(&self.node_id_attribute);
                let Some(node) = NodeId::from_attribute(id.as_deref()) else {
                    continue;
                };
                let handles: HandleList<_> = target
                    .query_all(&self.handle_selector)
                    .into_iter()
                    .collect();
                if handles.is_empty() {
                    continue;
                }
                pending.insert(node, handles);
            }
            !pending.is_empty()
        };

        if has_pending {
            self.schedule_flush();
        }
    }

    fn schedule_flush(self: &Rc<Self>) {
        if self.scheduled.replace(true) {
            return;
        }

        let weak = Rc::downgrade(self);
        let requested = self.scheduler.request_frame(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.flush();
            }
        }));

        match requested {
            Some(frame) => *self.frame.borrow_mut() = Some(frame),
            None => {
                log::warn!("frame request refused; flushing resize batch immediately");
                self.flush();
            }
        }
    }

    fn flush(&self) {
        // Reopen the gate first: notifications raised while `on_updates`
        // runs must queue a fresh frame, not wait on this one.
        self.scheduled.set(false);
        self.frame.borrow_mut().take();

        let Ok(mut on_updates) = self.on_updates.try_borrow_mut() else {
            // Re-entered from inside `on_updates` after a refused frame
            // request. The running flush picks the pending entries up.
            log::debug!("flush re-entered during delivery; deferring");
            return;
        };

        loop {
            let updates = self.collect();
            if !updates.is_empty() {
                log::trace!("flushing {} handle update(s)", updates.len());
                (*on_updates)(updates);
            }
            if self.scheduled.get() || self.pending.borrow().is_empty() {
                return;
            }
        }
    }

    /// Drain the pending set into normalized updates.
    fn collect(&self) -> Vec<HandleUpdate> {
        let Some(viewport) = self.viewport.upgrade() else {
            let dropped = self.pending.borrow_mut().drain().len();
            log::trace!("viewport gone; discarding {dropped} pending node(s)");
            return Vec::new();
        };

        let entries = self.pending.borrow_mut().drain();
        if entries.is_empty() {
            return Vec::new();
        }

        let viewport_rect = viewport.bounding_rect();
        let intrinsic = viewport.intrinsic_size();

        let mut updates = Vec::new();
        for (node, handles) in entries {
            for handle in handles {
                let Some(name) = handle
                    .attribute(&self.handle_name_attribute)
                    .filter(|name| !name.is_empty())
                else {
                    continue;
                };
                let at = normalize(viewport_rect, intrinsic, handle.bounding_rect());
                updates.push(HandleUpdate::new(node, name, at));
            }
        }
        updates
    }
}
