//! Global pointer-drag sessions.
//!
//! A session runs from `begin_drag` to the next pointer-up:
//!
//! - a page-wide stylesheet disables text selection,
//! - window-level move events are throttled to one `on_move` per frame,
//!   always carrying the most recent event,
//! - on pointer-up every listener, the stylesheet, and any queued frame are
//!   released before `on_end` runs.
//!
//! Sessions are numbered. Listeners and frame callbacks carry the number of
//! the session that installed them and are ignored once it has ended.

use clique_core::{DragHost, EngineConfig, FrameScheduler};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ─── Throttle ────────────────────────────────────────────────────────────

/// Latest-wins buffer between pointer events and frame callbacks.
pub struct ThrottleState<E, H> {
    armed: bool,
    frame: Option<H>,
    latest: Option<E>,
}

impl<E, H> Default for ThrottleState<E, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, H> ThrottleState<E, H> {
    pub fn new() -> Self {
        Self {
            armed: false,
            frame: None,
            latest: None,
        }
    }

    /// Store `event`, overwriting any undelivered one. Returns `true` when
    /// the caller must request a frame (none is queued yet).
    pub fn offer(&mut self, event: E) -> bool {
        self.latest = Some(event);
        !std::mem::replace(&mut self.armed, true)
    }

    /// Keep the handle of the frame requested after `offer` returned `true`.
    pub fn arm(&mut self, frame: H) {
        self.frame = Some(frame);
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Frame fired: disarm and hand out the latest event.
    pub fn take_for_frame(&mut self) -> Option<E> {
        self.armed = false;
        self.frame = None;
        self.latest.take()
    }

    /// Delivery is busy: disarm but keep the event for `take_deferred`.
    pub fn defer(&mut self) {
        self.armed = false;
        self.frame = None;
    }

    /// An event left behind by `defer`. Armed events wait for their frame.
    pub fn take_deferred(&mut self) -> Option<E> {
        if self.armed {
            return None;
        }
        self.latest.take()
    }

    /// Session ended: forget the event and return the frame to cancel.
    pub fn clear(&mut self) -> Option<H> {
        self.armed = false;
        self.latest = None;
        self.frame.take()
    }
}

// ─── Session manager ─────────────────────────────────────────────────────

type MoveSink<E> = Rc<RefCell<Box<dyn FnMut(E)>>>;

struct DragSession<H: DragHost, S: FrameScheduler> {
    id: u64,
    move_listener: H::MoveListener,
    up_listener: H::UpListener,
    style: Option<H::StyleGuard>,
    throttle: ThrottleState<H::Event, S::Handle>,
    on_move: MoveSink<H::Event>,
    on_end: Box<dyn FnOnce()>,
}

/// Owns at most one active drag session.
///
/// State machine: **Idle → Active → Idle**. Dropping the manager tears an
/// active session down without calling its `on_end`.
pub struct DragSessionManager<H, S>
where
    H: DragHost + 'static,
    S: FrameScheduler + 'static,
{
    inner: Rc<DragInner<H, S>>,
}

struct DragInner<H: DragHost, S: FrameScheduler> {
    host: H,
    scheduler: S,
    /// `None` when selection suppression is turned off.
    selection_css: Option<String>,
    session: RefCell<Option<DragSession<H, S>>>,
    next_id: Cell<u64>,
}

impl<H, S> DragSessionManager<H, S>
where
    H: DragHost + 'static,
    S: FrameScheduler + 'static,
{
    pub fn new(host: H, scheduler: S, config: &EngineConfig) -> Self {
        Self {
            inner: Rc::new(DragInner {
                host,
                scheduler,
                selection_css: config
                    .suppress_selection
                    .then(|| config.selection_css.clone()),
                session: RefCell::new(None),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Start a session (Idle → Active).
    ///
    /// Callers serialize drag starts. If a session is somehow still active it
    /// is ended first, `on_end` included, so the style override and
    /// listeners are never held twice.
    pub fn begin_drag(
        &self,
        on_move: impl FnMut(H::Event) + 'static,
        on_end: impl FnOnce() + 'static,
    ) {
        let inner = &self.inner;
        if inner.session.borrow().is_some() {
            log::warn!("drag started while another session is active; ending it first");
            inner.finish(None, true);
        }

        let id = inner.next_id.get();
        inner.next_id.set(id + 1);

        let style = inner
            .selection_css
            .as_deref()
            .map(|css| inner.host.install_style(css));

        let weak = Rc::downgrade(inner);
        let move_listener = inner.host.listen_move(Box::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.on_pointer_move(id, event);
            }
        }));

        let weak = Rc::downgrade(inner);
        let up_listener = inner.host.listen_up_once(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.finish(Some(id), true);
            }
        }));

        *inner.session.borrow_mut() = Some(DragSession {
            id,
            move_listener,
            up_listener,
            style,
            throttle: ThrottleState::new(),
            on_move: Rc::new(RefCell::new(Box::new(on_move))),
            on_end: Box::new(on_end),
        });
        log::debug!("drag session {id} started");
    }

    /// End the active session as if the pointer had been released. Does
    /// nothing when idle.
    pub fn end_drag(&self) {
        self.inner.finish(None, true);
    }

    pub fn is_active(&self) -> bool {
        self.inner.session.borrow().is_some()
    }
}

impl<H, S> Drop for DragSessionManager<H, S>
where
    H: DragHost + 'static,
    S: FrameScheduler + 'static,
{
    fn drop(&mut self) {
        self.inner.finish(None, false);
    }
}

impl<H, S> DragInner<H, S>
where
    H: DragHost + 'static,
    S: FrameScheduler + 'static,
{
    fn on_pointer_move(self: &Rc<Self>, id: u64, event: H::Event) {
        let needs_frame = {
            let mut slot = self.session.borrow_mut();
            let Some(session) = slot.as_mut().filter(|s| s.id == id) else {
                return;
            };
            session.throttle.offer(event)
        };
        if !needs_frame {
            return;
        }

        let weak = Rc::downgrade(self);
        let requested = self.scheduler.request_frame(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.deliver_frame(id);
            }
        }));

        let Some(frame) = requested else {
            log::warn!("frame request refused; delivering pointer move immediately");
            self.deliver_frame(id);
            return;
        };

        let stale = {
            let mut slot = self.session.borrow_mut();
            match slot.as_mut().filter(|s| s.id == id) {
                Some(session) => {
                    session.throttle.arm(frame);
                    None
                }
                None => Some(frame),
            }
        };
        if let Some(frame) = stale {
            self.scheduler.cancel_frame(frame);
        }
    }

    fn deliver_frame(&self, id: u64) {
        let on_move = {
            let slot = self.session.borrow();
            let Some(session) = slot.as_ref().filter(|s| s.id == id) else {
                return;
            };
            Rc::clone(&session.on_move)
        };

        // No session borrow is held while `on_move` runs: it may end the drag.
        let Ok(mut sink) = on_move.try_borrow_mut() else {
            // Re-entered from inside `on_move` after a refused frame request.
            // The running delivery forwards the stored event.
            log::debug!("pointer move delivery re-entered; deferring");
            self.take_event(id, |throttle| {
                throttle.defer();
                None
            });
            return;
        };

        let mut next = self.take_event(id, ThrottleState::take_for_frame);
        while let Some(event) = next {
            (*sink)(event);
            next = self.take_event(id, ThrottleState::take_deferred);
        }
    }

    fn take_event(
        &self,
        id: u64,
        take: impl FnOnce(&mut ThrottleState<H::Event, S::Handle>) -> Option<H::Event>,
    ) -> Option<H::Event> {
        let mut slot = self.session.borrow_mut();
        slot.as_mut()
            .filter(|s| s.id == id)
            .and_then(|session| take(&mut session.throttle))
    }

    /// Tear down the session numbered `id` (or whichever is active, for
    /// `None`). Runs at most once per session.
    fn finish(&self, id: Option<u64>, notify: bool) {
        let session = {
            let mut slot = self.session.borrow_mut();
            let matches = slot
                .as_ref()
                .is_some_and(|s| id.is_none_or(|id| s.id == id));
            if matches { slot.take() } else { None }
        };
        let Some(session) = session else {
            return;
        };

        let DragSession {
            id,
            move_listener,
            up_listener,
            style,
            mut throttle,
            on_end,
            ..
        } = session;

        if let Some(style) = style {
            self.host.remove_style(style);
        }
        self.host.unlisten_move(move_listener);
        self.host.unlisten_up(up_listener);
        if let Some(frame) = throttle.clear() {
            self.scheduler.cancel_frame(frame);
        }
        log::debug!("drag session {id} ended");

        if notify {
            on_end();
        }
    }
}
