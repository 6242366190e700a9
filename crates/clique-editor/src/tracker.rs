//! Viewport rectangle tracking.
//!
//! Independent of handle batching: the viewport is a single element, so its
//! rectangle is reported as soon as the platform notifies, with no frame
//! delay.

use clique_core::{LayoutElement, Rect, ResizeSource};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type RectSink = Box<dyn FnMut(Rect)>;

/// Reports the viewport's on-screen rectangle on every size change.
pub struct ViewportResizeTracker<R>
where
    R: ResizeSource + 'static,
    R::Element: LayoutElement,
{
    inner: Rc<TrackerInner<R>>,
}

struct TrackerInner<R> {
    source: R,
    current: Cell<Option<Rect>>,
    on_rect: RefCell<RectSink>,
}

impl<R> ViewportResizeTracker<R>
where
    R: ResizeSource + 'static,
    R::Element: LayoutElement,
{
    /// Observe `viewport` itself (not its descendants) through `source`.
    pub fn start(source: R, viewport: &R::Element, on_rect: impl FnMut(Rect) + 'static) -> Self {
        let inner = Rc::new(TrackerInner {
            source,
            current: Cell::new(None),
            on_rect: RefCell::new(Box::new(on_rect)),
        });

        let weak = Rc::downgrade(&inner);
        inner.source.subscribe(Box::new(move |targets: Vec<R::Element>| {
            let (Some(inner), Some(viewport)) = (weak.upgrade(), targets.last()) else {
                return;
            };
            inner.report(viewport.bounding_rect());
        }));
        inner.source.observe(viewport);

        log::debug!("viewport tracker started");
        Self { inner }
    }

    /// Last reported rectangle, if any notification has arrived yet.
    pub fn current_rect(&self) -> Option<Rect> {
        self.inner.current.get()
    }

    pub fn disconnect(&self) {
        self.inner.source.disconnect();
    }
}

impl<R> Drop for ViewportResizeTracker<R>
where
    R: ResizeSource + 'static,
    R::Element: LayoutElement,
{
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<R> TrackerInner<R> {
    fn report(&self, rect: Rect) {
        self.current.set(Some(rect));
        log::trace!(
            "viewport rect ({}, {}) {}x{}",
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height()
        );
        (self.on_rect.borrow_mut())(rect);
    }
}
