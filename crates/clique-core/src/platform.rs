//! Platform seams.
//!
//! The engine never touches the DOM directly. Everything it needs from the
//! host page goes through these traits: the browser bindings implement them
//! over `web-sys`, tests implement them over an in-memory element tree and a
//! manually ticked frame clock.

use kurbo::{Rect, Size};

/// Read-only view of a laid-out element.
pub trait LayoutElement: Clone {
    /// Attribute value, or `None` if the attribute is absent.
    fn attribute(&self, key: &str) -> Option<String>;

    /// On-screen bounding box in page coordinates.
    fn bounding_rect(&self) -> Rect;

    /// Unscaled content-box size (`clientWidth` x `clientHeight`).
    fn intrinsic_size(&self) -> Size;

    /// All descendants matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self>;

    /// First descendant matching `selector`.
    fn find(&self, selector: &str) -> Option<Self> {
        self.query_all(selector).into_iter().next()
    }
}

/// Non-owning reference to the viewport element.
///
/// `upgrade` returns `None` once the viewport has been detached or
/// collected; holders treat that as "inert", never as an error.
pub trait ViewportRef {
    type Element: LayoutElement;

    fn upgrade(&self) -> Option<Self::Element>;
}

/// A resize-change observer over a set of elements.
///
/// The sink receives the elements whose size changed, one call per platform
/// notification batch.
pub trait ResizeSource {
    type Element;

    /// Install the notification sink, replacing any previous one.
    fn subscribe(&self, sink: Box<dyn FnMut(Vec<Self::Element>)>);

    /// Start watching `element`. Watching an element twice is harmless.
    fn observe(&self, element: &Self::Element);

    /// Stop all observation. No notifications are delivered afterwards.
    fn disconnect(&self);
}

/// One-shot "next refresh" callbacks.
pub trait FrameScheduler {
    /// Keeps a request alive; passing it to `cancel_frame` revokes it.
    type Handle;

    /// Queue `callback` for the next display refresh. Returns `None` if the
    /// platform refused, in which case the callback was dropped unrun.
    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> Option<Self::Handle>;

    fn cancel_frame(&self, handle: Self::Handle);
}

/// Window-level listeners and the document-level style override that a drag
/// session holds for its lifetime.
pub trait DragHost {
    /// Pointer event delivered to move callbacks.
    type Event: 'static;
    type MoveListener;
    type UpListener;
    type StyleGuard;

    /// Append a page-wide stylesheet with the given body.
    fn install_style(&self, css: &str) -> Self::StyleGuard;
    fn remove_style(&self, guard: Self::StyleGuard);

    fn listen_move(&self, on_move: Box<dyn FnMut(Self::Event)>) -> Self::MoveListener;
    fn unlisten_move(&self, listener: Self::MoveListener);

    /// Listen for the next pointer-up only.
    fn listen_up_once(&self, on_up: Box<dyn FnOnce()>) -> Self::UpListener;

    /// Remove the pointer-up listener. Must be a no-op if it already fired.
    fn unlisten_up(&self, listener: Self::UpListener);
}
