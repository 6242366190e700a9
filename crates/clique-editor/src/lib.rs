pub mod batcher;
pub mod drag;
pub mod tracker;

pub use batcher::{PendingUpdateSet, ResizeBatcher};
pub use drag::{DragSessionManager, ThrottleState};
pub use tracker::ViewportResizeTracker;
