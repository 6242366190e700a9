pub mod config;
pub mod geometry;
pub mod id;
pub mod model;
pub mod platform;

pub use config::EngineConfig;
pub use geometry::{normalize, rect_from_xywh, scale_factor};
pub use id::NodeId;
pub use model::HandleUpdate;
pub use platform::{DragHost, FrameScheduler, LayoutElement, ResizeSource, ViewportRef};

// Re-export kurbo geometry so downstream crates agree on one version.
pub use kurbo::{Point, Rect, Size};
