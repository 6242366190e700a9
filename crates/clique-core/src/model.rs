//! Values emitted by the engine to the interaction policy layer.

use crate::id::NodeId;
use kurbo::Point;
use serde::Serialize;

/// New position of one named handle, in viewport-normalized coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandleUpdate {
    pub node: NodeId,
    pub handle: String,
    pub x: f64,
    pub y: f64,
}

impl HandleUpdate {
    pub fn new(node: NodeId, handle: impl Into<String>, at: Point) -> Self {
        Self {
            node,
            handle: handle.into(),
            x: at.x,
            y: at.y,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
