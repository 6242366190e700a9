//! Viewport-normalized coordinates.
//!
//! The viewport may be CSS-scaled (zoom, transforms), so its on-screen
//! rectangle and its intrinsic content box differ by a scale factor. Handle
//! positions are reported in the intrinsic space so that node/edge state is
//! independent of the current zoom level.

use kurbo::{Point, Rect, Size};

/// Build a rectangle from the `(x, y, width, height)` form the DOM reports.
pub fn rect_from_xywh(x: f64, y: f64, width: f64, height: f64) -> Rect {
    Rect::from_origin_size((x, y), (width, height))
}

/// Ratio between the viewport's on-screen size and its intrinsic size.
///
/// The intrinsic size is clamped to at least 1 so an element that is not laid
/// out yet never divides by zero. An axis whose ratio is still not a positive
/// finite number (a collapsed viewport) scales by 1.
pub fn scale_factor(viewport: Rect, intrinsic: Size) -> (f64, f64) {
    (
        axis_scale(viewport.width(), intrinsic.width),
        axis_scale(viewport.height(), intrinsic.height),
    )
}

fn axis_scale(on_screen: f64, intrinsic: f64) -> f64 {
    let scale = on_screen / intrinsic.max(1.0);
    if scale > 0.0 && scale.is_finite() {
        scale
    } else {
        1.0
    }
}

/// Center of `handle` expressed in the viewport's intrinsic coordinate space.
pub fn normalize(viewport: Rect, intrinsic: Size, handle: Rect) -> Point {
    let (scale_x, scale_y) = scale_factor(viewport, intrinsic);
    let center = handle.center();
    Point::new(
        (center.x - viewport.x0) / scale_x,
        (center.y - viewport.y0) / scale_y,
    )
}
