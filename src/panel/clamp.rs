use crate::config::EDGE_PADDING;
use crate::dom::Viewport;

use super::Point;

/// Keep a `width × height` box at `(x, y)` inside the viewport.
///
/// Each axis is limited to `[padding, viewport - size - padding]`. When the
/// box (plus padding on both sides) is larger than the viewport the result
/// on that axis is `padding` and the box overflows the far edge.
pub fn clamp(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    viewport_width: f64,
    viewport_height: f64,
    padding: f64,
) -> Point {
    let max_x = viewport_width - width - padding;
    let max_y = viewport_height - height - padding;
    Point::new(padding.max(x.min(max_x)), padding.max(y.min(max_y)))
}

/// [`clamp`] with the standard edge padding.
pub fn constrain_to_viewport(x: f64, y: f64, width: f64, height: f64, viewport: Viewport) -> Point {
    clamp(x, y, width, height, viewport.width, viewport.height, EDGE_PADDING)
}
