use crate::geometry::Point;

/// Control points of the horizontal-biased cubic curve drawn for a link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkCurve {
    pub start: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub end: Point,
}

impl LinkCurve {
    /// Curve from `start` to `end`; control points extend horizontally by
    /// half the horizontal distance, but never less than `min_offset * zoom`.
    /// Returns `None` when the endpoints are too close for a curve to look right.
    pub fn between(start: Point, end: Point, zoom: f32, min_offset: f32) -> Option<Self> {
        let d = end - start;
        let threshold = 10.0 * zoom;
        if d.x * d.x + d.y * d.y < threshold * threshold {
            return None;
        }

        let offset = (d.x.abs() * 0.5).max(min_offset * zoom);
        Some(Self {
            start,
            ctrl1: start.offset(offset, 0.0),
            ctrl2: end.offset(-offset, 0.0),
            end,
        })
    }
}

/// SVG path command for the pending link between two anchors.
///
/// Short links are drawn as a straight line to avoid zig-zags.
///
/// # Returns
/// SVG path command string (e.g., "M 10 20 C 60 20 90 80 140 80")
pub fn generate_bezier_path(start: Point, end: Point, zoom: f32, min_offset: f32) -> String {
    match LinkCurve::between(start, end, zoom, min_offset) {
        Some(c) => format!(
            "M {} {} C {} {} {} {} {} {}",
            c.start.x, c.start.y, c.ctrl1.x, c.ctrl1.y, c.ctrl2.x, c.ctrl2.y, c.end.x, c.end.y
        ),
        None => format!("M {} {} L {} {}", start.x, start.y, end.x, end.y),
    }
}
