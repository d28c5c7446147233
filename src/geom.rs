//! Pure geometry helpers shared by the hit-tester and the renderer.
//!
//! Everything here works in surface-pixel space. None of these functions
//! return `NaN` for degenerate input: coincident points collapse to a zero
//! angle or an absent perpendicular instead.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

/// A point in normalized video space or surface-pixel space, depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise sum, used to offset a point by a vector.
    #[must_use]
    pub fn offset(self, v: Point) -> Self {
        Self { x: self.x + v.x, y: self.y + v.y }
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Bearing of `to` as seen from `from`, in radians (canvas convention, y down).
#[must_use]
pub fn bearing(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Distance from `point` to the closed segment `[start, end]`.
///
/// The projection parameter is clamped to `[0, 1]`, so points beyond either
/// end measure to the nearest endpoint. A zero-length segment measures to `start`.
#[must_use]
pub fn distance_to_segment(start: Point, end: Point, point: Point) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return distance(start, point);
    }

    let t = (((point.x - start.x) * dx + (point.y - start.y) * dy) / len_sq).clamp(0.0, 1.0);
    let closest = Point::new(t.mul_add(dx, start.x), t.mul_add(dy, start.y));
    distance(closest, point)
}

/// Interior angle at `p2` between rays `p2→p1` and `p2→p3`, in degrees.
///
/// Uses the law of cosines. Returns `0.0` when either arm has zero length, and
/// clamps the cosine to `[-1, 1]` so float drift on collinear input cannot
/// push `acos` out of its domain.
#[must_use]
pub fn angle_at(p1: Point, p2: Point, p3: Point) -> f64 {
    let a = distance(p1, p2);
    let b = distance(p2, p3);
    let c = distance(p1, p3);
    if a <= f64::EPSILON || b <= f64::EPSILON {
        return 0.0;
    }

    let cos = ((a * a + b * b - c * c) / (2.0 * a * b)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Vector perpendicular to `p1→p2`, scaled to `length`.
///
/// The result is the direction rotated 90° clockwise on screen (y down).
/// Returns `None` when `p1 == p2`.
#[must_use]
pub fn perpendicular(p1: Point, p2: Point, length: f64) -> Option<Point> {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let len = dx.hypot(dy);
    if len <= f64::EPSILON {
        return None;
    }
    Some(Point::new(-dy / len * length, dx / len * length))
}
