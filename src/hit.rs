//! Erase hit-testing.
//!
//! Decides which strokes the erase cursor touches. All distances are measured
//! in surface pixels, after mapping each stroke's normalized points through
//! the viewport.
//!
//! Angle and right-angle measurements are never hit, so they survive
//! erasing; they can only be removed by undo.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::{Stroke, ToolKind};
use crate::geom::{Point, distance, distance_to_segment};
use crate::viewport::Viewport;

/// Relative slack on the erase boundary, absorbing the rounding of the
/// surface -> normalized -> surface round trip.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// `d <= limit`, treating distances one rounding step past the limit as inside.
fn within(d: f64, limit: f64) -> bool {
    d <= limit + limit.abs().max(1.0) * BOUNDARY_EPSILON
}

/// Indices of every stroke hit by an erase cursor of `radius` surface pixels at `cursor`.
///
/// `cursor` is in surface pixels. Indices are ascending (draw order).
#[must_use]
pub fn hit_test(strokes: &[Stroke], cursor: Point, radius: f64, viewport: &Viewport) -> Vec<usize> {
    strokes
        .iter()
        .enumerate()
        .filter(|(_, stroke)| stroke_hit(stroke, cursor, radius, viewport))
        .map(|(index, _)| index)
        .collect()
}

/// Whether a single stroke is touched by the erase cursor.
#[must_use]
pub fn stroke_hit(stroke: &Stroke, cursor: Point, radius: f64, viewport: &Viewport) -> bool {
    let (Some(first), Some(last)) = (stroke.first(), stroke.last()) else {
        return false;
    };

    match stroke.tool {
        ToolKind::Pen | ToolKind::Highlight => stroke
            .points
            .iter()
            .any(|&p| within(distance(viewport.normalized_to_surface(p), cursor), radius)),
        ToolKind::Arrow => {
            let start = viewport.normalized_to_surface(first);
            let end = viewport.normalized_to_surface(last);
            within(distance(start, cursor), radius)
                || within(distance(end, cursor), radius)
                || within(distance_to_segment(start, end, cursor), radius)
        }
        ToolKind::Circle => {
            let center = viewport.normalized_to_surface(first);
            let circle_radius = distance(center, viewport.normalized_to_surface(last));
            within(distance(center, cursor), radius + circle_radius)
        }
        ToolKind::Angle | ToolKind::RightAngle | ToolKind::Erase => false,
    }
}
