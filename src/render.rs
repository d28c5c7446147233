//! Rendering: draws the annotation set and gesture preview to a 2D surface.
//!
//! Drawing goes through the [`Surface`] trait, which
//! [`web_sys::CanvasRenderingContext2d`] implements at the bottom of this
//! module, so the drawing logic can run against a recording surface in tests. It receives read-only views of the
//! strokes, viewport, and preview, and produces pixels. It does not mutate
//! any application state, so drawing the same inputs twice yields the same
//! calls.
//!
//! All fallible surface calls propagate errors via `Result<(), SurfaceError>`.
//! The top-level caller ([`crate::engine::Engine::render`]) logs the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::{PI, TAU};

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::consts::{
    ANGLE_ARC_RADIUS_PX, ANGLE_LABEL_OFFSET_PX, ARROW_HEAD_ANGLE, ARROW_HEAD_PX, PREVIEW_DASH_PX,
    PREVIEW_MARKER_RADIUS_PX, RIGHT_ANGLE_ARM_PX, RIGHT_ANGLE_LABEL_OFFSET_PX, RIGHT_ANGLE_SQUARE_PX,
};
use crate::doc::{Stroke, ToolKind};
use crate::geom::{Point, angle_at, bearing, distance, perpendicular};
use crate::viewport::Viewport;

/// Error returned when a drawing call fails.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    /// The underlying `Canvas2D` call threw.
    #[error("canvas call failed: {0}")]
    Canvas(String),
}

impl From<JsValue> for SurfaceError {
    fn from(err: JsValue) -> Self {
        Self::Canvas(format!("{err:?}"))
    }
}

/// The subset of `Canvas2D` the renderer needs.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn set_stroke_style(&mut self, color: &str);
    fn set_fill_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, cap: &str);
    fn set_line_join(&mut self, join: &str);
    /// Set the dash pattern; an empty slice means solid lines.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the surface rejects the pattern.
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError>;
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: &str);
    fn set_text_baseline(&mut self, baseline: &str);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    /// Add a circular arc to the current path.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] for a negative radius or a failed call.
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, anticlockwise: bool)
    -> Result<(), SurfaceError>;
    fn stroke(&mut self);
    fn fill(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    /// Draw text at a point using the current font and alignment.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the call fails.
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError>;
}

/// Transient overlay drawn above the committed strokes.
#[derive(Debug, Clone, Copy, Default)]
pub enum Preview<'a> {
    /// Nothing in progress.
    #[default]
    None,
    /// A free-draw stroke being dragged, drawn as if committed.
    Stroke(&'a Stroke),
    /// An angle gesture with some points placed.
    Angle {
        /// Placed points in normalized space.
        points: &'a [Point],
        /// Live pointer position in normalized space.
        cursor: Option<Point>,
        /// Toolbar color.
        color: &'a str,
        /// Toolbar width.
        width: f64,
    },
}

/// Clear the surface and draw every stroke, then the preview.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn draw(
    surface: &mut impl Surface,
    strokes: &[Stroke],
    viewport: &Viewport,
    preview: &Preview<'_>,
    label_font: &str,
) -> Result<(), SurfaceError> {
    // Layer 1: clear.
    surface.clear(viewport.width, viewport.height);

    // Layer 2: committed strokes (first drawn is bottom-most).
    for stroke in strokes {
        draw_stroke(surface, stroke, viewport, label_font)?;
    }

    // Layer 3: gesture preview.
    match *preview {
        Preview::None => Ok(()),
        Preview::Stroke(stroke) => draw_stroke(surface, stroke, viewport, label_font),
        Preview::Angle { points, cursor, color, width } => {
            let placed = viewport.to_surface_points(points);
            let cursor = cursor.map(|c| viewport.normalized_to_surface(c));
            draw_angle_preview(surface, &placed, cursor, color, width)
        }
    }
}

// =============================================================
// Stroke dispatch
// =============================================================

fn draw_stroke(
    surface: &mut impl Surface,
    stroke: &Stroke,
    viewport: &Viewport,
    label_font: &str,
) -> Result<(), SurfaceError> {
    let points = viewport.to_surface_points(&stroke.points);
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Ok(());
    };

    surface.save();
    apply_stroke_style(surface, &stroke.color, stroke.width);
    let result = match stroke.tool {
        ToolKind::Pen | ToolKind::Highlight => {
            draw_polyline(surface, &points);
            Ok(())
        }
        ToolKind::Arrow => {
            draw_arrow(surface, first, last);
            Ok(())
        }
        ToolKind::Circle => draw_circle(surface, first, last),
        ToolKind::Angle => draw_angle(surface, &points, &stroke.color, label_font),
        ToolKind::RightAngle => draw_right_angle(surface, &points, &stroke.color, label_font),
        ToolKind::Erase => Ok(()),
    };
    surface.restore();
    result
}

// =============================================================
// Free-draw renderers
// =============================================================

fn draw_polyline(surface: &mut impl Surface, points: &[Point]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    surface.begin_path();
    surface.move_to(first.x, first.y);
    if rest.is_empty() {
        // Zero-length segment so round caps draw a dot.
        surface.line_to(first.x, first.y);
    }
    for p in rest {
        surface.line_to(p.x, p.y);
    }
    surface.stroke();
}

fn draw_arrow(surface: &mut impl Surface, start: Point, end: Point) {
    let angle = bearing(start, end);

    surface.begin_path();
    surface.move_to(start.x, start.y);
    surface.line_to(end.x, end.y);
    for side in [-ARROW_HEAD_ANGLE, ARROW_HEAD_ANGLE] {
        surface.move_to(end.x, end.y);
        surface.line_to(
            ARROW_HEAD_PX.mul_add(-(angle + side).cos(), end.x),
            ARROW_HEAD_PX.mul_add(-(angle + side).sin(), end.y),
        );
    }
    surface.stroke();
}

fn draw_circle(surface: &mut impl Surface, center: Point, rim: Point) -> Result<(), SurfaceError> {
    let radius = distance(center, rim);
    surface.begin_path();
    surface.arc(center.x, center.y, radius, 0.0, TAU, false)?;
    surface.stroke();
    Ok(())
}

// =============================================================
// Goniometry renderers
// =============================================================

/// Segments `p1–p2–p3`, an arc at `p2`, and the measured angle on the arc bisector.
fn draw_angle(surface: &mut impl Surface, points: &[Point], color: &str, label_font: &str) -> Result<(), SurfaceError> {
    draw_segments(surface, points);

    let &[p1, p2, p3, ..] = points else {
        return Ok(());
    };
    if distance(p1, p2) <= f64::EPSILON || distance(p2, p3) <= f64::EPSILON {
        return Ok(());
    }

    let start = bearing(p2, p1);
    let sweep = signed_sweep(start, bearing(p2, p3));
    surface.begin_path();
    surface.arc(p2.x, p2.y, ANGLE_ARC_RADIUS_PX, start, start + sweep, sweep < 0.0)?;
    surface.stroke();

    let bisector = start + sweep / 2.0;
    let label_dist = ANGLE_ARC_RADIUS_PX + ANGLE_LABEL_OFFSET_PX;
    let label = format_angle(angle_at(p1, p2, p3));
    draw_label(
        surface,
        &label,
        Point::new(label_dist.mul_add(bisector.cos(), p2.x), label_dist.mul_add(bisector.sin(), p2.y)),
        color,
        label_font,
    )
}

/// Line `p1–p2`, a perpendicular arm from `p2`, a square glyph at `p2`, and a `90°` label.
fn draw_right_angle(
    surface: &mut impl Surface,
    points: &[Point],
    color: &str,
    label_font: &str,
) -> Result<(), SurfaceError> {
    draw_segments(surface, points);

    let &[p1, p2, ..] = points else {
        return Ok(());
    };
    let Some(arm) = perpendicular(p1, p2, RIGHT_ANGLE_ARM_PX) else {
        return Ok(());
    };

    let arm_end = p2.offset(arm);
    surface.begin_path();
    surface.move_to(p2.x, p2.y);
    surface.line_to(arm_end.x, arm_end.y);
    surface.stroke();

    let half = RIGHT_ANGLE_SQUARE_PX / 2.0;
    surface.fill_rect(p2.x - half, p2.y - half, RIGHT_ANGLE_SQUARE_PX, RIGHT_ANGLE_SQUARE_PX);

    let Some(label_offset) = perpendicular(p1, p2, RIGHT_ANGLE_ARM_PX + RIGHT_ANGLE_LABEL_OFFSET_PX) else {
        return Ok(());
    };
    draw_label(surface, "90°", p2.offset(label_offset), color, label_font)
}

fn draw_angle_preview(
    surface: &mut impl Surface,
    placed: &[Point],
    cursor: Option<Point>,
    color: &str,
    width: f64,
) -> Result<(), SurfaceError> {
    let Some(first) = placed.first() else {
        return Ok(());
    };

    surface.save();
    apply_stroke_style(surface, color, width);
    let result = trace_angle_preview(surface, *first, placed, cursor);
    surface.restore();
    result
}

fn trace_angle_preview(
    surface: &mut impl Surface,
    first: Point,
    placed: &[Point],
    cursor: Option<Point>,
) -> Result<(), SurfaceError> {
    // Dashed path through the placed points, out to the pointer.
    surface.set_line_dash(&[PREVIEW_DASH_PX, PREVIEW_DASH_PX])?;
    surface.begin_path();
    surface.move_to(first.x, first.y);
    for p in placed.iter().skip(1) {
        surface.line_to(p.x, p.y);
    }
    if let Some(c) = cursor {
        surface.line_to(c.x, c.y);
    }
    surface.stroke();
    surface.set_line_dash(&[])?;

    // Solid markers on the placed points.
    for p in placed {
        surface.begin_path();
        surface.arc(p.x, p.y, PREVIEW_MARKER_RADIUS_PX, 0.0, TAU, false)?;
        surface.fill();
    }
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

/// Format a measured angle for display, one decimal place.
#[must_use]
pub fn format_angle(degrees: f64) -> String {
    format!("{degrees:.1}°")
}

/// Signed sweep from `start` to `end` along the shorter way round, in `(-π, π]`.
fn signed_sweep(start: f64, end: f64) -> f64 {
    let sweep = (end - start).rem_euclid(TAU);
    if sweep > PI { sweep - TAU } else { sweep }
}

fn draw_segments(surface: &mut impl Surface, points: &[Point]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    if rest.is_empty() {
        return;
    }
    surface.begin_path();
    surface.move_to(first.x, first.y);
    for p in rest {
        surface.line_to(p.x, p.y);
    }
    surface.stroke();
}

fn draw_label(surface: &mut impl Surface, text: &str, at: Point, color: &str, font: &str) -> Result<(), SurfaceError> {
    surface.set_fill_style(color);
    surface.set_font(font);
    surface.set_text_align("center");
    surface.set_text_baseline("middle");
    surface.fill_text(text, at.x, at.y)
}

fn apply_stroke_style(surface: &mut impl Surface, color: &str, width: f64) {
    surface.set_stroke_style(color);
    surface.set_fill_style(color);
    surface.set_line_width(width);
    surface.set_line_cap("round");
    surface.set_line_join("round");
}

// =============================================================
// Canvas2D
// =============================================================

// Inherent methods are called by path so they never resolve back to the trait.
impl Surface for CanvasRenderingContext2d {
    fn clear(&mut self, width: f64, height: f64) {
        CanvasRenderingContext2d::clear_rect(self, 0.0, 0.0, width, height);
    }

    fn save(&mut self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&mut self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn set_stroke_style(&mut self, color: &str) {
        CanvasRenderingContext2d::set_stroke_style_str(self, color);
    }

    fn set_fill_style(&mut self, color: &str) {
        CanvasRenderingContext2d::set_fill_style_str(self, color);
    }

    fn set_line_width(&mut self, width: f64) {
        CanvasRenderingContext2d::set_line_width(self, width);
    }

    fn set_line_cap(&mut self, cap: &str) {
        CanvasRenderingContext2d::set_line_cap(self, cap);
    }

    fn set_line_join(&mut self, join: &str) {
        CanvasRenderingContext2d::set_line_join(self, join);
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError> {
        let dash_array = js_sys::Array::new();
        for segment in segments {
            dash_array.push(&JsValue::from_f64(*segment));
        }
        Ok(CanvasRenderingContext2d::set_line_dash(self, &dash_array)?)
    }

    fn set_font(&mut self, font: &str) {
        CanvasRenderingContext2d::set_font(self, font);
    }

    fn set_text_align(&mut self, align: &str) {
        CanvasRenderingContext2d::set_text_align(self, align);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        CanvasRenderingContext2d::set_text_baseline(self, baseline);
    }

    fn begin_path(&mut self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }

    fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
    ) -> Result<(), SurfaceError> {
        Ok(CanvasRenderingContext2d::arc_with_anticlockwise(self, x, y, radius, start, end, anticlockwise)?)
    }

    fn stroke(&mut self) {
        CanvasRenderingContext2d::stroke(self);
    }

    fn fill(&mut self) {
        CanvasRenderingContext2d::fill(self);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        CanvasRenderingContext2d::fill_rect(self, x, y, width, height);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError> {
        Ok(CanvasRenderingContext2d::fill_text(self, text, x, y)?)
    }
}
