//! Coordinate spaces of the drawing surface.
//!
//! Three spaces are involved:
//!
//! - **client**: CSS pixels reported by pointer events, relative to the page viewport;
//! - **surface**: pixels of the canvas backing buffer, which can differ from its CSS size;
//! - **normalized**: fractions of the surface buffer, `[0,1]×[0,1]`, used for storage.
//!
//! The buffer is sized to the video's displayed rectangle, so normalized
//! coordinates are fractions of the visible video frame.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::geom::Point;

/// An axis-aligned rectangle in client (CSS) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Whether the rectangle has a positive, finite area.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Size of the surface buffer and where it is displayed on the page.
///
/// `width` / `height` are buffer pixels. `display` is the CSS rectangle the
/// buffer is stretched over.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub display: Rect,
}

impl Viewport {
    /// A viewport whose buffer exactly matches `display`.
    #[must_use]
    pub fn fitted(display: Rect) -> Self {
        let mut viewport = Self::default();
        viewport.fit_to(display);
        viewport
    }

    /// Whether both the buffer and the display rectangle have area.
    ///
    /// Before the video reports its metadata the surface is zero-sized and
    /// nothing can be mapped.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.display.has_area()
    }

    /// Resize the buffer to `display` (rounded to whole pixels) and pin the display rect.
    ///
    /// Existing strokes need no rescaling; they are stored normalized.
    pub fn fit_to(&mut self, display: Rect) {
        self.width = display.width.max(0.0).round();
        self.height = display.height.max(0.0).round();
        self.display = display;
    }

    /// Buffer size in whole pixels, as the canvas element wants it.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn buffer_size(&self) -> (u32, u32) {
        (self.width.max(0.0) as u32, self.height.max(0.0) as u32)
    }

    /// Convert a client-space point (CSS pixels) to surface-buffer pixels.
    ///
    /// Scales by `buffer / display` on each axis. Returns `None` when the viewport is not ready.
    #[must_use]
    pub fn client_to_surface(&self, client: Point) -> Option<Point> {
        if !self.is_ready() {
            return None;
        }
        Some(Point {
            x: (client.x - self.display.left) * (self.width / self.display.width),
            y: (client.y - self.display.top) * (self.height / self.display.height),
        })
    }

    /// Convert a surface-buffer point to normalized coordinates.
    #[must_use]
    pub fn surface_to_normalized(&self, surface: Point) -> Option<Point> {
        if !self.is_ready() {
            return None;
        }
        Some(Point { x: surface.x / self.width, y: surface.y / self.height })
    }

    /// Convert a normalized point to surface-buffer pixels.
    #[must_use]
    pub fn normalized_to_surface(&self, norm: Point) -> Point {
        Point { x: norm.x * self.width, y: norm.y * self.height }
    }

    /// Convert a client-space point straight to normalized coordinates.
    #[must_use]
    pub fn client_to_normalized(&self, client: Point) -> Option<Point> {
        self.client_to_surface(client)
            .and_then(|surface| self.surface_to_normalized(surface))
    }

    /// Convert a slice of normalized points to surface pixels.
    #[must_use]
    pub fn to_surface_points(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.normalized_to_surface(p)).collect()
    }
}
