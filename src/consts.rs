//! Shared numeric constants for the annotation engine.

// ── Arrow ───────────────────────────────────────────────────────

/// Length of each arrowhead segment in surface pixels.
pub const ARROW_HEAD_PX: f64 = 15.0;

/// Arrowhead half-angle in radians (30°).
pub const ARROW_HEAD_ANGLE: f64 = std::f64::consts::FRAC_PI_6;

// ── Goniometry ──────────────────────────────────────────────────

/// Radius of the arc drawn at an angle's vertex, in surface pixels.
pub const ANGLE_ARC_RADIUS_PX: f64 = 30.0;

/// Extra distance past the arc at which the angle label sits.
pub const ANGLE_LABEL_OFFSET_PX: f64 = 20.0;

/// Length of the perpendicular arm of a right-angle marker.
pub const RIGHT_ANGLE_ARM_PX: f64 = 30.0;

/// Side of the filled square glyph at a right-angle vertex.
pub const RIGHT_ANGLE_SQUARE_PX: f64 = 8.0;

/// Distance past the perpendicular arm at which the `90°` label sits.
pub const RIGHT_ANGLE_LABEL_OFFSET_PX: f64 = 15.0;

// ── Preview ─────────────────────────────────────────────────────

/// Dash segment length for angle previews, in surface pixels.
pub const PREVIEW_DASH_PX: f64 = 6.0;

/// Radius of the dot marking an already-placed angle point.
pub const PREVIEW_MARKER_RADIUS_PX: f64 = 3.0;

// ── Defaults ────────────────────────────────────────────────────

/// Default erase cursor radius in surface pixels.
pub const DEFAULT_ERASE_RADIUS_PX: f64 = 10.0;

/// Default stroke color.
pub const DEFAULT_COLOR: &str = "#ff0000";

/// Default stroke width in surface pixels.
pub const DEFAULT_WIDTH_PX: f64 = 3.0;

/// Default font for measurement labels.
pub const DEFAULT_LABEL_FONT: &str = "14px sans-serif";
