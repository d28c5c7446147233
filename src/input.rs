//! Input model: toolbar state, mouse buttons, and the gesture state machine.
//!
//! `UiState` holds what the toolbar last dispatched (tool, color, width).
//! `InputState` is the gesture being tracked between pointer events. Free-draw
//! and erase gestures live between pointer-down and pointer-up. Angle
//! gestures span several clicks and stay open between them.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::config::EngineConfig;
use crate::doc::{Stroke, ToolKind};
use crate::geom::Point;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button, pen contact, or single-finger touch.
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub fn from_dom(code: i16) -> Self {
        match code {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// Toolbar state visible to the engine and renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    /// Currently active tool.
    pub tool: ToolKind,
    /// CSS color applied to new strokes.
    pub color: String,
    /// Line width applied to new strokes, in surface pixels.
    pub width: f64,
    /// Erase cursor radius in surface pixels.
    pub erase_radius: f64,
}

impl UiState {
    /// Initial toolbar state from the engine config.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            tool: config.default_tool,
            color: config.default_color.clone(),
            width: config.default_width,
            erase_radius: config.erase_radius,
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A pen, highlight, arrow, or circle drag is in progress.
    FreeDrawing {
        /// The stroke being drawn. Not yet part of the annotation set.
        stroke: Stroke,
    },
    /// An angle or right-angle gesture has placed some of its points.
    AnglePlacing {
        /// Which angle tool the gesture belongs to.
        tool: ToolKind,
        /// Placed points in normalized space, 1 or 2 of them.
        points: Vec<Point>,
        /// Latest pointer position in normalized space, for the dashed preview.
        cursor: Option<Point>,
    },
    /// The erase tool is held down.
    Erasing,
}

impl InputState {
    /// Whether a pointer-up should end this gesture.
    #[must_use]
    pub fn ends_on_release(&self) -> bool {
        matches!(self, Self::FreeDrawing { .. } | Self::Erasing)
    }
}
