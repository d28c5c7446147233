//! Document model: strokes, the tools that produce them, and the annotation set.
//!
//! This module defines what is drawn over the video (`Stroke`, `ToolKind`) and
//! the ordered collection that gets rendered, undone, redone, and persisted
//! (`AnnotationSet`).
//!
//! Stroke points are stored in normalized video space: `x` and `y` are
//! fractions of the surface width and height, so strokes stay attached to the
//! video frame when the surface is resized. The viewport converts them to
//! surface pixels at render and hit-test time.
//!
//! Data flows into this layer from the input engine (commits) and from the
//! persistence collaborator (JSON). JSON input is validated on the way in.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geom::Point;

/// Error returned when decoding or validating strokes.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    /// The input was not a JSON array of stroke objects.
    #[error("failed to decode annotation set: {0}")]
    Json(#[from] serde_json::Error),
    /// A stroke decoded but violates a data-model invariant.
    #[error("invalid stroke at index {index}: {reason}")]
    InvalidStroke { index: usize, reason: &'static str },
    /// A tool name did not match any known tool.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

/// The tool that produced a stroke, or the active tool in the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    /// Freehand polyline (default).
    #[default]
    Pen,
    /// Freehand polyline drawn with a translucent color.
    Highlight,
    /// Straight arrow from the first to the last point.
    Arrow,
    /// Circle centered on the first point, through the last point.
    Circle,
    /// Removes strokes under the cursor. Never stored.
    Erase,
    /// Three-click angle measurement.
    Angle,
    /// Two-click right-angle marker.
    RightAngle,
}

impl ToolKind {
    /// Every tool, in toolbar order.
    pub const ALL: [Self; 7] = [
        Self::Pen,
        Self::Highlight,
        Self::Arrow,
        Self::Circle,
        Self::Erase,
        Self::Angle,
        Self::RightAngle,
    ];

    /// Whether this tool draws with a single continuous drag.
    #[must_use]
    pub fn is_free_draw(self) -> bool {
        matches!(self, Self::Pen | Self::Highlight | Self::Arrow | Self::Circle)
    }

    /// Whether this tool places points with successive clicks.
    #[must_use]
    pub fn is_angle(self) -> bool {
        matches!(self, Self::Angle | Self::RightAngle)
    }

    /// Number of clicks that completes an angle gesture, if this is an angle tool.
    #[must_use]
    pub fn clicks_to_complete(self) -> Option<usize> {
        match self {
            Self::Angle => Some(3),
            Self::RightAngle => Some(2),
            _ => None,
        }
    }

    /// The wire name of this tool (`"pen"`, `"right-angle"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pen => "pen",
            Self::Highlight => "highlight",
            Self::Arrow => "arrow",
            Self::Circle => "circle",
            Self::Erase => "erase",
            Self::Angle => "angle",
            Self::RightAngle => "right-angle",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| DocError::UnknownTool(s.to_owned()))
    }
}

/// One annotation shape as stored and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Tool that drew the stroke.
    pub tool: ToolKind,
    /// Ordered points in normalized video space.
    pub points: Vec<Point>,
    /// CSS color string.
    pub color: String,
    /// Line width in surface pixels.
    pub width: f64,
    /// Video playback position in seconds when the stroke was committed.
    pub timestamp: f64,
}

impl Stroke {
    /// Start a stroke with a single seed point.
    #[must_use]
    pub fn new(tool: ToolKind, seed: Point, color: impl Into<String>, width: f64) -> Self {
        Self { tool, points: vec![seed], color: color.into(), width, timestamp: 0.0 }
    }

    /// First point of the stroke.
    #[must_use]
    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// Last point of the stroke.
    #[must_use]
    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Check the stored-stroke invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::InvalidStroke`] naming the violated invariant, with `index` as given.
    pub fn validate(&self, index: usize) -> Result<(), DocError> {
        let invalid = |reason| DocError::InvalidStroke { index, reason };
        if self.tool == ToolKind::Erase {
            return Err(invalid("erase strokes are never stored"));
        }
        if self.points.is_empty() {
            return Err(invalid("stroke has no points"));
        }
        if !self.points.iter().all(|p| p.is_finite()) {
            return Err(invalid("stroke has a non-finite point"));
        }
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(invalid("stroke width must be positive"));
        }
        if !self.timestamp.is_finite() {
            return Err(invalid("stroke timestamp must be finite"));
        }
        Ok(())
    }
}

/// Ordered collection of strokes for one video. Later strokes draw on top.
///
/// Serializes as a bare JSON array. Deserializing validates every stroke, so a
/// set embedded in another record is checked the same way as [`AnnotationSet::from_json`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Stroke>", into = "Vec<Stroke>")]
pub struct AnnotationSet {
    strokes: Vec<Stroke>,
}

impl AnnotationSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from strokes, validating each one.
    ///
    /// # Errors
    ///
    /// Returns the first [`DocError::InvalidStroke`] found.
    pub fn from_strokes(strokes: Vec<Stroke>) -> Result<Self, DocError> {
        for (index, stroke) in strokes.iter().enumerate() {
            stroke.validate(index)?;
        }
        Ok(Self { strokes })
    }

    /// Append a stroke on top of the others.
    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// All strokes in draw order.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// The topmost stroke.
    #[must_use]
    pub fn last(&self) -> Option<&Stroke> {
        self.strokes.last()
    }

    /// A copy of this set without its topmost stroke.
    #[must_use]
    pub fn without_last(&self) -> Self {
        let keep = self.strokes.len().saturating_sub(1);
        Self { strokes: self.strokes[..keep].to_vec() }
    }

    /// Remove the strokes at the given indices, returning them in draw order.
    ///
    /// Indices that are out of range are ignored.
    pub fn remove_indices(&mut self, indices: &[usize]) -> Vec<Stroke> {
        if indices.is_empty() {
            return Vec::new();
        }
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.strokes.len());
        for (index, stroke) in std::mem::take(&mut self.strokes).into_iter().enumerate() {
            if indices.contains(&index) {
                removed.push(stroke);
            } else {
                kept.push(stroke);
            }
        }
        self.strokes = kept;
        removed
    }

    /// Drop every stroke.
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Number of strokes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Returns `true` if the set holds no strokes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Serialize to the JSON array stored by the persistence layer.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, DocError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode and validate a JSON array of strokes.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::Json`] for malformed input and
    /// [`DocError::InvalidStroke`] for strokes that break the data model.
    pub fn from_json(json: &str) -> Result<Self, DocError> {
        let strokes: Vec<Stroke> = serde_json::from_str(json)?;
        Self::from_strokes(strokes)
    }
}

impl TryFrom<Vec<Stroke>> for AnnotationSet {
    type Error = DocError;

    fn try_from(strokes: Vec<Stroke>) -> Result<Self, Self::Error> {
        Self::from_strokes(strokes)
    }
}

impl From<AnnotationSet> for Vec<Stroke> {
    fn from(set: AnnotationSet) -> Self {
        set.strokes
    }
}
