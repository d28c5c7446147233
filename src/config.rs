//! Engine configuration supplied by the host page.
//!
//! Every field has a default, so the host can pass `{}` or only the keys it
//! wants to override.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_COLOR, DEFAULT_ERASE_RADIUS_PX, DEFAULT_LABEL_FONT, DEFAULT_WIDTH_PX};
use crate::doc::ToolKind;

/// Error returned by [`EngineConfig::from_json`] and [`EngineConfig::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The input was not a JSON object with the expected field types.
    #[error("failed to parse engine config: {0}")]
    Json(#[from] serde_json::Error),
    /// A field parsed but holds an unusable value.
    #[error("invalid engine config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Tunables for one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Erase cursor radius in surface pixels.
    pub erase_radius: f64,
    /// Tool active when the engine mounts.
    pub default_tool: ToolKind,
    /// Stroke color active when the engine mounts.
    pub default_color: String,
    /// Stroke width active when the engine mounts, in surface pixels.
    pub default_width: f64,
    /// CSS font used for angle labels.
    pub label_font: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            erase_radius: DEFAULT_ERASE_RADIUS_PX,
            default_tool: ToolKind::Pen,
            default_color: DEFAULT_COLOR.to_owned(),
            default_width: DEFAULT_WIDTH_PX,
            label_font: DEFAULT_LABEL_FONT.to_owned(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.erase_radius.is_finite() || self.erase_radius <= 0.0 {
            return Err(ConfigError::Invalid { field: "erase_radius", reason: "must be a positive number" });
        }
        if self.default_tool == ToolKind::Erase {
            return Err(ConfigError::Invalid { field: "default_tool", reason: "cannot start in erase mode" });
        }
        if self.default_color.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "default_color", reason: "must not be empty" });
        }
        if !self.default_width.is_finite() || self.default_width <= 0.0 {
            return Err(ConfigError::Invalid { field: "default_width", reason: "must be a positive number" });
        }
        if self.label_font.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "label_font", reason: "must not be empty" });
        }
        Ok(())
    }
}
