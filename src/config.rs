//! Configuration for a [`PendingConnection`](crate::PendingConnection).
//!
//! The three behavior switches drive hit testing, snapping and preview. The
//! stroke settings are cosmetic pass-throughs for the rendering layer.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingConnectionConfig {
    /// Expose the hovered candidate's context data as the preview target.
    pub enable_preview: bool,
    /// Lock the pending link's end onto the anchor of the connector under the pointer.
    pub enable_snapping: bool,
    /// Only connectors are candidates; node containers and other elements are ignored.
    pub allow_only_connectors: bool,
    pub stroke_thickness: f32,
    pub stroke_dash_array: Vec<f32>,
}

impl Default for PendingConnectionConfig {
    fn default() -> Self {
        Self {
            enable_preview: false,
            enable_snapping: false,
            allow_only_connectors: true,
            stroke_thickness: 1.0,
            stroke_dash_array: Vec::new(),
        }
    }
}

impl PendingConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preview(mut self, enabled: bool) -> Self {
        self.enable_preview = enabled;
        self
    }

    pub fn with_snapping(mut self, enabled: bool) -> Self {
        self.enable_snapping = enabled;
        self
    }

    pub fn with_allow_only_connectors(mut self, only_connectors: bool) -> Self {
        self.allow_only_connectors = only_connectors;
        self
    }

    pub fn with_stroke_thickness(mut self, thickness: f32) -> Self {
        self.stroke_thickness = thickness;
        self
    }

    pub fn with_stroke_dash_array(mut self, dashes: Vec<f32>) -> Self {
        self.stroke_dash_array = dashes;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_stroke_thickness(self.stroke_thickness)?;
        validate_dash_array(&self.stroke_dash_array)
    }
}

pub(crate) fn validate_stroke_thickness(thickness: f32) -> Result<(), ConfigError> {
    if thickness.is_finite() && thickness >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidStrokeThickness(thickness))
    }
}

pub(crate) fn validate_dash_array(dashes: &[f32]) -> Result<(), ConfigError> {
    match dashes
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        Some((index, &value)) => Err(ConfigError::InvalidDashEntry { index, value }),
        None => Ok(()),
    }
}
