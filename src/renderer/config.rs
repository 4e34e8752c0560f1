use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};
use crate::view::{ViewBox, ViewVisibility};

/// Screen axis the time axis runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum RenderAxis {
    #[default]
    X,
    Y,
}

/// Placement of a series on the cross axis and window insets on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderAxisConfig {
    #[serde(default)]
    pub axis: RenderAxis,
    #[serde(default)]
    pub cross_offset: f64,
    #[serde(default = "default_cross_size")]
    pub cross_size: f64,
    /// Pixels trimmed from the window start; negative values extend it.
    #[serde(default)]
    pub start_inset: f64,
    /// Pixels trimmed from the window end; negative values extend it.
    #[serde(default)]
    pub end_inset: f64,
}

impl Default for RenderAxisConfig {
    fn default() -> Self {
        Self {
            axis: RenderAxis::X,
            cross_offset: 0.0,
            cross_size: default_cross_size(),
            start_inset: 0.0,
            end_inset: 0.0,
        }
    }
}

impl RenderAxisConfig {
    #[must_use]
    pub fn with_axis(mut self, axis: RenderAxis) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub fn with_cross_placement(mut self, cross_offset: f64, cross_size: f64) -> Self {
        self.cross_offset = cross_offset;
        self.cross_size = cross_size;
        self
    }

    #[must_use]
    pub fn with_insets(mut self, start_inset: f64, end_inset: f64) -> Self {
        self.start_inset = start_inset;
        self.end_inset = end_inset;
        self
    }

    pub fn validate(self) -> TimelineResult<()> {
        for (name, value) in [
            ("cross_offset", self.cross_offset),
            ("cross_size", self.cross_size),
            ("start_inset", self.start_inset),
            ("end_inset", self.end_inset),
        ] {
            if !value.is_finite() {
                return Err(TimelineError::InvalidData(format!(
                    "render axis `{name}` must be finite"
                )));
            }
        }
        if self.cross_size < 0.0 {
            return Err(TimelineError::InvalidData(
                "render axis cross size must be >= 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// View geometry for a span of the time axis.
    #[must_use]
    pub fn view_box(&self, offset: f64, size: f64) -> ViewBox {
        let view_box = match self.axis {
            RenderAxis::X => ViewBox::new(self.cross_offset, offset, size, self.cross_size),
            RenderAxis::Y => ViewBox::new(offset, self.cross_offset, self.cross_size, size),
        };
        view_box.with_visibility(ViewVisibility::Visible)
    }
}

fn default_cross_size() -> f64 {
    120.0
}
