use serde::{Deserialize, Serialize};

use crate::core::{CalendarTimeZone, Timestamp, ZoomLevel};
use crate::error::{TimelineError, TimelineResult};

/// Which viewport dimension the time axis scrolls along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ScrollOrientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Serializable timeline bootstrap configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    #[serde(default = "default_zoom_level")]
    pub zoom_level: ZoomLevel,
    #[serde(default)]
    pub timezone: CalendarTimeZone,
    #[serde(default = "default_min_item_size")]
    pub min_item_size: f64,
    /// Scroll deltas above this many pixels wait for the next animation frame.
    #[serde(default = "default_large_delta_threshold")]
    pub large_delta_threshold: f64,
    #[serde(default)]
    pub orientation: ScrollOrientation,
}

impl TimelineConfig {
    #[must_use]
    pub fn new(start_time: Timestamp, end_time: Timestamp) -> Self {
        Self {
            start_time,
            end_time,
            zoom_level: default_zoom_level(),
            timezone: CalendarTimeZone::default(),
            min_item_size: default_min_item_size(),
            large_delta_threshold: default_large_delta_threshold(),
            orientation: ScrollOrientation::default(),
        }
    }

    #[must_use]
    pub fn with_zoom_level(mut self, zoom_level: ZoomLevel) -> Self {
        self.zoom_level = zoom_level;
        self
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: CalendarTimeZone) -> Self {
        self.timezone = timezone;
        self
    }

    #[must_use]
    pub fn with_min_item_size(mut self, min_item_size: f64) -> Self {
        self.min_item_size = min_item_size;
        self
    }

    #[must_use]
    pub fn with_large_delta_threshold(mut self, threshold: f64) -> Self {
        self.large_delta_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: ScrollOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn validate(self) -> TimelineResult<()> {
        if self.end_time < self.start_time {
            return Err(TimelineError::InvalidRange {
                start: self.start_time,
                end: self.end_time,
            });
        }
        if !self.min_item_size.is_finite() || self.min_item_size <= 0.0 {
            return Err(TimelineError::InvalidData(
                "minimum item size must be finite and > 0".to_owned(),
            ));
        }
        if !self.large_delta_threshold.is_finite() || self.large_delta_threshold <= 0.0 {
            return Err(TimelineError::InvalidData(
                "large delta threshold must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_pretty(self) -> TimelineResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| TimelineError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes and validates config from JSON.
    pub fn from_json_str(input: &str) -> TimelineResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| TimelineError::InvalidData(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_zoom_level() -> ZoomLevel {
    ZoomLevel::Day
}

fn default_min_item_size() -> f64 {
    120.0
}

fn default_large_delta_threshold() -> f64 {
    2_000.0
}
