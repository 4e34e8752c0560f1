use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{AxisHandler, Timestamp, Viewport, WindowSnapshot};
use crate::error::{TimelineError, TimelineResult};
use crate::events::Subscription;
use crate::render::{Color, LinePrimitive, RenderFrame, Renderer};

/// Style of the scroller background grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBackgroundConfig {
    #[serde(default = "default_cell_height")]
    pub cell_height: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_grid_stroke_width")]
    pub grid_stroke_width: f64,
    #[serde(default = "default_grid_color")]
    pub grid_color: Color,
    #[serde(default = "default_today_stroke_width")]
    pub today_stroke_width: f64,
    #[serde(default = "default_today_color")]
    pub today_color: Color,
}

impl Default for GridBackgroundConfig {
    fn default() -> Self {
        Self {
            cell_height: default_cell_height(),
            height: default_height(),
            grid_stroke_width: default_grid_stroke_width(),
            grid_color: default_grid_color(),
            today_stroke_width: default_today_stroke_width(),
            today_color: default_today_color(),
        }
    }
}

impl GridBackgroundConfig {
    #[must_use]
    pub fn with_cell_height(mut self, cell_height: f64) -> Self {
        self.cell_height = cell_height;
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_grid_style(mut self, stroke_width: f64, color: Color) -> Self {
        self.grid_stroke_width = stroke_width;
        self.grid_color = color;
        self
    }

    #[must_use]
    pub fn with_today_style(mut self, stroke_width: f64, color: Color) -> Self {
        self.today_stroke_width = stroke_width;
        self.today_color = color;
        self
    }

    pub fn validate(self) -> TimelineResult<()> {
        for (name, value) in [
            ("cell_height", self.cell_height),
            ("height", self.height),
            ("grid_stroke_width", self.grid_stroke_width),
            ("today_stroke_width", self.today_stroke_width),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TimelineError::InvalidData(format!(
                    "grid background `{name}` must be finite and > 0"
                )));
            }
        }
        self.grid_color.validate()?;
        self.today_color.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FrameKey {
    item_size: f64,
    start_offset: f64,
    end_offset: f64,
    today: Option<f64>,
}

/// Grid lines behind the series plus a marker for the current time.
///
/// Vertical lines sit on every item cell boundary inside the window. The
/// frame is rebuilt only when the item size or the window moved.
#[derive(Debug)]
pub struct GridBackground {
    config: GridBackgroundConfig,
    snapshots: Option<Subscription<Rc<WindowSnapshot>>>,
    last_key: Option<FrameKey>,
    frame: Option<RenderFrame>,
}

impl GridBackground {
    pub fn new(config: GridBackgroundConfig) -> TimelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            snapshots: None,
            last_key: None,
            frame: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> GridBackgroundConfig {
        self.config
    }

    pub fn connect(&mut self, axis: &AxisHandler) {
        self.snapshots = Some(axis.subscribe());
        self.last_key = None;
    }

    /// Last frame handed to a renderer.
    #[must_use]
    pub fn frame(&self) -> Option<&RenderFrame> {
        self.frame.as_ref()
    }

    /// Draws the newest window if it changed. Returns `true` when a frame
    /// was rendered.
    pub fn refresh(
        &mut self,
        axis: &AxisHandler,
        now: Timestamp,
        renderer: &mut dyn Renderer,
    ) -> TimelineResult<bool> {
        let Some(snapshot) = self
            .snapshots
            .as_ref()
            .and_then(Subscription::take_latest)
        else {
            return Ok(false);
        };

        let key = FrameKey {
            item_size: axis.item_size(),
            start_offset: snapshot.start_offset(),
            end_offset: snapshot.end_offset(),
            today: snapshot.visible_offset_for(now),
        };
        if self.last_key == Some(key) {
            return Ok(false);
        }
        let Some(frame) = self.build_frame(axis, &snapshot, now) else {
            trace!("grid background skipped for an empty window");
            return Ok(false);
        };

        renderer.render(&frame)?;
        trace!(lines = frame.lines.len(), "grid background rendered");
        self.last_key = Some(key);
        self.frame = Some(frame);
        Ok(true)
    }

    fn build_frame(
        &self,
        axis: &AxisHandler,
        snapshot: &WindowSnapshot,
        now: Timestamp,
    ) -> Option<RenderFrame> {
        let width = snapshot.viewport_size();
        let item_size = axis.item_size();
        if width <= 0.0 || item_size <= 0.0 {
            return None;
        }

        let config = self.config;
        let start_offset = snapshot.start_offset();
        let mut frame = RenderFrame::new(Viewport::new(
            width.ceil() as u32,
            config.height.ceil() as u32,
        ));

        let mut index = axis.first_visible_index(start_offset)?;
        loop {
            let x = index as f64 * item_size - start_offset;
            if x > width {
                break;
            }
            if x >= 0.0 {
                frame.lines.push(LinePrimitive::vertical(
                    x,
                    config.height,
                    config.grid_stroke_width,
                    config.grid_color,
                ));
            }
            index += 1;
        }

        let mut y = 0.0;
        while y <= config.height {
            frame.lines.push(LinePrimitive::horizontal(
                y,
                width,
                config.grid_stroke_width,
                config.grid_color,
            ));
            y += config.cell_height;
        }

        if let Some(position) = snapshot.visible_offset_for(now) {
            frame.lines.push(LinePrimitive::vertical(
                position - start_offset,
                config.height,
                config.today_stroke_width,
                config.today_color,
            ));
        }
        Some(frame)
    }
}

fn default_cell_height() -> f64 {
    40.0
}

fn default_height() -> f64 {
    400.0
}

fn default_grid_stroke_width() -> f64 {
    1.0
}

fn default_grid_color() -> Color {
    Color::rgb(0.0, 0.0, 1.0)
}

fn default_today_stroke_width() -> f64 {
    2.0
}

fn default_today_color() -> Color {
    Color::rgb(1.0, 0.0, 0.0)
}
