use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::api::config::{ScrollOrientation, TimelineConfig};
use crate::core::{AxisHandler, WindowSnapshot, ZoomLevel};
use crate::error::{TimelineError, TimelineResult};
use crate::events::{EventBus, Subscription};

/// Scroll report from the host: offset in pixels plus the signed distance
/// since the previous report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollInput {
    pub offset: f64,
    pub delta: f64,
}

/// Viewport resize report. `min_item_size` overrides the configured minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeInput {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub min_item_size: Option<f64>,
}

/// Host-facing entry point that turns raw scroll, resize and zoom input into
/// window snapshots.
///
/// Renderers subscribe through [`TimelineController::subscribe_snapshots`];
/// the subscription survives zoom changes.
#[derive(Debug)]
pub struct TimelineController {
    config: TimelineConfig,
    axis: AxisHandler,
    zoom_changes: EventBus<ZoomLevel>,
    scroll_offset: f64,
    reported_offset: f64,
    pending_scroll: Option<ScrollInput>,
    viewport_size: f64,
    min_item_size: f64,
}

impl TimelineController {
    pub fn new(config: TimelineConfig) -> TimelineResult<Self> {
        config.validate()?;
        let axis = AxisHandler::new(
            config.zoom_level,
            config.start_time,
            config.end_time,
            config.timezone,
        )?;
        let zoom_changes = EventBus::replaying();
        zoom_changes.publish(config.zoom_level);
        debug!(
            zoom = config.zoom_level.key(),
            item_count = axis.item_count(),
            "timeline controller created"
        );

        Ok(Self {
            config,
            axis,
            zoom_changes,
            scroll_offset: 0.0,
            reported_offset: 0.0,
            pending_scroll: None,
            viewport_size: 0.0,
            min_item_size: config.min_item_size,
        })
    }

    /// Re-lays out the axis for a new viewport, keeping the scroll position.
    pub fn handle_resize(
        &mut self,
        input: ResizeInput,
    ) -> TimelineResult<Option<Rc<WindowSnapshot>>> {
        for (name, value) in [("width", input.width), ("height", input.height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(TimelineError::InvalidData(format!(
                    "viewport {name} must be finite and >= 0"
                )));
            }
        }
        let viewport_size = match self.config.orientation {
            ScrollOrientation::Horizontal => input.width,
            ScrollOrientation::Vertical => input.height,
        };
        let min_item_size = input.min_item_size.unwrap_or(self.min_item_size);

        let snapshot = self
            .axis
            .setup(min_item_size, viewport_size, self.scroll_offset)?;
        self.viewport_size = viewport_size;
        self.min_item_size = min_item_size;
        if let Some(snapshot) = &snapshot {
            self.scroll_offset = snapshot.start_offset();
        }
        Ok(snapshot)
    }

    /// Applies a scroll report, deferring large jumps to the next frame.
    pub fn handle_scroll(&mut self, input: ScrollInput) -> Option<Rc<WindowSnapshot>> {
        self.reported_offset = input.offset;
        let delta = input.delta + self.pending_scroll.take().map_or(0.0, |pending| pending.delta);
        let input = ScrollInput {
            offset: input.offset,
            delta,
        };

        if input.delta.abs() > self.config.large_delta_threshold {
            trace!(offset = input.offset, delta = input.delta, "large scroll deferred to next frame");
            self.pending_scroll = Some(input);
            return None;
        }
        self.apply_scroll(input)
    }

    /// Scroll report carrying only an offset; the delta is derived from the
    /// previous report.
    pub fn handle_scroll_position(&mut self, offset: f64) -> Option<Rc<WindowSnapshot>> {
        let delta = offset - self.reported_offset;
        self.handle_scroll(ScrollInput { offset, delta })
    }

    /// Flushes a deferred scroll.
    pub fn on_animation_frame(&mut self) -> Option<Rc<WindowSnapshot>> {
        let input = self.pending_scroll.take()?;
        self.apply_scroll(input)
    }

    fn apply_scroll(&mut self, input: ScrollInput) -> Option<Rc<WindowSnapshot>> {
        let snapshot = self.axis.handle_scroll(input.offset, input.delta);
        if let Some(snapshot) = &snapshot {
            self.scroll_offset = snapshot.start_offset();
        }
        snapshot
    }

    /// Switches granularity, keeping the date at the window center in place.
    pub fn set_zoom_level(
        &mut self,
        zoom_level: ZoomLevel,
    ) -> TimelineResult<Option<Rc<WindowSnapshot>>> {
        if zoom_level == self.axis.zoom_level() {
            return Ok(None);
        }

        let center = self.axis.last_snapshot().map(|snapshot| {
            snapshot.visible_start() + (snapshot.visible_end() - snapshot.visible_start()) / 2
        });
        let mut axis = self.axis.rezoom(zoom_level)?;
        let mut snapshot = None;
        if self.viewport_size > 0.0 {
            axis.setup(self.min_item_size, self.viewport_size, 0.0)?;
            let offset = center.map_or(0.0, |center| axis.offset_for_date(center));
            snapshot = axis.handle_scroll(offset, 0.0);
        }

        self.axis = axis;
        self.config.zoom_level = zoom_level;
        self.pending_scroll = None;
        self.scroll_offset = snapshot.as_ref().map_or(0.0, |snapshot| snapshot.start_offset());
        self.reported_offset = self.scroll_offset;
        self.zoom_changes.publish(zoom_level);
        debug!(zoom = zoom_level.key(), center = ?center, "zoom level changed");
        Ok(snapshot)
    }

    #[must_use]
    pub fn subscribe_snapshots(&self) -> Subscription<Rc<WindowSnapshot>> {
        self.axis.subscribe()
    }

    /// Replaying subscription to zoom level changes.
    #[must_use]
    pub fn subscribe_zoom(&self) -> Subscription<ZoomLevel> {
        self.zoom_changes.subscribe()
    }

    #[must_use]
    pub fn axis(&self) -> &AxisHandler {
        &self.axis
    }

    #[must_use]
    pub fn config(&self) -> TimelineConfig {
        self.config
    }

    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    #[must_use]
    pub fn has_pending_scroll(&self) -> bool {
        self.pending_scroll.is_some()
    }
}
