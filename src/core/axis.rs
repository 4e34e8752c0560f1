use std::rc::Rc;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, trace};

use crate::core::calendar::{CalendarTimeZone, Timestamp};
use crate::core::window::{WindowBounds, WindowSnapshot};
use crate::core::zoom_level::ZoomLevel;
use crate::error::{TimelineError, TimelineResult};
use crate::events::{EventBus, Subscription};

/// Maps a fixed, zoom-trimmed time range onto a scrollable pixel axis.
///
/// The global range is fixed at construction. Viewport geometry changes on
/// every [`AxisHandler::setup`], and every scroll update publishes a fresh
/// [`WindowSnapshot`] to subscribers.
#[derive(Debug)]
pub struct AxisHandler {
    zoom_level: ZoomLevel,
    timezone: CalendarTimeZone,
    requested_range: (Timestamp, Timestamp),
    global_start: DateTime<FixedOffset>,
    global_start_ts: Timestamp,
    global_end_ts: Timestamp,
    item_count: i64,
    item_size: f64,
    viewport_size: f64,
    viewport_item_count: i64,
    scroller_size: f64,
    snapshots: EventBus<Rc<WindowSnapshot>>,
    last_snapshot: Option<Rc<WindowSnapshot>>,
}

impl AxisHandler {
    /// Builds a handler over `[from, to]` widened to the zoom grid.
    pub fn new(
        zoom_level: ZoomLevel,
        from: Timestamp,
        to: Timestamp,
        timezone: CalendarTimeZone,
    ) -> TimelineResult<Self> {
        Self::with_bus(zoom_level, from, to, timezone, EventBus::replaying())
    }

    fn with_bus(
        zoom_level: ZoomLevel,
        from: Timestamp,
        to: Timestamp,
        timezone: CalendarTimeZone,
        snapshots: EventBus<Rc<WindowSnapshot>>,
    ) -> TimelineResult<Self> {
        if to < from {
            return Err(TimelineError::InvalidRange {
                start: from,
                end: to,
            });
        }

        let global_start = zoom_level.trim_to_start(&timezone.datetime(from)?);
        let global_end = zoom_level.trim_to_end(&timezone.datetime(to)?);
        let global_start_ts = global_start.timestamp_millis();
        let global_end_ts = global_end.timestamp_millis();
        if global_end_ts <= global_start_ts {
            return Err(TimelineError::InvalidRange {
                start: global_start_ts,
                end: global_end_ts,
            });
        }

        let item_count = zoom_level.count(&global_start, &global_end);
        debug!(
            zoom = zoom_level.key(),
            global_start = global_start_ts,
            global_end = global_end_ts,
            item_count,
            "axis range initialized"
        );

        Ok(Self {
            zoom_level,
            timezone,
            requested_range: (from, to),
            global_start,
            global_start_ts,
            global_end_ts,
            item_count,
            item_size: 0.0,
            viewport_size: 0.0,
            viewport_item_count: 0,
            scroller_size: 0.0,
            snapshots,
            last_snapshot: None,
        })
    }

    /// Builds a handler for another zoom level over the same requested span.
    ///
    /// The snapshot bus is shared, so existing subscriptions keep receiving
    /// updates from the new handler.
    pub fn rezoom(&self, zoom_level: ZoomLevel) -> TimelineResult<Self> {
        let (from, to) = self.requested_range;
        Self::with_bus(zoom_level, from, to, self.timezone, self.snapshots.clone())
    }

    /// Recomputes item geometry for a viewport and publishes a snapshot.
    ///
    /// A zero-size viewport stores empty geometry and publishes nothing.
    pub fn setup(
        &mut self,
        min_item_size: f64,
        viewport_size: f64,
        scroll_offset: f64,
    ) -> TimelineResult<Option<Rc<WindowSnapshot>>> {
        if !min_item_size.is_finite() || min_item_size <= 0.0 {
            return Err(TimelineError::InvalidData(
                "minimum item size must be finite and > 0".to_owned(),
            ));
        }
        if !viewport_size.is_finite() || viewport_size < 0.0 {
            return Err(TimelineError::InvalidData(
                "viewport size must be finite and >= 0".to_owned(),
            ));
        }

        self.viewport_size = viewport_size;
        if viewport_size == 0.0 || self.item_count <= 0 {
            self.viewport_item_count = 0;
            self.item_size = 0.0;
            self.scroller_size = 0.0;
            debug!(viewport_size, "axis setup deferred until viewport has a size");
            return Ok(None);
        }

        let wanted = (viewport_size / min_item_size).ceil() as i64;
        self.viewport_item_count = wanted.min(self.item_count).max(1);
        self.item_size = (viewport_size / self.viewport_item_count as f64).ceil();
        self.scroller_size = self.item_count as f64 * self.item_size;
        trace!(
            viewport_item_count = self.viewport_item_count,
            item_size = self.item_size,
            scroller_size = self.scroller_size,
            "axis geometry updated"
        );

        Ok(self.handle_scroll(scroll_offset, 1.0))
    }

    /// Publishes the window for a scroll position.
    ///
    /// `delta` is the signed scroll distance since the last report. Returns
    /// `None` while no geometry has been set up.
    pub fn handle_scroll(&mut self, scroll_value: f64, delta: f64) -> Option<Rc<WindowSnapshot>> {
        let total_size = self.scroller_size;
        if total_size <= 0.0 {
            return None;
        }

        let max_scroll = (total_size - self.viewport_size).max(0.0);
        let scroll_value = if scroll_value.is_finite() {
            scroll_value.clamp(0.0, max_scroll)
        } else {
            0.0
        };
        let time_diff = (self.global_end_ts - self.global_start_ts) as f64;
        let start = self.global_start_ts as f64;
        let visible_start = (start + scroll_value / total_size * time_diff).round() as i64;
        let visible_end =
            (start + (scroll_value + self.viewport_size) / total_size * time_diff).round() as i64;

        let snapshot = Rc::new(WindowSnapshot::new(WindowBounds {
            global_start: self.global_start_ts,
            global_end: self.global_end_ts,
            visible_start,
            visible_end,
            start_offset: scroll_value,
            end_offset: scroll_value + self.viewport_size,
            delta: if delta.is_finite() { delta } else { 0.0 },
            viewport_size: self.viewport_size,
            total_size,
            zoom_level: self.zoom_level,
        }));
        trace!(scroll_value, delta, visible_start, visible_end, "publish window snapshot");

        self.snapshots.publish(Rc::clone(&snapshot));
        self.last_snapshot = Some(Rc::clone(&snapshot));
        Some(snapshot)
    }

    /// Scroll offset that places `[start, end]` in the viewport.
    ///
    /// `percent` biases the placement: `0.0` aligns left, `1.0` aligns right.
    #[must_use]
    pub fn center_offset(&self, start: Timestamp, end: Timestamp, percent: f64) -> f64 {
        let percent = if percent.is_finite() {
            percent.clamp(0.0, 1.0)
        } else {
            0.5
        };
        let span = (self.global_end_ts - self.global_start_ts) as f64;
        let box_size = (end - start) as f64 / span * self.scroller_size;
        let offset = (start - self.global_start_ts) as f64 / span * self.scroller_size;
        (offset - (self.viewport_size - box_size) * percent).max(0.0)
    }

    #[must_use]
    pub fn offset_for_date(&self, timestamp: Timestamp) -> f64 {
        self.center_offset(timestamp, timestamp, 0.5)
    }

    /// Pixel position of `timestamp` inside the last published window.
    #[must_use]
    pub fn visible_offset_for_date(&self, timestamp: Timestamp) -> Option<f64> {
        self.last_snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.visible_offset_for(timestamp))
    }

    #[must_use]
    pub fn first_visible_index(&self, offset: f64) -> Option<i64> {
        if self.item_size <= 0.0 || !offset.is_finite() {
            return None;
        }
        Some((offset / self.item_size).floor() as i64)
    }

    #[must_use]
    pub fn start_date_for_index(&self, index: i64) -> Option<Timestamp> {
        if index < 0 {
            return None;
        }
        Some(
            self.zoom_level
                .add(&self.global_start, index)
                .timestamp_millis(),
        )
    }

    #[must_use]
    pub fn date_range_for_index(&self, index: i64) -> Option<(Timestamp, Timestamp)> {
        if index < 0 {
            return None;
        }
        let start = self.zoom_level.add(&self.global_start, index);
        let end = self.zoom_level.add(&start, 1);
        Some((start.timestamp_millis(), end.timestamp_millis()))
    }

    pub fn increment(&self, timestamp: Timestamp, delta: i64) -> TimelineResult<Timestamp> {
        self.zoom_level
            .add_timestamp(timestamp, delta, self.timezone)
    }

    #[must_use]
    pub fn subscribe(&self) -> Subscription<Rc<WindowSnapshot>> {
        self.snapshots.subscribe()
    }

    #[must_use]
    pub fn zoom_level(&self) -> ZoomLevel {
        self.zoom_level
    }

    #[must_use]
    pub fn timezone(&self) -> CalendarTimeZone {
        self.timezone
    }

    #[must_use]
    pub fn requested_range(&self) -> (Timestamp, Timestamp) {
        self.requested_range
    }

    #[must_use]
    pub fn global_range(&self) -> (Timestamp, Timestamp) {
        (self.global_start_ts, self.global_end_ts)
    }

    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.item_count
    }

    #[must_use]
    pub fn item_size(&self) -> f64 {
        self.item_size
    }

    #[must_use]
    pub fn viewport_size(&self) -> f64 {
        self.viewport_size
    }

    #[must_use]
    pub fn viewport_item_count(&self) -> i64 {
        self.viewport_item_count
    }

    #[must_use]
    pub fn scroller_size(&self) -> f64 {
        self.scroller_size
    }

    #[must_use]
    pub fn last_snapshot(&self) -> Option<&Rc<WindowSnapshot>> {
        self.last_snapshot.as_ref()
    }
}
