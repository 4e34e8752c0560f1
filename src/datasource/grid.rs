use std::cell::Cell;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::core::{CalendarTimeZone, LabelItem, LevelFormat, Timestamp, ZoomLevel};
use crate::datasource::{DatasourceFuture, TimelineDatasource, ready};
use crate::events::{EventBus, Subscription};

/// Synthesizes one label per zoom-grid cell.
///
/// Without a zoom level the sequence is empty.
#[derive(Debug, Default)]
pub struct ZoomGridDatasource {
    zoom_level: Cell<Option<ZoomLevel>>,
    timezone: CalendarTimeZone,
    invalidations: EventBus<()>,
}

impl ZoomGridDatasource {
    #[must_use]
    pub fn new(zoom_level: Option<ZoomLevel>, timezone: CalendarTimeZone) -> Self {
        Self {
            zoom_level: Cell::new(zoom_level),
            timezone,
            invalidations: EventBus::new(),
        }
    }

    #[must_use]
    pub fn zoom_level(&self) -> Option<ZoomLevel> {
        self.zoom_level.get()
    }

    /// Switches the grid; subscribers are notified only on an actual change.
    pub fn set_zoom_level(&self, zoom_level: Option<ZoomLevel>) {
        if self.zoom_level.get() != zoom_level {
            debug!(zoom = ?zoom_level, "label grid zoom level changed");
            self.zoom_level.set(zoom_level);
            self.invalidations.publish(());
        }
    }

    fn datetime(&self, timestamp: Timestamp) -> Option<DateTime<FixedOffset>> {
        self.timezone
            .datetime(timestamp)
            .inspect_err(|error| warn!(%error, "label grid timestamp out of range"))
            .ok()
    }

    fn cell(
        zoom_level: ZoomLevel,
        start: &DateTime<FixedOffset>,
        end: &DateTime<FixedOffset>,
    ) -> LabelItem {
        let start_time = start.timestamp_millis();
        LabelItem {
            id: start_time.to_string(),
            start_time,
            end_time: end.timestamp_millis(),
            text: zoom_level.format(LevelFormat::Full, start),
        }
    }
}

impl TimelineDatasource<LabelItem> for ZoomGridDatasource {
    fn first_item_for_date(&self, timestamp: Timestamp) -> DatasourceFuture<LabelItem> {
        let item = self.zoom_level().zip(self.datetime(timestamp)).map(|(zoom, date)| {
            let start = zoom.trim_to_start(&date);
            let end = zoom.add(&start, 1);
            Self::cell(zoom, &start, &end)
        });
        ready(item)
    }

    fn item_before(&self, item: &LabelItem) -> DatasourceFuture<LabelItem> {
        let item = self
            .zoom_level()
            .zip(self.datetime(item.start_time))
            .map(|(zoom, end)| {
                let start = zoom.add(&end, -1);
                Self::cell(zoom, &start, &end)
            });
        ready(item)
    }

    fn item_after(&self, item: &LabelItem) -> DatasourceFuture<LabelItem> {
        let item = self
            .zoom_level()
            .zip(self.datetime(item.end_time))
            .map(|(zoom, start)| {
                let end = zoom.add(&start, 1);
                Self::cell(zoom, &start, &end)
            });
        ready(item)
    }

    fn on_invalidate(&self) -> Subscription<()> {
        self.invalidations.subscribe()
    }
}
