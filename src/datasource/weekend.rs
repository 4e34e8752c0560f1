use tracing::warn;

use crate::core::{CalendarTimeZone, SeriesItem, Timestamp, ZoomLevel};
use crate::datasource::{DatasourceFuture, TimelineDatasource, ready};
use crate::events::Subscription;

/// Endless sequence of weekends, Saturday 00:00 to Monday 00:00.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendDatasource {
    timezone: CalendarTimeZone,
}

impl WeekendDatasource {
    #[must_use]
    pub fn new(timezone: CalendarTimeZone) -> Self {
        Self { timezone }
    }

    /// The weekend ending at the week boundary `offset` weeks after the one
    /// at or following `anchor`.
    fn weekend(&self, anchor: Timestamp, offset: i64) -> Option<SeriesItem> {
        let date = self
            .timezone
            .datetime(anchor)
            .inspect_err(|error| warn!(%error, "weekend anchor out of range"))
            .ok()?;
        let end = ZoomLevel::Week.add(&ZoomLevel::Week.trim_to_end(&date), offset);
        let start = ZoomLevel::Day.add(&end, -2);
        let start_time = start.timestamp_millis();
        Some(SeriesItem::new(
            start_time.to_string(),
            start_time,
            end.timestamp_millis(),
        ))
    }
}

impl TimelineDatasource<SeriesItem> for WeekendDatasource {
    fn first_item_for_date(&self, timestamp: Timestamp) -> DatasourceFuture<SeriesItem> {
        ready(self.weekend(timestamp, 0))
    }

    fn item_before(&self, item: &SeriesItem) -> DatasourceFuture<SeriesItem> {
        ready(self.weekend(item.end_time, -1))
    }

    fn item_after(&self, item: &SeriesItem) -> DatasourceFuture<SeriesItem> {
        ready(self.weekend(item.end_time, 1))
    }

    fn on_invalidate(&self) -> Subscription<()> {
        Subscription::detached()
    }
}
