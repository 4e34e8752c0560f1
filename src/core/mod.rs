pub mod axis;
pub mod calendar;
pub mod render_box;
pub mod types;
pub mod window;
pub mod zoom_level;

pub use axis::AxisHandler;
pub use calendar::{CalendarTimeZone, DAY_MS, HOUR_MS, MINUTE_MS, Timestamp, WEEK_MS};
pub use render_box::RenderBox;
pub use types::{LabelItem, SeriesItem, TimelineItem, Viewport};
pub use window::{WindowBounds, WindowSnapshot};
pub use zoom_level::{LevelFormat, ZoomLevel};
