use serde::{Deserialize, Serialize};

use crate::core::calendar::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Anything placed on the time axis.
///
/// Datasources yield items in ascending `start_time` order; `id` identifies
/// an item across traversals so recycled views can keep their binding.
pub trait TimelineItem: Clone + 'static {
    fn id(&self) -> &str;
    fn start_time(&self) -> Timestamp;
    fn end_time(&self) -> Timestamp;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesItem {
    pub id: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

impl SeriesItem {
    #[must_use]
    pub fn new(id: impl Into<String>, start_time: Timestamp, end_time: Timestamp) -> Self {
        Self {
            id: id.into(),
            start_time,
            end_time,
        }
    }
}

impl TimelineItem for SeriesItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn start_time(&self) -> Timestamp {
        self.start_time
    }

    fn end_time(&self) -> Timestamp {
        self.end_time
    }
}

/// Header label covering one zoom-grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelItem {
    pub id: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub text: String,
}

impl TimelineItem for LabelItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn start_time(&self) -> Timestamp {
        self.start_time
    }

    fn end_time(&self) -> Timestamp {
        self.end_time
    }
}
