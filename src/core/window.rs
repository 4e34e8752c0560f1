use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::calendar::Timestamp;
use crate::core::render_box::{RenderBox, round_to};
use crate::core::zoom_level::ZoomLevel;

/// Raw values a [`WindowSnapshot`] is built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub global_start: Timestamp,
    pub global_end: Timestamp,
    pub visible_start: Timestamp,
    pub visible_end: Timestamp,
    pub start_offset: f64,
    pub end_offset: f64,
    pub delta: f64,
    pub viewport_size: f64,
    pub total_size: f64,
    pub zoom_level: ZoomLevel,
}

/// Immutable description of the visible time/pixel window for one scroll tick.
///
/// Snapshots are shared as `Rc<WindowSnapshot>`. Two snapshots with equal
/// content are still distinct ticks, so consumers compare them with
/// `Rc::ptr_eq` rather than `==` when deciding whether work is stale.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSnapshot {
    bounds: WindowBounds,
    origin: Option<Rc<WindowSnapshot>>,
}

impl WindowSnapshot {
    #[must_use]
    pub fn new(bounds: WindowBounds) -> Self {
        Self {
            bounds,
            origin: None,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> WindowBounds {
        self.bounds
    }

    #[must_use]
    pub fn global_start(&self) -> Timestamp {
        self.bounds.global_start
    }

    #[must_use]
    pub fn global_end(&self) -> Timestamp {
        self.bounds.global_end
    }

    #[must_use]
    pub fn visible_start(&self) -> Timestamp {
        self.bounds.visible_start
    }

    #[must_use]
    pub fn visible_end(&self) -> Timestamp {
        self.bounds.visible_end
    }

    #[must_use]
    pub fn start_offset(&self) -> f64 {
        self.bounds.start_offset
    }

    #[must_use]
    pub fn end_offset(&self) -> f64 {
        self.bounds.end_offset
    }

    /// Signed scroll distance since the previous tick; the sign gives direction.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.bounds.delta
    }

    #[must_use]
    pub fn viewport_size(&self) -> f64 {
        self.bounds.viewport_size
    }

    #[must_use]
    pub fn total_size(&self) -> f64 {
        self.bounds.total_size
    }

    #[must_use]
    pub fn zoom_level(&self) -> ZoomLevel {
        self.bounds.zoom_level
    }

    /// The root snapshot an inset variant was derived from.
    #[must_use]
    pub fn origin(&self) -> Option<&Rc<WindowSnapshot>> {
        self.origin.as_ref()
    }

    /// Derives a window whose edges move inward by the given pixel insets.
    ///
    /// Negative insets extend the window. Timestamps move proportionally to the
    /// pixel change. Zero insets return the same snapshot.
    #[must_use]
    pub fn with_offsets(self: &Rc<Self>, start_inset: f64, end_inset: f64) -> Rc<Self> {
        if start_inset == 0.0 && end_inset == 0.0 {
            return Rc::clone(self);
        }

        let bounds = self.bounds;
        let start_offset = bounds.start_offset + start_inset;
        let end_offset = (bounds.end_offset - end_inset).max(start_offset);
        let (start_ratio, end_ratio) = if bounds.viewport_size > 0.0 {
            (
                start_inset / bounds.viewport_size,
                end_inset / bounds.viewport_size,
            )
        } else {
            (0.0, 0.0)
        };
        let ts_diff = (bounds.visible_end - bounds.visible_start) as f64;
        let visible_start = (bounds.visible_start as f64 + ts_diff * start_ratio).round() as i64;
        let visible_end = ((bounds.visible_end as f64 - ts_diff * end_ratio).round() as i64)
            .max(visible_start);

        Rc::new(Self {
            bounds: WindowBounds {
                visible_start,
                visible_end,
                start_offset,
                end_offset,
                viewport_size: end_offset - start_offset,
                ..bounds
            },
            origin: Some(
                self.origin
                    .as_ref()
                    .map_or_else(|| Rc::clone(self), Rc::clone),
            ),
        })
    }

    /// Pixel geometry of `[from, to]` on the full scroller.
    ///
    /// Intervals that are inverted or entirely outside the global range get
    /// [`RenderBox::EMPTY`]; intervals straddling the global range are clamped.
    #[must_use]
    pub fn render_box(&self, from: Timestamp, to: Timestamp) -> RenderBox {
        let WindowBounds {
            global_start,
            global_end,
            total_size,
            ..
        } = self.bounds;
        let span = global_end - global_start;
        if to < from || span <= 0 || to <= global_start || from >= global_end {
            return RenderBox::EMPTY;
        }

        let from = from.max(global_start);
        let to = to.min(global_end);
        let span = span as f64;
        let box_size = (to - from) as f64 / span * total_size;
        let offset = (from - global_start) as f64 / span * total_size;

        let visible = self.is_range_visible(from, to);
        let (mut clip_start, mut clip_end) = (0.0, 0.0);
        if visible && to > from {
            let diff = (to - from) as f64;
            let start_ratio = ((self.bounds.visible_start - from).max(0) as f64 / diff).min(1.0);
            let end_ratio = ((to - self.bounds.visible_end).max(0) as f64 / diff).min(1.0);
            clip_start = round_to(start_ratio * box_size, 2);
            clip_end = round_to(end_ratio * box_size, 2);
        }

        let size = round_to(box_size, 2);
        let start_offset = round_to(offset, 2);
        RenderBox {
            start_offset,
            end_offset: start_offset + size,
            size,
            visible_size: if visible {
                (size - clip_start - clip_end).max(0.0)
            } else {
                0.0
            },
            clip_start,
            clip_end,
        }
    }

    /// The part of `[from, to]` that lies inside the visible window.
    #[must_use]
    pub fn visible_render_box(&self, from: Timestamp, to: Timestamp) -> RenderBox {
        if !self.is_range_visible(from, to) {
            return RenderBox::EMPTY;
        }
        let full = self.render_box(from, to);
        let start_offset = full.start_offset + full.clip_start;
        RenderBox {
            start_offset,
            end_offset: start_offset + full.visible_size,
            size: full.visible_size,
            ..full
        }
    }

    #[must_use]
    pub fn is_render_box_visible(&self, render_box: &RenderBox) -> bool {
        render_box.start_offset < self.bounds.end_offset
            && render_box.end_offset > self.bounds.start_offset
    }

    #[must_use]
    pub fn is_range_visible(&self, from: Timestamp, to: Timestamp) -> bool {
        from < self.bounds.visible_end && to > self.bounds.visible_start
    }

    /// Milliseconds of `[from, to]` that fall inside the visible window.
    #[must_use]
    pub fn range_overlap(&self, from: Timestamp, to: Timestamp) -> i64 {
        (to.min(self.bounds.visible_end) - from.max(self.bounds.visible_start)).max(0)
    }

    /// Pixel position of `timestamp` when it lies inside the visible window.
    #[must_use]
    pub fn visible_offset_for(&self, timestamp: Timestamp) -> Option<f64> {
        let WindowBounds {
            visible_start,
            visible_end,
            start_offset,
            end_offset,
            ..
        } = self.bounds;
        if visible_start <= timestamp && timestamp < visible_end {
            let ratio = (timestamp - visible_start) as f64 / (visible_end - visible_start) as f64;
            Some((start_offset + (end_offset - start_offset) * ratio).round())
        } else {
            None
        }
    }
}
