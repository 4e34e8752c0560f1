use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use crate::core::RenderBox;
use crate::view::{TimelineView, ViewBox, ViewFactory, ViewGeometry, ViewLayout};

#[derive(Debug, Default)]
struct Counters {
    constructed: Cell<usize>,
    destroyed: Cell<usize>,
    layout_writes: Cell<usize>,
}

/// Headless view that records what the renderer asked of it.
///
/// Used by tests, benches and hosts that only need positions.
#[derive(Debug)]
pub struct RecordingView<T> {
    serial: usize,
    geometry: ViewGeometry,
    inserted: bool,
    attached: bool,
    disabled: bool,
    destroyed: bool,
    data: Option<T>,
    render_box: RenderBox,
    layout: Option<ViewLayout>,
    layout_writes: usize,
    updates: usize,
    counters: Rc<Counters>,
}

impl<T> RecordingView<T> {
    fn new(serial: usize, counters: Rc<Counters>) -> Self {
        Self {
            serial,
            geometry: ViewGeometry::new(),
            inserted: false,
            attached: false,
            disabled: false,
            destroyed: false,
            data: None,
            render_box: RenderBox::EMPTY,
            layout: None,
            layout_writes: 0,
            updates: 0,
            counters,
        }
    }

    /// Construction order within the owning factory, starting at 0.
    #[must_use]
    pub fn serial(&self) -> usize {
        self.serial
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn render_box(&self) -> RenderBox {
        self.render_box
    }

    /// Last layout written to the imaginary host element.
    #[must_use]
    pub fn layout(&self) -> Option<ViewLayout> {
        self.layout
    }

    #[must_use]
    pub fn staged_box(&self) -> ViewBox {
        self.geometry.staged()
    }

    #[must_use]
    pub fn layout_writes(&self) -> usize {
        self.layout_writes
    }

    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl<T: Clone> TimelineView<T> for RecordingView<T> {
    fn is_inserted(&self) -> bool {
        self.inserted
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn insert(&mut self) -> bool {
        if self.inserted || self.destroyed {
            return false;
        }
        self.inserted = true;
        self.attached = true;
        true
    }

    fn attach(&mut self) -> bool {
        if self.inserted && !self.attached {
            self.attached = true;
            return true;
        }
        false
    }

    fn detach(&mut self) -> bool {
        if self.attached {
            self.attached = false;
            return true;
        }
        false
    }

    fn set_position(&mut self, view_box: &ViewBox, refresh_now: bool) {
        self.geometry.stage(view_box);
        if refresh_now {
            self.refresh_position();
        }
    }

    fn refresh_position(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        let Some(layout) = self.geometry.take_layout() else {
            return false;
        };
        self.layout = Some(layout);
        self.layout_writes += 1;
        self.counters
            .layout_writes
            .set(self.counters.layout_writes.get() + 1);
        true
    }

    fn update(&mut self, data: &T, render_box: RenderBox, view_box: &ViewBox) {
        self.data = Some(data.clone());
        self.render_box = render_box;
        self.updates += 1;
        self.set_position(view_box, false);
        self.refresh_position();
        self.insert();
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        trace!(serial = self.serial, "recording view destroyed");
        self.destroyed = true;
        self.inserted = false;
        self.attached = false;
        self.counters
            .destroyed
            .set(self.counters.destroyed.get() + 1);
    }
}

/// Factory for [`RecordingView`]s sharing construction counters.
///
/// Clones share the same counters, so a test can keep one handle while the
/// renderer owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingViewFactory {
    counters: Rc<Counters>,
}

impl RecordingViewFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn constructed(&self) -> usize {
        self.counters.constructed.get()
    }

    #[must_use]
    pub fn destroyed(&self) -> usize {
        self.counters.destroyed.get()
    }

    /// Layout writes across every view this factory built.
    #[must_use]
    pub fn layout_writes(&self) -> usize {
        self.counters.layout_writes.get()
    }

    #[must_use]
    pub fn build<T>(&self) -> RecordingView<T> {
        let serial = self.counters.constructed.get();
        self.counters.constructed.set(serial + 1);
        RecordingView::new(serial, Rc::clone(&self.counters))
    }
}

impl<T> ViewFactory<RecordingView<T>> for RecordingViewFactory {
    fn create_view(&mut self) -> RecordingView<T> {
        self.build()
    }
}
