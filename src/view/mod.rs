//! Renderable handles driven by the series renderer.
//!
//! The renderer never looks inside a view. It binds item data and geometry
//! through [`TimelineView`] and creates new views through a [`ViewFactory`].

mod geometry;
mod recording;

pub use geometry::{ViewBox, ViewGeometry, ViewLayout, ViewVisibility};
pub use recording::{RecordingView, RecordingViewFactory};

use crate::core::RenderBox;

pub trait TimelineView<T> {
    fn is_inserted(&self) -> bool;

    fn is_destroyed(&self) -> bool;

    /// Adds the view to the host tree. Returns `false` when already inserted.
    fn insert(&mut self) -> bool;

    /// Re-includes a detached view without touching its state. Called when
    /// a recycled view is handed out again.
    fn attach(&mut self) -> bool;

    /// Silences the view while it keeps its pooled identity. Called when the
    /// view moves to the recycle list.
    fn detach(&mut self) -> bool;

    /// Stages geometry; `refresh_now` applies it immediately.
    fn set_position(&mut self, view_box: &ViewBox, refresh_now: bool);

    /// Applies staged geometry. Returns `true` when a layout write happened.
    fn refresh_position(&mut self) -> bool;

    /// Binds item data and geometry together.
    fn update(&mut self, data: &T, render_box: RenderBox, view_box: &ViewBox);

    fn set_disabled(&mut self, disabled: bool);

    /// Irreversible; later calls are no-ops.
    fn destroy(&mut self);
}

/// Produces fresh views for the renderer's pool.
pub trait ViewFactory<V> {
    fn create_view(&mut self) -> V;
}

impl<V, F> ViewFactory<V> for F
where
    F: FnMut() -> V,
{
    fn create_view(&mut self) -> V {
        self()
    }
}
