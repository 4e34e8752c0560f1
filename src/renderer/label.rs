use std::rc::Rc;

use crate::core::{AxisHandler, CalendarTimeZone, LabelItem, ZoomLevel};
use crate::datasource::{TimelineDatasource, ZoomGridDatasource};
use crate::error::TimelineResult;
use crate::events::Subscription;
use crate::renderer::config::RenderAxisConfig;
use crate::renderer::series::{RendererState, SeriesRenderer};
use crate::renderer::strategy::{StickyLabelRefresh, TextMeasurer, UpdateStrategy};
use crate::view::{TimelineView, ViewFactory};

/// Header row with one label per zoom-grid cell.
///
/// The first visible label sticks to the window start until the next label
/// pushes it out.
#[derive(Debug)]
pub struct LabelRenderer<V: TimelineView<LabelItem>> {
    renderer: SeriesRenderer<LabelItem, V>,
    grid: Rc<ZoomGridDatasource>,
    zoom_changes: Option<Subscription<ZoomLevel>>,
}

impl<V: TimelineView<LabelItem> + 'static> LabelRenderer<V> {
    pub fn new<M: TextMeasurer + 'static>(
        factory: impl ViewFactory<V> + 'static,
        measurer: M,
        timezone: CalendarTimeZone,
        axis_config: RenderAxisConfig,
    ) -> TimelineResult<Self> {
        let grid = Rc::new(ZoomGridDatasource::new(None, timezone));
        let mut renderer = SeriesRenderer::new(factory)
            .with_update_strategy(UpdateStrategy::RebuildAllVisible)
            .with_boundary_refresh(StickyLabelRefresh::new(measurer))
            .with_axis_config(axis_config)?;
        let datasource: Rc<dyn TimelineDatasource<LabelItem>> = grid.clone();
        renderer.set_datasource(Some(datasource))?;
        Ok(Self {
            renderer,
            grid,
            zoom_changes: None,
        })
    }

    /// Adopts the axis zoom level and follows its snapshots.
    pub fn connect(&mut self, axis: &AxisHandler) {
        self.grid.set_zoom_level(Some(axis.zoom_level()));
        self.renderer.connect(axis);
    }

    /// Keeps the label grid in step with zoom changes.
    pub fn watch_zoom(&mut self, zoom_changes: Subscription<ZoomLevel>) {
        self.zoom_changes = Some(zoom_changes);
    }

    pub fn tick(&mut self) -> TimelineResult<RendererState> {
        if let Some(zoom) = self
            .zoom_changes
            .as_ref()
            .and_then(Subscription::take_latest)
        {
            self.grid.set_zoom_level(Some(zoom));
        }
        self.renderer.tick()
    }

    #[must_use]
    pub fn grid(&self) -> &ZoomGridDatasource {
        &self.grid
    }

    #[must_use]
    pub fn renderer(&self) -> &SeriesRenderer<LabelItem, V> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut SeriesRenderer<LabelItem, V> {
        &mut self.renderer
    }
}
