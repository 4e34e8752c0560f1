use std::fmt;
use std::rc::Rc;
use std::task::Poll;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::{AxisHandler, RenderBox, TimelineItem, Timestamp, WindowSnapshot};
use crate::datasource::TimelineDatasource;
use crate::error::TimelineResult;
use crate::events::{CancelSignal, Subscription};
use crate::renderer::config::RenderAxisConfig;
use crate::renderer::pool::{ViewKey, ViewPool};
use crate::renderer::strategy::{
    BoundaryContext, BoundaryRefresh, NoBoundaryRefresh, UpdateStrategy,
};
use crate::renderer::traversal::{EdgeHit, EdgeSide, Traversal, TraversalOutcome};
use crate::view::{TimelineView, ViewFactory};

/// Item bound to a view together with its geometry on the full scroller.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult<T> {
    pub item: T,
    pub render_box: RenderBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RendererState {
    #[default]
    Idle,
    /// A traversal is waiting on the datasource.
    Loading,
    /// Results are being applied to views.
    Settling,
    /// The last traversal was cancelled before it finished.
    Cancelled,
}

/// Known end of data in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasourceEdge {
    /// Global range boundary the edge was recorded at.
    pub at: Timestamp,
    /// Last timestamp known to hold data before the edge.
    pub limit: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatasourceEdges {
    pub start: Option<DatasourceEdge>,
    pub end: Option<DatasourceEdge>,
    /// Bumped on every reset; edges found by older traversals are dropped.
    pub version: u64,
}

/// Virtualizing renderer for one series of timeline items.
///
/// The renderer follows window snapshots, walks the datasource from the
/// current boundary view, and keeps a pool of views so that only items near
/// the visible window hold a rendered view. Work happens on [`tick`], which a
/// host calls once per animation frame.
///
/// [`tick`]: SeriesRenderer::tick
pub struct SeriesRenderer<T: TimelineItem, V: TimelineView<T>> {
    factory: Box<dyn ViewFactory<V>>,
    pool: ViewPool<T, V>,
    load_results: IndexMap<ViewKey, LoadResult<T>>,
    datasource: Option<Rc<dyn TimelineDatasource<T>>>,
    invalidations: Option<Subscription<()>>,
    snapshots: Option<Subscription<Rc<WindowSnapshot>>>,
    edges: DatasourceEdges,
    axis_config: RenderAxisConfig,
    update_strategy: UpdateStrategy,
    boundary_refresh: Box<dyn BoundaryRefresh<T, V>>,
    enabled: bool,
    state: RendererState,
    last_snapshot: Option<Rc<WindowSnapshot>>,
    traversal: Option<Traversal<T>>,
    cancel: CancelSignal,
}

impl<T: TimelineItem, V: TimelineView<T>> fmt::Debug for SeriesRenderer<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesRenderer")
            .field("state", &self.state)
            .field("enabled", &self.enabled)
            .field("edges", &self.edges)
            .field("rendered", &self.pool.rendered_len())
            .field("recycled", &self.pool.recycled_len())
            .field("update_strategy", &self.update_strategy)
            .finish_non_exhaustive()
    }
}

impl<T, V> SeriesRenderer<T, V>
where
    T: TimelineItem,
    V: TimelineView<T> + 'static,
{
    #[must_use]
    pub fn new(factory: impl ViewFactory<V> + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            pool: ViewPool::new(),
            load_results: IndexMap::new(),
            datasource: None,
            invalidations: None,
            snapshots: None,
            edges: DatasourceEdges::default(),
            axis_config: RenderAxisConfig::default(),
            update_strategy: UpdateStrategy::default(),
            boundary_refresh: Box::new(NoBoundaryRefresh),
            enabled: true,
            state: RendererState::Idle,
            last_snapshot: None,
            traversal: None,
            cancel: CancelSignal::new(),
        }
    }

    #[must_use]
    pub fn with_update_strategy(mut self, update_strategy: UpdateStrategy) -> Self {
        self.update_strategy = update_strategy;
        self
    }

    #[must_use]
    pub fn with_boundary_refresh(mut self, refresh: impl BoundaryRefresh<T, V> + 'static) -> Self {
        self.boundary_refresh = Box::new(refresh);
        self
    }

    pub fn with_axis_config(mut self, config: RenderAxisConfig) -> TimelineResult<Self> {
        config.validate()?;
        self.axis_config = config;
        Ok(self)
    }

    /// Swaps the datasource; views are destroyed and edges forgotten.
    pub fn set_datasource(
        &mut self,
        datasource: Option<Rc<dyn TimelineDatasource<T>>>,
    ) -> TimelineResult<()> {
        let unchanged = match (&self.datasource, &datasource) {
            (None, None) => true,
            (Some(current), Some(next)) => std::ptr::addr_eq(Rc::as_ptr(current), Rc::as_ptr(next)),
            _ => false,
        };
        if unchanged {
            return Ok(());
        }
        self.datasource = datasource;
        self.reset_datasource()
    }

    /// Follows snapshots published by `axis`; they are consumed on [`Self::tick`].
    pub fn connect(&mut self, axis: &AxisHandler) {
        self.snapshots = Some(axis.subscribe());
    }

    pub fn disconnect(&mut self) {
        self.cancel_render("disconnected");
        self.snapshots = None;
    }

    pub fn set_enabled(&mut self, enabled: bool) -> TimelineResult<()> {
        if self.enabled == enabled {
            return Ok(());
        }
        self.enabled = enabled;
        debug!(enabled, "series renderer enabled changed");
        if enabled {
            if let Some(snapshot) = self.last_snapshot.clone() {
                return self.begin_pass(None, snapshot);
            }
        } else {
            self.cancel_render("disabled");
            self.destroy_all_views();
        }
        Ok(())
    }

    /// Cancels the in-flight traversal, if any.
    pub fn cancel_render(&mut self, reason: &str) {
        if self.traversal.take().is_some() {
            self.cancel.cancel();
            trace!(reason, "render cancelled");
            if self.state == RendererState::Loading {
                self.state = RendererState::Cancelled;
            }
        }
        self.cancel = CancelSignal::new();
    }

    /// Runs one animation frame: datasource invalidations, the newest
    /// snapshot, then any traversal still waiting on the datasource.
    ///
    /// Invariant violations raised by a traversal are returned unrecovered.
    pub fn tick(&mut self) -> TimelineResult<RendererState> {
        let invalidated = self
            .invalidations
            .as_ref()
            .is_some_and(|subscription| !subscription.drain().is_empty());
        let latest = self.snapshots.as_ref().and_then(Subscription::take_latest);

        if invalidated {
            if let Some(root) = latest {
                self.last_snapshot = Some(self.derive(&root));
            }
            self.reset_datasource()?;
        } else if let Some(root) = latest {
            self.handle_snapshot(root)?;
        } else if self.traversal.is_some() {
            self.drive()?;
        }
        Ok(self.state)
    }

    /// Reacts to a new window.
    pub fn handle_snapshot(&mut self, root: Rc<WindowSnapshot>) -> TimelineResult<()> {
        let snapshot = self.derive(&root);
        self.cancel_render("scroll");

        let previous = self.last_snapshot.replace(Rc::clone(&snapshot));
        if let Some(previous) = &previous {
            let regridded = previous.zoom_level() != snapshot.zoom_level()
                || previous.global_start() != snapshot.global_start()
                || previous.global_end() != snapshot.global_end();
            if regridded {
                debug!(
                    zoom = snapshot.zoom_level().key(),
                    "zoom or global range changed, recycling every view"
                );
                self.recycle_all();
                self.reset_edges();
            } else if previous.total_size() != snapshot.total_size() {
                debug!(
                    total_size = snapshot.total_size(),
                    "item size changed, recycling every view"
                );
                self.recycle_all();
            }
        }

        if !self.enabled {
            return Ok(());
        }
        self.begin_pass(previous.as_ref(), snapshot)
    }

    fn derive(&self, root: &Rc<WindowSnapshot>) -> Rc<WindowSnapshot> {
        root.with_offsets(self.axis_config.start_inset, self.axis_config.end_inset)
    }

    fn reset_datasource(&mut self) -> TimelineResult<()> {
        self.cancel_render("datasource reset");
        self.destroy_all_views();
        self.invalidations = self
            .datasource
            .as_ref()
            .map(|datasource| datasource.on_invalidate());
        self.reset_edges();
        self.boundary_refresh.reset();
        debug!(
            version = self.edges.version,
            has_datasource = self.datasource.is_some(),
            "datasource reset"
        );

        match self.last_snapshot.clone() {
            Some(snapshot) if self.is_active() => self.begin_pass(None, snapshot),
            _ => Ok(()),
        }
    }

    fn reset_edges(&mut self) {
        self.edges = DatasourceEdges {
            start: None,
            end: None,
            version: self.edges.version + 1,
        };
    }

    fn begin_pass(
        &mut self,
        previous: Option<&Rc<WindowSnapshot>>,
        snapshot: Rc<WindowSnapshot>,
    ) -> TimelineResult<()> {
        let Some(datasource) = self.datasource.clone().filter(|_| self.enabled) else {
            debug!("renderer inactive, window ignored");
            return Ok(());
        };

        if previous.is_none_or(|previous| previous.viewport_size() != snapshot.viewport_size()) {
            self.destroy_all_views();
        } else {
            self.recycle_not_visible(&snapshot);
        }
        if snapshot.viewport_size() <= 0.0 {
            trace!("zero-size window, nothing to load yet");
            self.state = RendererState::Idle;
            return Ok(());
        }

        let ascending = self.pool.rendered_len() == 0 || snapshot.delta() >= 0.0;
        let boundary = if ascending {
            self.pool.last_rendered()
        } else {
            self.pool.first_rendered()
        };
        let sibling = boundary
            .and_then(|key| self.load_results.get(&key))
            .map(|result| result.item.clone());

        if self.edge_reached(&snapshot, ascending, sibling.as_ref()) {
            trace!(ascending, "datasource edge already known, skipping traversal");
            self.settle(&snapshot);
            return Ok(());
        }
        if let Some(sibling) = &sibling {
            if !snapshot.is_range_visible(sibling.start_time(), sibling.end_time()) {
                trace!(sibling = sibling.id(), "boundary item outside window, nothing to load");
                self.settle(&snapshot);
                return Ok(());
            }
        }

        trace!(ascending, sibling = sibling.as_ref().map(|item| item.id()), "traversal started");
        self.traversal = Some(Traversal::new(
            datasource,
            snapshot,
            ascending,
            sibling,
            self.cancel.clone(),
            self.edges.version,
        ));
        self.state = RendererState::Loading;
        self.drive()
    }

    fn edge_reached(&self, snapshot: &WindowSnapshot, ascending: bool, sibling: Option<&T>) -> bool {
        if ascending {
            self.edges.end.is_some_and(|edge| match sibling {
                Some(sibling) => sibling.end_time() >= edge.limit,
                None => snapshot.visible_start() >= edge.limit,
            })
        } else {
            self.edges.start.is_some_and(|edge| match sibling {
                Some(sibling) => sibling.start_time() <= edge.limit,
                None => snapshot.visible_end() <= edge.limit,
            })
        }
    }

    fn drive(&mut self) -> TimelineResult<()> {
        let Some(traversal) = self.traversal.as_mut() else {
            return Ok(());
        };
        let poll = match traversal.poll(self.last_snapshot.as_ref()) {
            Ok(poll) => poll,
            Err(error) => {
                self.traversal = None;
                return Err(error);
            }
        };
        match poll {
            Poll::Pending => Ok(()),
            Poll::Ready(outcome) => match self.traversal.take() {
                Some(traversal) => {
                    self.finish(&traversal, outcome);
                    Ok(())
                }
                None => Ok(()),
            },
        }
    }

    fn finish(&mut self, traversal: &Traversal<T>, outcome: TraversalOutcome<T>) {
        match outcome {
            TraversalOutcome::Cancelled => {
                self.state = RendererState::Cancelled;
            }
            TraversalOutcome::Stale => {
                self.state = RendererState::Idle;
            }
            TraversalOutcome::Finished { items, edges } => {
                let snapshot = Rc::clone(traversal.snapshot());
                let current = self
                    .last_snapshot
                    .as_ref()
                    .is_some_and(|latest| Rc::ptr_eq(latest, &snapshot));
                if !current {
                    trace!(loaded = items.len(), "discarding results of a superseded window");
                    self.state = RendererState::Idle;
                    return;
                }
                for edge in edges {
                    self.record_edge(traversal.edge_version(), edge, &snapshot);
                }
                self.state = RendererState::Settling;
                self.apply(&snapshot, items, !traversal.is_ascending());
                self.settle(&snapshot);
            }
        }
    }

    fn record_edge(&mut self, version: u64, hit: EdgeHit, snapshot: &WindowSnapshot) {
        if version != self.edges.version {
            trace!(version, current = self.edges.version, "dropping edge from an older reset");
            return;
        }
        match hit.side {
            EdgeSide::Start => {
                self.edges.start = Some(DatasourceEdge {
                    at: snapshot.global_start(),
                    limit: hit.limit,
                });
            }
            EdgeSide::End => {
                self.edges.end = Some(DatasourceEdge {
                    at: snapshot.global_end(),
                    limit: hit.limit,
                });
            }
        }
        debug!(edges = ?self.edges, "datasource edge recorded");
    }

    fn apply(&mut self, snapshot: &WindowSnapshot, items: Vec<T>, prepend: bool) {
        if items.is_empty() {
            return;
        }

        let mut known: IndexMap<String, ViewKey> = self
            .pool
            .rendered()
            .filter_map(|key| {
                self.load_results
                    .get(&key)
                    .map(|result| (result.item.id().to_owned(), key))
            })
            .collect();
        let mut to_update: Vec<ViewKey> = match self.update_strategy {
            UpdateStrategy::AppendOnly => Vec::with_capacity(items.len()),
            UpdateStrategy::RebuildAllVisible => known.values().copied().collect(),
        };

        for item in items {
            let render_box = snapshot.render_box(item.start_time(), item.end_time());
            if let Some(&key) = known.get(item.id()) {
                if self.update_strategy == UpdateStrategy::RebuildAllVisible {
                    self.load_results.insert(key, LoadResult { item, render_box });
                }
                continue;
            }

            let key = self.pool.acquire(item.id(), self.factory.as_mut());
            if prepend {
                self.pool.push_front(key);
            } else {
                self.pool.push_back(key);
            }
            known.insert(item.id().to_owned(), key);
            self.load_results.insert(key, LoadResult { item, render_box });
            to_update.push(key);
        }

        trace!(updated = to_update.len(), prepend, "positioning views");
        for key in to_update {
            self.update_view(key);
        }
    }

    fn update_view(&mut self, key: ViewKey) {
        let (Some(result), Some(view)) = (self.load_results.get(&key), self.pool.get_mut(key))
        else {
            return;
        };
        let render_box = result.render_box;
        let view_box = self
            .axis_config
            .view_box(render_box.start_offset, render_box.size);
        view.update(&result.item, render_box, &view_box);
    }

    fn settle(&mut self, snapshot: &Rc<WindowSnapshot>) {
        self.state = RendererState::Settling;
        let mut context = BoundaryContext {
            snapshot,
            axis: &self.axis_config,
            pool: &mut self.pool,
            load_results: &self.load_results,
        };
        self.boundary_refresh.refresh(&mut context);
        self.state = RendererState::Idle;
    }

    /// Recycles views outside the window, keeping one anchor on each side.
    fn recycle_not_visible(&mut self, snapshot: &WindowSnapshot) {
        let keys: Vec<ViewKey> = self.pool.rendered().collect();
        let visible: Vec<bool> = keys
            .iter()
            .map(|key| {
                self.load_results
                    .get(key)
                    .is_some_and(|result| snapshot.is_render_box_visible(&result.render_box))
            })
            .collect();
        let first = visible.iter().position(|is_visible| *is_visible);
        let last = visible.iter().rposition(|is_visible| *is_visible);

        for (index, key) in keys.into_iter().enumerate() {
            let keep = match (first, last) {
                (Some(first), Some(last)) => {
                    visible[index] || index + 1 == first || index == last + 1
                }
                _ => false,
            };
            if !keep {
                self.recycle(key);
            }
        }
    }

    fn recycle(&mut self, key: ViewKey) {
        self.load_results.shift_remove(&key);
        self.pool.recycle(key);
    }

    fn recycle_all(&mut self) {
        let keys: Vec<ViewKey> = self.pool.rendered().collect();
        for key in keys {
            self.recycle(key);
        }
    }

    fn destroy_all_views(&mut self) {
        let destroyed = self.pool.destroy_all();
        self.load_results.clear();
        if destroyed > 0 {
            trace!(destroyed, "destroyed every view");
        }
    }

    #[must_use]
    pub fn state(&self) -> RendererState {
        self.state
    }

    /// Enabled and attached to a datasource.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.datasource.is_some()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn datasource(&self) -> Option<&Rc<dyn TimelineDatasource<T>>> {
        self.datasource.as_ref()
    }

    #[must_use]
    pub fn datasource_edges(&self) -> DatasourceEdges {
        self.edges
    }

    #[must_use]
    pub fn axis_config(&self) -> RenderAxisConfig {
        self.axis_config
    }

    #[must_use]
    pub fn update_strategy(&self) -> UpdateStrategy {
        self.update_strategy
    }

    /// The inset-adjusted window the renderer last worked against.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<&Rc<WindowSnapshot>> {
        self.last_snapshot.as_ref()
    }

    #[must_use]
    pub fn has_pending_traversal(&self) -> bool {
        self.traversal.is_some()
    }

    /// Items bound to rendered views, in time order.
    #[must_use]
    pub fn rendered_items(&self) -> Vec<&T> {
        self.views().map(|(item, _)| item).collect()
    }

    /// Rendered views with their items, in time order.
    pub fn views(&self) -> impl Iterator<Item = (&T, &V)> + '_ {
        self.pool.rendered().filter_map(|key| {
            let result = self.load_results.get(&key)?;
            Some((&result.item, self.pool.get(key)?))
        })
    }

    #[must_use]
    pub fn load_result(&self, key: ViewKey) -> Option<&LoadResult<T>> {
        self.load_results.get(&key)
    }

    #[must_use]
    pub fn rendered_keys(&self) -> Vec<ViewKey> {
        self.pool.rendered().collect()
    }

    #[must_use]
    pub fn view(&self, key: ViewKey) -> Option<&V> {
        self.pool.get(key)
    }

    /// Views constructed and not destroyed, rendered or recycled.
    #[must_use]
    pub fn live_view_count(&self) -> usize {
        self.pool.live_count()
    }

    #[must_use]
    pub fn recycled_count(&self) -> usize {
        self.pool.recycled_len()
    }

    #[must_use]
    pub fn first_visible_item(&self) -> Option<&T> {
        self.visible_item(false)
    }

    #[must_use]
    pub fn last_visible_item(&self) -> Option<&T> {
        self.visible_item(true)
    }

    fn visible_item(&self, from_end: bool) -> Option<&T> {
        let snapshot = self.last_snapshot.as_ref()?;
        let key = boundary_key(&self.pool, &self.load_results, snapshot, from_end)?;
        self.load_results.get(&key).map(|result| &result.item)
    }
}

/// First (or last) rendered view whose box intersects the window.
pub(crate) fn boundary_key<T, V: TimelineView<T>>(
    pool: &ViewPool<T, V>,
    load_results: &IndexMap<ViewKey, LoadResult<T>>,
    snapshot: &WindowSnapshot,
    from_end: bool,
) -> Option<ViewKey> {
    let visible = |key: &ViewKey| {
        load_results
            .get(key)
            .is_some_and(|result| snapshot.is_render_box_visible(&result.render_box))
    };
    if from_end {
        pool.rendered().rev().find(visible)
    } else {
        pool.rendered().find(visible)
    }
}
