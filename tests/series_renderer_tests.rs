use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::task::Poll;

use approx::assert_relative_eq;
use futures::FutureExt;
use futures::future::poll_fn;
use timeline_rs::TimelineError;
use timeline_rs::core::{
    AxisHandler, CalendarTimeZone, DAY_MS, SeriesItem, TimelineItem, Timestamp, ZoomLevel,
};
use timeline_rs::datasource::{ArrayDatasource, DatasourceFuture, TimelineDatasource, ready};
use timeline_rs::events::Subscription;
use timeline_rs::renderer::{
    ClipBoundaryRefresh, RenderAxisConfig, RendererState, SeriesRenderer, UpdateStrategy,
};
use timeline_rs::view::{RecordingView, RecordingViewFactory, TimelineView};

// 2020-01-01T00:00:00Z and 2021-01-01T00:00:00Z.
const START: i64 = 1_577_836_800_000;
const END: i64 = 1_609_459_200_000;

type Renderer = SeriesRenderer<SeriesItem, RecordingView<SeriesItem>>;

fn day(index: i64) -> Timestamp {
    START + index * DAY_MS
}

fn day_items(count: i64) -> Vec<SeriesItem> {
    (0..count)
        .map(|index| SeriesItem::new(format!("day-{index}"), day(index), day(index + 1)))
        .collect()
}

fn day_axis() -> AxisHandler {
    AxisHandler::new(ZoomLevel::Day, START, END, CalendarTimeZone::Utc).expect("valid range")
}

fn as_source<D>(datasource: &Rc<D>) -> Option<Rc<dyn TimelineDatasource<SeriesItem>>>
where
    D: TimelineDatasource<SeriesItem> + 'static,
{
    let source: Rc<dyn TimelineDatasource<SeriesItem>> = datasource.clone();
    Some(source)
}

fn renderer_with<D>(factory: &RecordingViewFactory, datasource: &Rc<D>) -> Renderer
where
    D: TimelineDatasource<SeriesItem> + 'static,
{
    let mut renderer = Renderer::new(factory.clone());
    renderer
        .set_datasource(as_source(datasource))
        .expect("datasource");
    renderer
}

fn rendered_ids(renderer: &Renderer) -> Vec<String> {
    renderer
        .rendered_items()
        .into_iter()
        .map(|item| item.id.clone())
        .collect()
}

fn day_ids(range: std::ops::Range<i64>) -> Vec<String> {
    range.map(|index| format!("day-{index}")).collect()
}

fn view_for<'a>(renderer: &'a Renderer, id: &str) -> &'a RecordingView<SeriesItem> {
    renderer
        .views()
        .find(|(item, _)| item.id == id)
        .map(|(_, view)| view)
        .expect("rendered view")
}

/// Datasource that records lookups and answers after a number of polls.
struct SpyDatasource {
    inner: ArrayDatasource<SeriesItem>,
    delay: usize,
    first_lookups: RefCell<Vec<Timestamp>>,
    requests: Cell<usize>,
    resolved: Rc<Cell<usize>>,
}

impl SpyDatasource {
    fn new(items: Vec<SeriesItem>, delay: usize) -> Self {
        Self {
            inner: ArrayDatasource::new(items),
            delay,
            first_lookups: RefCell::new(Vec::new()),
            requests: Cell::new(0),
            resolved: Rc::new(Cell::new(0)),
        }
    }

    fn delayed(&self, mut answer: DatasourceFuture<SeriesItem>) -> DatasourceFuture<SeriesItem> {
        self.requests.set(self.requests.get() + 1);
        let mut remaining = self.delay;
        let resolved = Rc::clone(&self.resolved);
        poll_fn(move |cx| {
            if remaining > 0 {
                remaining -= 1;
                return Poll::Pending;
            }
            let poll = answer.poll_unpin(cx);
            if poll.is_ready() {
                resolved.set(resolved.get() + 1);
            }
            poll
        })
        .boxed_local()
    }
}

impl TimelineDatasource<SeriesItem> for SpyDatasource {
    fn first_item_for_date(&self, timestamp: Timestamp) -> DatasourceFuture<SeriesItem> {
        self.first_lookups.borrow_mut().push(timestamp);
        self.delayed(self.inner.first_item_for_date(timestamp))
    }

    fn item_before(&self, item: &SeriesItem) -> DatasourceFuture<SeriesItem> {
        self.delayed(self.inner.item_before(item))
    }

    fn item_after(&self, item: &SeriesItem) -> DatasourceFuture<SeriesItem> {
        self.delayed(self.inner.item_after(item))
    }

    fn on_invalidate(&self) -> Subscription<()> {
        self.inner.on_invalidate()
    }
}

/// Answers every lookup with an item from 1970.
struct StaleDatasource;

impl TimelineDatasource<SeriesItem> for StaleDatasource {
    fn first_item_for_date(&self, _timestamp: Timestamp) -> DatasourceFuture<SeriesItem> {
        ready(Some(SeriesItem::new("epoch", 0, 1)))
    }

    fn item_before(&self, _item: &SeriesItem) -> DatasourceFuture<SeriesItem> {
        ready(None)
    }

    fn item_after(&self, _item: &SeriesItem) -> DatasourceFuture<SeriesItem> {
        ready(None)
    }

    fn on_invalidate(&self) -> Subscription<()> {
        Subscription::detached()
    }
}

/// Returns the sibling itself as its successor.
struct LoopingDatasource;

impl TimelineDatasource<SeriesItem> for LoopingDatasource {
    fn first_item_for_date(&self, _timestamp: Timestamp) -> DatasourceFuture<SeriesItem> {
        ready(Some(SeriesItem::new("loop", START, day(1))))
    }

    fn item_before(&self, item: &SeriesItem) -> DatasourceFuture<SeriesItem> {
        ready(Some(item.clone()))
    }

    fn item_after(&self, item: &SeriesItem) -> DatasourceFuture<SeriesItem> {
        ready(Some(item.clone()))
    }

    fn on_invalidate(&self) -> Subscription<()> {
        Subscription::detached()
    }
}

/// Hands out its items in a ring, so walking past the last one wraps around.
struct CyclingDatasource {
    items: Vec<SeriesItem>,
}

impl CyclingDatasource {
    fn step(&self, item: &SeriesItem, forward: bool) -> Option<SeriesItem> {
        let len = self.items.len();
        let index = self.items.iter().position(|candidate| candidate.id == item.id)?;
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        self.items.get(next).cloned()
    }
}

impl TimelineDatasource<SeriesItem> for CyclingDatasource {
    fn first_item_for_date(&self, _timestamp: Timestamp) -> DatasourceFuture<SeriesItem> {
        ready(self.items.first().cloned())
    }

    fn item_before(&self, item: &SeriesItem) -> DatasourceFuture<SeriesItem> {
        ready(self.step(item, false))
    }

    fn item_after(&self, item: &SeriesItem) -> DatasourceFuture<SeriesItem> {
        ready(self.step(item, true))
    }

    fn on_invalidate(&self) -> Subscription<()> {
        Subscription::detached()
    }
}

#[test]
fn first_pass_renders_exactly_the_visible_items() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);

    axis.setup(120.0, 1200.0, 0.0).expect("setup");
    assert_eq!(renderer.tick().expect("tick"), RendererState::Idle);

    assert_eq!(rendered_ids(&renderer), day_ids(0..10));
    assert_eq!(factory.constructed(), 10);
    let unique: HashSet<_> = rendered_ids(&renderer).into_iter().collect();
    assert_eq!(unique.len(), 10);

    let third = view_for(&renderer, "day-2");
    assert_relative_eq!(third.render_box().start_offset, 240.0);
    assert_relative_eq!(third.render_box().size, 120.0);
    assert!(third.is_inserted());
    assert_eq!(renderer.first_visible_item().map(|item| item.id.as_str()), Some("day-0"));
    assert_eq!(renderer.last_visible_item().map(|item| item.id.as_str()), Some("day-9"));
}

#[test]
fn forward_scroll_appends_without_duplicates() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");

    axis.handle_scroll(60.0, 60.0);
    renderer.tick().expect("tick");

    assert_eq!(rendered_ids(&renderer), day_ids(0..11));
    assert_eq!(factory.constructed(), 11);
    assert_eq!(renderer.recycled_count(), 0);
}

#[test]
fn far_jump_recycles_instead_of_constructing() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 60.0).expect("setup");
    renderer.tick().expect("tick");
    assert_eq!(factory.constructed(), 11);

    axis.handle_scroll(2400.0, 2340.0);
    renderer.tick().expect("tick");

    assert_eq!(rendered_ids(&renderer), day_ids(20..30));
    assert_eq!(factory.constructed(), 11);
    assert_eq!(factory.destroyed(), 0);
    assert_eq!(renderer.recycled_count(), 1);
    assert_eq!(renderer.live_view_count(), 11);
    assert!(renderer.views().all(|(_, view)| !view.is_disabled()));
}

#[test]
fn backward_scroll_prepends_and_keeps_the_trailing_anchor() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 2400.0).expect("setup");
    renderer.tick().expect("tick");
    assert_eq!(rendered_ids(&renderer), day_ids(20..30));

    axis.handle_scroll(2280.0, -120.0);
    renderer.tick().expect("tick");

    // day-29 scrolled out but stays as the anchor for the next forward pass.
    assert_eq!(rendered_ids(&renderer), day_ids(19..30));
    assert_eq!(factory.constructed(), 11);
}

#[test]
fn viewport_resize_rebuilds_every_view() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 2280.0).expect("setup");
    renderer.tick().expect("tick");
    let before = renderer.live_view_count();

    axis.setup(120.0, 600.0, 2280.0).expect("setup");
    renderer.tick().expect("tick");

    assert_eq!(factory.destroyed(), before);
    assert_eq!(rendered_ids(&renderer), day_ids(19..24));
    assert_eq!(factory.constructed(), before + 5);
}

#[test]
fn start_edge_is_recorded_when_nothing_precedes_the_first_item() {
    let factory = RecordingViewFactory::new();
    let spy = Rc::new(SpyDatasource::new(
        vec![SeriesItem::new("only", day(1), day(2))],
        0,
    ));
    let mut renderer = renderer_with(&factory, &spy);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");

    assert_eq!(spy.first_lookups.borrow().as_slice(), &[START]);
    assert_eq!(rendered_ids(&renderer), vec!["only".to_owned()]);
    let end_edge = renderer.datasource_edges().end.expect("end edge");
    assert_eq!(end_edge.at, END);
    assert_eq!(end_edge.limit, day(2));

    axis.handle_scroll(0.0, -1.0);
    renderer.tick().expect("tick");

    let start_edge = renderer.datasource_edges().start.expect("start edge");
    assert_eq!(start_edge.at, axis.global_range().0);
    assert_eq!(start_edge.limit, day(1));

    let requests = spy.requests.get();
    axis.handle_scroll(0.0, -1.0);
    renderer.tick().expect("tick");
    axis.handle_scroll(0.0, 1.0);
    renderer.tick().expect("tick");
    assert_eq!(spy.requests.get(), requests);
    assert_eq!(rendered_ids(&renderer), vec!["only".to_owned()]);
}

#[test]
fn superseded_traversal_is_discarded() {
    let factory = RecordingViewFactory::new();
    let spy = Rc::new(SpyDatasource::new(day_items(366), 2));
    let mut renderer = renderer_with(&factory, &spy);
    let mut axis = day_axis();
    renderer.connect(&axis);

    let first = axis
        .setup(120.0, 1200.0, 0.0)
        .expect("setup")
        .expect("snapshot");
    assert_eq!(renderer.tick().expect("tick"), RendererState::Loading);
    assert!(renderer.has_pending_traversal());

    let second = axis.handle_scroll(2400.0, 2400.0).expect("snapshot");
    assert!(second.delta() > first.delta());
    assert_eq!(renderer.tick().expect("tick"), RendererState::Loading);

    let mut ticks = 0;
    while renderer.has_pending_traversal() && ticks < 200 {
        renderer.tick().expect("tick");
        ticks += 1;
    }

    assert_eq!(renderer.state(), RendererState::Idle);
    assert_eq!(
        spy.first_lookups.borrow().as_slice(),
        &[first.visible_start(), second.visible_start()]
    );
    assert_eq!(rendered_ids(&renderer), day_ids(20..30));
    assert!(
        renderer
            .rendered_items()
            .iter()
            .all(|item| item.start_time() >= second.visible_start())
    );
    assert_eq!(factory.constructed(), 10);
    assert!(spy.resolved.get() < spy.requests.get());
}

#[test]
fn cancel_render_parks_the_renderer_until_the_next_window() {
    let factory = RecordingViewFactory::new();
    let spy = Rc::new(SpyDatasource::new(day_items(366), 3));
    let mut renderer = renderer_with(&factory, &spy);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");

    renderer.cancel_render("test");
    assert_eq!(renderer.state(), RendererState::Cancelled);
    assert!(!renderer.has_pending_traversal());
    assert_eq!(renderer.tick().expect("tick"), RendererState::Cancelled);
    assert_eq!(factory.constructed(), 0);
}

#[test]
fn datasource_invalidation_resets_views_and_edges() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");
    let version = renderer.datasource_edges().version;

    data.set_data(day_items(5));
    renderer.tick().expect("tick");

    assert_eq!(factory.destroyed(), 10);
    assert_eq!(rendered_ids(&renderer), day_ids(0..5));
    let edges = renderer.datasource_edges();
    assert!(edges.version > version);
    assert_eq!(edges.end.map(|edge| edge.limit), Some(day(5)));

    axis.handle_scroll(2400.0, 2400.0);
    renderer.tick().expect("tick");
    assert!(rendered_ids(&renderer).is_empty());

    axis.handle_scroll(0.0, -2400.0);
    renderer.tick().expect("tick");
    assert_eq!(rendered_ids(&renderer), day_ids(0..5));
}

#[test]
fn setting_the_same_datasource_keeps_views() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");

    renderer.set_datasource(as_source(&data)).expect("same datasource");
    assert_eq!(factory.destroyed(), 0);

    renderer.set_datasource(None).expect("detach");
    assert_eq!(factory.destroyed(), 10);
    assert!(!renderer.is_active());
    assert!(rendered_ids(&renderer).is_empty());
}

#[test]
fn ascending_item_before_the_window_is_fatal() {
    let factory = RecordingViewFactory::new();
    let mut renderer = renderer_with(&factory, &Rc::new(StaleDatasource));
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");

    let result = renderer.tick();
    assert!(matches!(result, Err(TimelineError::InvariantViolation(_))));
    assert!(!renderer.has_pending_traversal());
}

#[test]
fn sibling_returned_as_its_own_neighbour_is_fatal() {
    let factory = RecordingViewFactory::new();
    let mut renderer = renderer_with(&factory, &Rc::new(LoopingDatasource));
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");

    assert!(matches!(renderer.tick(), Err(TimelineError::InvariantViolation(_))));
}

#[test]
fn neighbour_going_back_in_time_is_fatal() {
    let factory = RecordingViewFactory::new();
    let cycle = Rc::new(CyclingDatasource {
        items: vec![
            SeriesItem::new("a", day(0), day(1)),
            SeriesItem::new("b", day(1), day(2)),
        ],
    });
    let mut renderer = renderer_with(&factory, &cycle);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");

    assert!(matches!(renderer.tick(), Err(TimelineError::InvariantViolation(_))));
    assert!(!renderer.has_pending_traversal());
    assert!(rendered_ids(&renderer).is_empty());
}

#[test]
fn item_returned_twice_in_one_walk_is_fatal() {
    let factory = RecordingViewFactory::new();
    let cycle = Rc::new(CyclingDatasource {
        items: vec![
            SeriesItem::new("a", day(0), day(1)),
            SeriesItem::new("b", day(0), day(2)),
        ],
    });
    let mut renderer = renderer_with(&factory, &cycle);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");

    assert!(matches!(renderer.tick(), Err(TimelineError::InvariantViolation(_))));
    assert!(!renderer.has_pending_traversal());
}

#[test]
fn item_crossing_the_global_start_is_an_edge_and_is_walked_past() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(vec![
        SeriesItem::new("straddle", START - DAY_MS, day(1)),
        SeriesItem::new("inside", day(1), day(2)),
    ]));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");

    assert_eq!(rendered_ids(&renderer), vec!["inside".to_owned()]);
    let start_edge = renderer.datasource_edges().start.expect("start edge");
    assert_eq!(start_edge.at, START);
    assert_eq!(start_edge.limit, START);
    let end_edge = renderer.datasource_edges().end.expect("end edge");
    assert_eq!(end_edge.limit, day(2));
}

#[test]
fn item_crossing_the_global_end_stops_the_walk() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(vec![
        SeriesItem::new("last-inside", day(364), day(365)),
        SeriesItem::new("spill", day(365), END + DAY_MS),
    ]));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);
    let max_scroll = 366.0 * 120.0 - 1200.0;
    axis.setup(120.0, 1200.0, max_scroll).expect("setup");
    renderer.tick().expect("tick");

    assert_eq!(rendered_ids(&renderer), vec!["last-inside".to_owned()]);
    let end_edge = renderer.datasource_edges().end.expect("end edge");
    assert_eq!(end_edge.at, END);
    assert_eq!(end_edge.limit, day(365));
}

#[test]
fn item_size_change_rebinds_views_with_fresh_geometry() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");
    assert_relative_eq!(view_for(&renderer, "day-1").render_box().start_offset, 120.0);

    axis.setup(60.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");

    assert_eq!(rendered_ids(&renderer), day_ids(0..20));
    assert_relative_eq!(view_for(&renderer, "day-1").render_box().start_offset, 60.0);
    assert_relative_eq!(view_for(&renderer, "day-19").render_box().start_offset, 1140.0);
    assert_eq!(factory.destroyed(), 0);
    assert_eq!(factory.constructed(), 20);
}

#[test]
fn zero_viewport_defers_rendering() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);

    assert!(axis.setup(120.0, 0.0, 0.0).expect("setup").is_none());
    assert_eq!(renderer.tick().expect("tick"), RendererState::Idle);
    assert_eq!(factory.constructed(), 0);

    axis.setup(120.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");
    assert_eq!(factory.constructed(), 10);
}

#[test]
fn disabling_destroys_views_and_enabling_restores_them() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");

    renderer.set_enabled(false).expect("disable");
    assert_eq!(factory.destroyed(), 10);
    axis.handle_scroll(240.0, 240.0);
    renderer.tick().expect("tick");
    assert!(rendered_ids(&renderer).is_empty());

    renderer.set_enabled(true).expect("enable");
    assert_eq!(rendered_ids(&renderer), day_ids(2..12));
}

#[test]
fn update_strategy_decides_which_views_are_rebound() {
    for (strategy, expected_updates) in [
        (UpdateStrategy::AppendOnly, 1),
        (UpdateStrategy::RebuildAllVisible, 2),
    ] {
        let factory = RecordingViewFactory::new();
        let data = Rc::new(ArrayDatasource::new(day_items(366)));
        let mut renderer = renderer_with(&factory, &data).with_update_strategy(strategy);
        let mut axis = day_axis();
        renderer.connect(&axis);
        axis.setup(120.0, 1200.0, 0.0).expect("setup");
        renderer.tick().expect("tick");

        axis.handle_scroll(60.0, 60.0);
        renderer.tick().expect("tick");

        assert_eq!(renderer.update_strategy(), strategy);
        assert_eq!(view_for(&renderer, "day-0").updates(), expected_updates);
        assert_eq!(view_for(&renderer, "day-10").updates(), 1);
    }
}

#[test]
fn clip_refresh_trims_boundary_views_and_restores_them() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data).with_boundary_refresh(ClipBoundaryRefresh::new());
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 60.0).expect("setup");
    renderer.tick().expect("tick");

    let first = view_for(&renderer, "day-0").render_box();
    assert_relative_eq!(first.start_offset, 60.0);
    assert_relative_eq!(first.size, 60.0);
    let last = view_for(&renderer, "day-10").render_box();
    assert_relative_eq!(last.start_offset, 1200.0);
    assert_relative_eq!(last.size, 60.0);
    assert_relative_eq!(view_for(&renderer, "day-5").render_box().size, 120.0);

    axis.handle_scroll(120.0, 60.0);
    renderer.tick().expect("tick");

    let restored = view_for(&renderer, "day-0").render_box();
    assert_relative_eq!(restored.start_offset, 0.0);
    assert_relative_eq!(restored.size, 120.0);
    assert_relative_eq!(view_for(&renderer, "day-10").render_box().size, 120.0);
}

#[test]
fn insets_shrink_the_window_the_renderer_sees() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data)
        .with_axis_config(RenderAxisConfig::default().with_insets(240.0, 0.0))
        .expect("valid axis config");
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");

    assert_eq!(rendered_ids(&renderer), day_ids(2..10));
    let snapshot = renderer.last_snapshot().expect("window");
    assert_relative_eq!(snapshot.start_offset(), 240.0);
    assert!(snapshot.origin().is_some());
}

#[test]
fn zoom_change_recycles_every_view() {
    let factory = RecordingViewFactory::new();
    let data = Rc::new(ArrayDatasource::new(day_items(366)));
    let mut renderer = renderer_with(&factory, &data);
    let mut axis = day_axis();
    renderer.connect(&axis);
    axis.setup(120.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");

    let mut weekly = axis.rezoom(ZoomLevel::Week).expect("rezoom");
    weekly.setup(120.0, 1200.0, 0.0).expect("setup");
    renderer.tick().expect("tick");

    assert_eq!(factory.destroyed(), 0);
    assert!(renderer.live_view_count() >= rendered_ids(&renderer).len());
    assert_eq!(renderer.datasource_edges().end, None);
    assert!(!rendered_ids(&renderer).is_empty());
}
