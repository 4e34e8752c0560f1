use std::hint::black_box;
use std::rc::Rc;

use criterion::{Criterion, criterion_group, criterion_main};
use timeline_rs::core::{AxisHandler, CalendarTimeZone, DAY_MS, SeriesItem, ZoomLevel};
use timeline_rs::datasource::{ArrayDatasource, TimelineDatasource};
use timeline_rs::renderer::SeriesRenderer;
use timeline_rs::view::{RecordingView, RecordingViewFactory};

// 2020-01-01T00:00:00Z and 2021-01-01T00:00:00Z.
const START: i64 = 1_577_836_800_000;
const END: i64 = 1_609_459_200_000;

fn bench_zoom_level_math(c: &mut Criterion) {
    let tz = CalendarTimeZone::FixedOffsetMinutes { minutes: 60 };
    let date = tz.datetime(START + 17 * DAY_MS + 12_345).expect("in range");

    c.bench_function("zoom_level_trim_add_count", |b| {
        b.iter(|| {
            for level in ZoomLevel::ALL {
                let start = level.trim_to_start(black_box(&date));
                let end = level.add(&start, 24);
                let _ = level.count(&start, &end);
            }
        })
    });
}

fn bench_axis_scroll(c: &mut Criterion) {
    let mut axis = AxisHandler::new(ZoomLevel::Hour, START, END, CalendarTimeZone::Utc)
        .expect("valid range");
    axis.setup(60.0, 1920.0, 0.0).expect("setup");
    let subscription = axis.subscribe();

    c.bench_function("axis_handle_scroll_1k", |b| {
        b.iter(|| {
            for step in 0..1_000 {
                let offset = f64::from(step) * 37.0;
                let _ = axis.handle_scroll(black_box(offset), 37.0);
            }
            subscription.drain();
        })
    });
}

fn bench_series_scroll_pass(c: &mut Criterion) {
    let items: Vec<SeriesItem> = (0..366)
        .map(|day| {
            SeriesItem::new(
                format!("day-{day}"),
                START + day * DAY_MS,
                START + (day + 1) * DAY_MS,
            )
        })
        .collect();
    let datasource: Rc<dyn TimelineDatasource<SeriesItem>> = Rc::new(ArrayDatasource::new(items));
    let mut renderer: SeriesRenderer<SeriesItem, RecordingView<SeriesItem>> =
        SeriesRenderer::new(RecordingViewFactory::new());
    renderer.set_datasource(Some(datasource)).expect("datasource");

    let mut axis =
        AxisHandler::new(ZoomLevel::Day, START, END, CalendarTimeZone::Utc).expect("valid range");
    renderer.connect(&axis);
    axis.setup(40.0, 1920.0, 0.0).expect("setup");
    renderer.tick().expect("tick");

    c.bench_function("series_renderer_scroll_sweep", |b| {
        b.iter(|| {
            let mut offset = 0.0;
            while offset < 10_000.0 {
                offset += 90.0;
                axis.handle_scroll(offset, 90.0);
                renderer.tick().expect("tick");
            }
            axis.handle_scroll(0.0, -offset);
            renderer.tick().expect("tick");
        })
    });
}

criterion_group!(
    benches,
    bench_zoom_level_math,
    bench_axis_scroll,
    bench_series_scroll_pass
);
criterion_main!(benches);
