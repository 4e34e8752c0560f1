use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{LabelItem, RenderBox, TimelineItem, WindowSnapshot};
use crate::renderer::config::RenderAxisConfig;
use crate::renderer::pool::{ViewKey, ViewPool};
use crate::renderer::series::{LoadResult, boundary_key};
use crate::view::TimelineView;

/// Which views a finished traversal repositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum UpdateStrategy {
    /// Only newly loaded items are positioned.
    #[default]
    AppendOnly,
    /// Every rendered item is positioned again whenever new items arrive.
    RebuildAllVisible,
}

/// Renderer state handed to a [`BoundaryRefresh`] once a pass settles.
pub struct BoundaryContext<'a, T, V> {
    pub(crate) snapshot: &'a Rc<WindowSnapshot>,
    pub(crate) axis: &'a RenderAxisConfig,
    pub(crate) pool: &'a mut ViewPool<T, V>,
    pub(crate) load_results: &'a IndexMap<ViewKey, LoadResult<T>>,
}

impl<T: TimelineItem, V: TimelineView<T>> BoundaryContext<'_, T, V> {
    #[must_use]
    pub fn snapshot(&self) -> &Rc<WindowSnapshot> {
        self.snapshot
    }

    #[must_use]
    pub fn axis(&self) -> &RenderAxisConfig {
        self.axis
    }

    #[must_use]
    pub fn first_visible(&self) -> Option<ViewKey> {
        boundary_key(self.pool, self.load_results, self.snapshot, false)
    }

    #[must_use]
    pub fn last_visible(&self) -> Option<ViewKey> {
        boundary_key(self.pool, self.load_results, self.snapshot, true)
    }

    #[must_use]
    pub fn next_rendered(&self, key: ViewKey) -> Option<ViewKey> {
        self.pool.next_rendered(key)
    }

    #[must_use]
    pub fn item(&self, key: ViewKey) -> Option<&T> {
        self.load_results.get(&key).map(|result| &result.item)
    }

    #[must_use]
    pub fn render_box(&self, key: ViewKey) -> Option<RenderBox> {
        self.load_results.get(&key).map(|result| result.render_box)
    }

    /// Rebinds the view's item with `render_box` as its geometry.
    pub fn update_view(&mut self, key: ViewKey, render_box: RenderBox) -> bool {
        let (Some(result), Some(view)) = (self.load_results.get(&key), self.pool.get_mut(key))
        else {
            return false;
        };
        let view_box = self.axis.view_box(render_box.start_offset, render_box.size);
        view.update(&result.item, render_box, &view_box);
        true
    }

    /// Moves the view without rebinding its data.
    pub fn set_view_position(&mut self, key: ViewKey, offset: f64, size: f64) -> bool {
        let view_box = self.axis.view_box(offset, size);
        let Some(view) = self.pool.get_mut(key) else {
            return false;
        };
        view.set_position(&view_box, true);
        true
    }
}

/// Adjusts boundary views after every settled pass.
pub trait BoundaryRefresh<T, V> {
    fn refresh(&mut self, context: &mut BoundaryContext<'_, T, V>);

    /// Forgets remembered views; called when the datasource resets.
    fn reset(&mut self) {}
}

/// Leaves every view at its full render box.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBoundaryRefresh;

impl<T, V> BoundaryRefresh<T, V> for NoBoundaryRefresh {
    fn refresh(&mut self, _context: &mut BoundaryContext<'_, T, V>) {}
}

/// Shrinks the first and last visible views to their visible part.
#[derive(Debug, Clone, Default)]
pub struct ClipBoundaryRefresh {
    clipped: SmallVec<[ViewKey; 2]>,
}

impl ClipBoundaryRefresh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: TimelineItem, V: TimelineView<T>> BoundaryRefresh<T, V> for ClipBoundaryRefresh {
    fn refresh(&mut self, context: &mut BoundaryContext<'_, T, V>) {
        let mut boundary: SmallVec<[ViewKey; 2]> = SmallVec::new();
        boundary.extend(context.first_visible());
        if let Some(last) = context.last_visible() {
            if !boundary.contains(&last) {
                boundary.push(last);
            }
        }

        for key in std::mem::take(&mut self.clipped) {
            if !boundary.contains(&key) {
                if let Some(full) = context.render_box(key) {
                    context.update_view(key, full);
                }
            }
        }

        let source = Rc::clone(context.snapshot.origin().unwrap_or(context.snapshot));
        for &key in &boundary {
            let Some((start, end)) = context
                .item(key)
                .map(|item| (item.start_time(), item.end_time()))
            else {
                continue;
            };
            context.update_view(key, source.visible_render_box(start, end));
        }
        self.clipped = boundary;
    }

    fn reset(&mut self) {
        self.clipped.clear();
    }
}

/// Measures label text in pixels.
pub trait TextMeasurer {
    fn measure(&self, text: &str) -> f64;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str) -> f64,
{
    fn measure(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Monospace estimate: every character has the same advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWidthMeasurer {
    pub char_width: f64,
}

impl TextMeasurer for FixedWidthMeasurer {
    fn measure(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }
}

#[derive(Debug, Clone)]
struct StickyAnchor {
    key: ViewKey,
    item_id: String,
    render_box: RenderBox,
    width: f64,
}

/// Keeps the first visible label pinned to the window start.
///
/// The pinned label is sized to its text plus padding and slides left once the
/// next label reaches it. A label that stops being first returns to its own box.
pub struct StickyLabelRefresh<M> {
    measurer: M,
    padding: f64,
    anchor: Option<StickyAnchor>,
}

impl<M: TextMeasurer> StickyLabelRefresh<M> {
    pub const DEFAULT_PADDING: f64 = 16.0;

    #[must_use]
    pub fn new(measurer: M) -> Self {
        Self {
            measurer,
            padding: Self::DEFAULT_PADDING,
            anchor: None,
        }
    }

    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    fn is_anchor<V: TimelineView<LabelItem>>(
        &self,
        context: &BoundaryContext<'_, LabelItem, V>,
        key: ViewKey,
    ) -> bool {
        self.anchor.as_ref().is_some_and(|anchor| {
            anchor.key == key
                && context
                    .item(key)
                    .is_some_and(|item| item.id == anchor.item_id)
        })
    }
}

impl<M, V> BoundaryRefresh<LabelItem, V> for StickyLabelRefresh<M>
where
    M: TextMeasurer,
    V: TimelineView<LabelItem>,
{
    fn refresh(&mut self, context: &mut BoundaryContext<'_, LabelItem, V>) {
        let Some(first) = context.first_visible() else {
            return;
        };

        if !self.is_anchor(context, first) {
            if let Some(previous) = self.anchor.take() {
                let still_bound = context
                    .item(previous.key)
                    .is_some_and(|item| item.id == previous.item_id);
                if still_bound {
                    context.set_view_position(
                        previous.key,
                        previous.render_box.start_offset,
                        previous.render_box.size,
                    );
                }
            }
            let Some(item) = context.item(first) else {
                return;
            };
            self.anchor = Some(StickyAnchor {
                key: first,
                item_id: item.id.clone(),
                render_box: context.render_box(first).unwrap_or(RenderBox::EMPTY),
                width: self.measurer.measure(&item.text).ceil() + self.padding,
            });
        }

        let Some(width) = self.anchor.as_ref().map(|anchor| anchor.width) else {
            return;
        };
        let mut offset = context.snapshot().start_offset();
        if let Some(next) = context
            .next_rendered(first)
            .and_then(|key| context.render_box(key))
        {
            offset -= (offset + width - next.start_offset).max(0.0);
        }
        context.set_view_position(first, offset, width);
    }

    fn reset(&mut self) {
        self.anchor = None;
    }
}
