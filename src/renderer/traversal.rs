use std::rc::Rc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::task::noop_waker_ref;
use indexmap::IndexSet;
use smallvec::SmallVec;
use tracing::{error, trace};

use crate::core::{RenderBox, TimelineItem, Timestamp, WindowSnapshot};
use crate::datasource::{DatasourceFuture, TimelineDatasource};
use crate::error::{TimelineError, TimelineResult};
use crate::events::CancelSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeSide {
    Start,
    End,
}

/// Where a traversal ran out of data.
///
/// `limit` is the last in-range timestamp known to hold data in that direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EdgeHit {
    pub(crate) side: EdgeSide,
    pub(crate) limit: Timestamp,
}

#[derive(Debug)]
pub(crate) enum TraversalOutcome<T> {
    /// Items intersecting the window, in traversal order.
    Finished {
        items: Vec<T>,
        edges: SmallVec<[EdgeHit; 2]>,
    },
    Stale,
    Cancelled,
}

/// One walk along the datasource, started by a single window snapshot.
///
/// The walk is resumable: [`Traversal::poll`] keeps requesting neighbours while
/// answers are ready and parks on the first pending one.
pub(crate) struct Traversal<T: TimelineItem> {
    datasource: Rc<dyn TimelineDatasource<T>>,
    snapshot: Rc<WindowSnapshot>,
    ascending: bool,
    sibling: Option<T>,
    cancel: CancelSignal,
    edge_version: u64,
    pending: Option<DatasourceFuture<T>>,
    loaded: Vec<T>,
    seen: IndexSet<String>,
    passed_edges: SmallVec<[EdgeHit; 2]>,
    requests: usize,
}

impl<T: TimelineItem> Traversal<T> {
    pub(crate) fn new(
        datasource: Rc<dyn TimelineDatasource<T>>,
        snapshot: Rc<WindowSnapshot>,
        ascending: bool,
        sibling: Option<T>,
        cancel: CancelSignal,
        edge_version: u64,
    ) -> Self {
        let seen = sibling
            .iter()
            .map(|item| item.id().to_owned())
            .collect();
        Self {
            datasource,
            snapshot,
            ascending,
            sibling,
            cancel,
            edge_version,
            pending: None,
            loaded: Vec::new(),
            seen,
            passed_edges: SmallVec::new(),
            requests: 0,
        }
    }

    pub(crate) fn snapshot(&self) -> &Rc<WindowSnapshot> {
        &self.snapshot
    }

    pub(crate) fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub(crate) fn edge_version(&self) -> u64 {
        self.edge_version
    }

    fn request(&self) -> DatasourceFuture<T> {
        match (&self.sibling, self.ascending) {
            (Some(sibling), true) => self.datasource.item_after(sibling),
            (Some(sibling), false) => self.datasource.item_before(sibling),
            (None, _) => self
                .datasource
                .first_item_for_date(self.snapshot.visible_start()),
        }
    }

    /// Advances the walk.
    ///
    /// `latest` is the renderer's newest snapshot; an answer arriving for any
    /// other snapshot ends the walk as stale.
    pub(crate) fn poll(
        &mut self,
        latest: Option<&Rc<WindowSnapshot>>,
    ) -> TimelineResult<Poll<TraversalOutcome<T>>> {
        let mut cx = Context::from_waker(noop_waker_ref());
        loop {
            if self.cancel.is_cancelled() {
                trace!(requests = self.requests, "traversal observed cancellation");
                return Ok(Poll::Ready(TraversalOutcome::Cancelled));
            }

            let mut request = match self.pending.take() {
                Some(request) => request,
                None => {
                    self.requests += 1;
                    self.request()
                }
            };
            let answer = match request.poll_unpin(&mut cx) {
                Poll::Pending => {
                    self.pending = Some(request);
                    return Ok(Poll::Pending);
                }
                Poll::Ready(answer) => answer,
            };

            if !latest.is_some_and(|latest| Rc::ptr_eq(latest, &self.snapshot)) {
                trace!(requests = self.requests, "traversal answer arrived for a superseded window");
                return Ok(Poll::Ready(TraversalOutcome::Stale));
            }

            let Some(item) = answer else {
                let side = if self.ascending {
                    EdgeSide::End
                } else {
                    EdgeSide::Start
                };
                return Ok(Poll::Ready(self.finish(Some(side))));
            };

            self.check_order(&item)?;

            if let Some(side) = self.outside_global_range(&item) {
                if self.is_trailing_side(side) {
                    trace!(item = item.id(), ?side, "item crosses the global range behind the walk");
                    let limit = match side {
                        EdgeSide::Start => self.snapshot.global_start(),
                        EdgeSide::End => self.snapshot.global_end(),
                    };
                    self.passed_edges.push(EdgeHit { side, limit });
                    self.sibling = Some(item);
                    continue;
                }
                return Ok(Poll::Ready(self.finish(Some(side))));
            }

            let render_box = self
                .snapshot
                .render_box(item.start_time(), item.end_time());
            if !self.snapshot.is_render_box_visible(&render_box) {
                if self.is_behind_window(&render_box) {
                    trace!(item = item.id(), "item touches the window edge, walking past it");
                    self.sibling = Some(item);
                    continue;
                }
                return Ok(Poll::Ready(self.finish(None)));
            }
            self.loaded.push(item.clone());
            self.sibling = Some(item);
        }
    }

    /// Items reaching past the global range mark an edge, even when they
    /// also overlap it.
    fn outside_global_range(&self, item: &T) -> Option<EdgeSide> {
        if item.start_time() < self.snapshot.global_start()
            || item.end_time() <= self.snapshot.global_start()
        {
            Some(EdgeSide::Start)
        } else if item.end_time() > self.snapshot.global_end()
            || item.start_time() >= self.snapshot.global_end()
        {
            Some(EdgeSide::End)
        } else {
            None
        }
    }

    fn is_trailing_side(&self, side: EdgeSide) -> bool {
        match side {
            EdgeSide::Start => self.ascending,
            EdgeSide::End => !self.ascending,
        }
    }

    /// Box lies on the side the walk is coming from, so later items may
    /// still reach the window.
    fn is_behind_window(&self, render_box: &RenderBox) -> bool {
        if self.ascending {
            render_box.end_offset <= self.snapshot.start_offset()
        } else {
            render_box.start_offset >= self.snapshot.end_offset()
        }
    }

    fn check_order(&mut self, item: &T) -> TimelineResult<()> {
        let window_start = self.snapshot.visible_start();
        if self.ascending && item.end_time() < window_start {
            error!(
                item = item.id(),
                end_time = item.end_time(),
                window_start,
                "ascending traversal returned an item ending before the window"
            );
            return Err(TimelineError::InvariantViolation(format!(
                "ascending traversal returned item `{}` ending at {} before window start {}",
                item.id(),
                item.end_time(),
                window_start
            )));
        }
        if let Some(sibling) = &self.sibling {
            if sibling.id() == item.id() {
                error!(item = item.id(), "datasource returned the sibling as its own neighbour");
                return Err(TimelineError::InvariantViolation(format!(
                    "datasource returned item `{}` as its own neighbour",
                    item.id()
                )));
            }
            let out_of_order = if self.ascending {
                item.start_time() < sibling.start_time()
            } else {
                item.start_time() > sibling.start_time()
            };
            if out_of_order {
                error!(
                    item = item.id(),
                    start_time = item.start_time(),
                    sibling = sibling.id(),
                    sibling_start = sibling.start_time(),
                    ascending = self.ascending,
                    "datasource neighbour breaks start order"
                );
                return Err(TimelineError::InvariantViolation(format!(
                    "item `{}` starting at {} follows `{}` starting at {} against traversal order",
                    item.id(),
                    item.start_time(),
                    sibling.id(),
                    sibling.start_time()
                )));
            }
        }
        if !self.seen.insert(item.id().to_owned()) {
            error!(item = item.id(), "traversal revisited an item");
            return Err(TimelineError::InvariantViolation(format!(
                "traversal returned item `{}` twice",
                item.id()
            )));
        }
        Ok(())
    }

    fn finish(&mut self, side: Option<EdgeSide>) -> TraversalOutcome<T> {
        let mut edges = std::mem::take(&mut self.passed_edges);
        edges.extend(side.map(|side| {
            let last = self.loaded.last().or(self.sibling.as_ref());
            let limit = match side {
                EdgeSide::End => last.map_or(self.snapshot.visible_start(), T::end_time),
                EdgeSide::Start => last.map_or(self.snapshot.global_start(), T::start_time),
            };
            EdgeHit { side, limit }
        }));
        trace!(
            loaded = self.loaded.len(),
            requests = self.requests,
            edges = ?edges,
            "traversal finished"
        );
        TraversalOutcome::Finished {
            items: std::mem::take(&mut self.loaded),
            edges,
        }
    }
}
