//! Sequential providers of time-ordered items.
//!
//! A datasource answers three questions about a sorted item sequence: the
//! first item still running at a timestamp, and the strict predecessor or
//! successor of a known item. Answers are futures so hosts can back them with
//! slow lookups; in-memory sources return ready futures.

mod array;
mod grid;
mod weekend;

pub use array::ArrayDatasource;
pub use grid::ZoomGridDatasource;
pub use weekend::WeekendDatasource;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::core::{TimelineItem, Timestamp};
use crate::events::Subscription;

/// Pending datasource answer. `None` means the sequence has no item there.
pub type DatasourceFuture<T> = LocalBoxFuture<'static, Option<T>>;

pub trait TimelineDatasource<T: TimelineItem> {
    /// First item whose `end_time >= timestamp`.
    fn first_item_for_date(&self, timestamp: Timestamp) -> DatasourceFuture<T>;

    fn item_before(&self, item: &T) -> DatasourceFuture<T>;

    fn item_after(&self, item: &T) -> DatasourceFuture<T>;

    /// Fires whenever previously returned answers may no longer hold.
    fn on_invalidate(&self) -> Subscription<()>;
}

/// Wraps an already known answer.
#[must_use]
pub fn ready<T: 'static>(item: Option<T>) -> DatasourceFuture<T> {
    futures::future::ready(item).boxed_local()
}
