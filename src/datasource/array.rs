use std::cell::RefCell;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::{TimelineItem, Timestamp};
use crate::datasource::{DatasourceFuture, TimelineDatasource, ready};
use crate::events::{EventBus, Subscription};

/// In-memory datasource over a sorted copy of the given items.
///
/// Items are keyed by id; when ids repeat, the last item with that id wins.
#[derive(Debug)]
pub struct ArrayDatasource<T: TimelineItem> {
    items: RefCell<SortedItems<T>>,
    invalidations: EventBus<()>,
}

/// Start-ordered items plus the running maximum of their end times, which
/// is monotonic and can be searched even when items overlap.
#[derive(Debug)]
struct SortedItems<T> {
    by_id: IndexMap<String, T>,
    reach: Vec<Timestamp>,
}

impl<T> Default for SortedItems<T> {
    fn default() -> Self {
        Self {
            by_id: IndexMap::new(),
            reach: Vec::new(),
        }
    }
}

impl<T: TimelineItem> Default for ArrayDatasource<T> {
    fn default() -> Self {
        Self {
            items: RefCell::new(SortedItems::default()),
            invalidations: EventBus::new(),
        }
    }
}

impl<T: TimelineItem> ArrayDatasource<T> {
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        let datasource = Self::default();
        datasource.items.replace(sorted_by_start(items));
        datasource
    }

    /// Replaces the data and notifies subscribers.
    pub fn set_data(&self, items: impl IntoIterator<Item = T>) {
        let sorted = sorted_by_start(items);
        debug!(len = sorted.by_id.len(), "array datasource data replaced");
        self.items.replace(sorted);
        self.invalidations.publish(());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().by_id.is_empty()
    }

    #[must_use]
    pub fn item(&self, id: &str) -> Option<T> {
        self.items.borrow().by_id.get(id).cloned()
    }

    fn neighbour(&self, item: &T, forward: bool) -> Option<T> {
        let items = self.items.borrow();
        let index = items.by_id.get_index_of(item.id())?;
        let target = if forward {
            index.checked_add(1)?
        } else {
            index.checked_sub(1)?
        };
        items.by_id.get_index(target).map(|(_, value)| value.clone())
    }
}

impl<T: TimelineItem> TimelineDatasource<T> for ArrayDatasource<T> {
    fn first_item_for_date(&self, timestamp: Timestamp) -> DatasourceFuture<T> {
        let items = self.items.borrow();
        let index = items.reach.partition_point(|&end| end < timestamp);
        let found = items.by_id.get_index(index).map(|(_, item)| item.clone());
        trace!(timestamp, found = found.is_some(), "array first item lookup");
        ready(found)
    }

    fn item_before(&self, item: &T) -> DatasourceFuture<T> {
        ready(self.neighbour(item, false))
    }

    fn item_after(&self, item: &T) -> DatasourceFuture<T> {
        ready(self.neighbour(item, true))
    }

    fn on_invalidate(&self) -> Subscription<()> {
        self.invalidations.subscribe()
    }
}

fn sorted_by_start<T: TimelineItem>(items: impl IntoIterator<Item = T>) -> SortedItems<T> {
    let mut items: Vec<T> = items.into_iter().collect();
    items.sort_by_key(|item| item.start_time());
    let mut by_id = IndexMap::with_capacity(items.len());
    for item in items {
        by_id.shift_remove(item.id());
        by_id.insert(item.id().to_owned(), item);
    }
    let reach = by_id
        .values()
        .scan(Timestamp::MIN, |reach, item: &T| {
            *reach = (*reach).max(item.end_time());
            Some(*reach)
        })
        .collect();
    SortedItems { by_id, reach }
}
