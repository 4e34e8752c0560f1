//! Single-threaded publish/subscribe plumbing.
//!
//! Publishers push into per-subscriber queues; consumers drain them on their
//! own frame tick. Dropping a [`Subscription`] unsubscribes it.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

#[derive(Debug)]
struct BusState<E> {
    next_id: u64,
    replay_latest: bool,
    latest: Option<E>,
    queues: IndexMap<u64, VecDeque<E>>,
}

/// Broadcast channel with explicit subscriptions.
#[derive(Debug)]
pub struct EventBus<E> {
    state: Rc<RefCell<BusState<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> EventBus<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_replay(false)
    }

    /// A bus whose new subscribers immediately receive the last published event.
    #[must_use]
    pub fn replaying() -> Self {
        Self::with_replay(true)
    }

    fn with_replay(replay_latest: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(BusState {
                next_id: 0,
                replay_latest,
                latest: None,
                queues: IndexMap::new(),
            })),
        }
    }

    pub fn publish(&self, event: E) {
        let mut state = self.state.borrow_mut();
        for queue in state.queues.values_mut() {
            queue.push_back(event.clone());
        }
        if state.replay_latest {
            state.latest = Some(event);
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> Subscription<E> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let mut queue = VecDeque::new();
        if let Some(latest) = state.latest.clone() {
            queue.push_back(latest);
        }
        state.queues.insert(id, queue);
        Subscription {
            id,
            bus: Rc::downgrade(&self.state),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().queues.len()
    }

    #[must_use]
    pub fn latest(&self) -> Option<E> {
        self.state.borrow().latest.clone()
    }
}

/// Receiving end of an [`EventBus`].
#[derive(Debug)]
pub struct Subscription<E> {
    id: u64,
    bus: Weak<RefCell<BusState<E>>>,
}

impl<E> Subscription<E> {
    /// A subscription that never receives anything.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            id: 0,
            bus: Weak::new(),
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.bus.strong_count() > 0
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        let Some(bus) = self.bus.upgrade() else {
            return false;
        };
        let state = bus.borrow();
        state
            .queues
            .get(&self.id)
            .is_some_and(|queue| !queue.is_empty())
    }

    /// Takes every queued event in publish order.
    pub fn drain(&self) -> Vec<E> {
        let Some(bus) = self.bus.upgrade() else {
            return Vec::new();
        };
        let mut state = bus.borrow_mut();
        state
            .queues
            .get_mut(&self.id)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    /// Takes every queued event and keeps only the newest one.
    pub fn take_latest(&self) -> Option<E> {
        self.drain().pop()
    }

    pub fn unsubscribe(self) {}
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.borrow_mut().queues.shift_remove(&self.id);
        }
    }
}

/// Cooperative cancellation flag shared between a renderer and its traversal.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancelled: Rc<Cell<bool>>,
}

impl CancelSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}
