use std::collections::VecDeque;
use std::marker::PhantomData;

use crate::view::{TimelineView, ViewFactory};

/// Generational handle into a [`ViewPool`].
///
/// A key stays valid while its view lives; destroying the view bumps the slot
/// generation, so stale keys resolve to nothing instead of another view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewKey {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot<V> {
    generation: u32,
    view: Option<V>,
    last_item: Option<String>,
}

/// Arena of views split into an ordered rendered list and a LIFO recycle list.
#[derive(Debug)]
pub struct ViewPool<T, V> {
    slots: Vec<Slot<V>>,
    free: Vec<u32>,
    rendered: VecDeque<ViewKey>,
    recycled: Vec<ViewKey>,
    _item: PhantomData<fn() -> T>,
}

impl<T, V: TimelineView<T>> Default for ViewPool<T, V> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            rendered: VecDeque::new(),
            recycled: Vec::new(),
            _item: PhantomData,
        }
    }
}

impl<T, V: TimelineView<T>> ViewPool<T, V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: ViewKey) -> Option<&V> {
        self.slot(key).and_then(|slot| slot.view.as_ref())
    }

    pub fn get_mut(&mut self, key: ViewKey) -> Option<&mut V> {
        self.slots
            .get_mut(key.index as usize)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.view.as_mut())
    }

    /// Id of the item the view was last acquired for.
    #[must_use]
    pub fn last_item_id(&self, key: ViewKey) -> Option<&str> {
        self.slot(key).and_then(|slot| slot.last_item.as_deref())
    }

    /// Rendered views in time order.
    pub fn rendered(&self) -> impl DoubleEndedIterator<Item = ViewKey> + '_ {
        self.rendered.iter().copied()
    }

    #[must_use]
    pub fn first_rendered(&self) -> Option<ViewKey> {
        self.rendered.front().copied()
    }

    #[must_use]
    pub fn last_rendered(&self) -> Option<ViewKey> {
        self.rendered.back().copied()
    }

    /// Rendered neighbour following `key`.
    #[must_use]
    pub fn next_rendered(&self, key: ViewKey) -> Option<ViewKey> {
        let position = self.rendered.iter().position(|candidate| *candidate == key)?;
        self.rendered.get(position + 1).copied()
    }

    #[must_use]
    pub fn rendered_len(&self) -> usize {
        self.rendered.len()
    }

    #[must_use]
    pub fn recycled_len(&self) -> usize {
        self.recycled.len()
    }

    /// Views constructed and not yet destroyed.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.view.is_some()).count()
    }

    /// Takes a view for `item_id` without placing it in the rendered list.
    ///
    /// A recycled view that last showed the same item wins, then the most
    /// recently recycled one, then a fresh view from `factory`.
    pub fn acquire(&mut self, item_id: &str, factory: &mut dyn ViewFactory<V>) -> ViewKey {
        let same_item = self.recycled.iter().rposition(|key| {
            self.slot(*key)
                .and_then(|slot| slot.last_item.as_deref())
                .is_some_and(|last| last == item_id)
        });
        let reused = match same_item {
            Some(position) => Some(self.recycled.remove(position)),
            None => self.recycled.pop(),
        };

        let key = match reused {
            Some(key) => {
                if let Some(view) = self.get_mut(key) {
                    view.attach();
                    view.set_disabled(false);
                }
                key
            }
            None => self.insert(factory.create_view()),
        };
        if let Some(slot) = self.slots.get_mut(key.index as usize) {
            slot.last_item = Some(item_id.to_owned());
        }
        key
    }

    pub fn push_back(&mut self, key: ViewKey) {
        self.rendered.push_back(key);
    }

    pub fn push_front(&mut self, key: ViewKey) {
        self.rendered.push_front(key);
    }

    /// Moves a rendered view to the recycle list, detached and disabled.
    pub fn recycle(&mut self, key: ViewKey) -> bool {
        let Some(position) = self.rendered.iter().position(|candidate| *candidate == key) else {
            return false;
        };
        self.rendered.remove(position);
        if let Some(view) = self.get_mut(key) {
            view.set_disabled(true);
            view.detach();
        }
        self.recycled.push(key);
        true
    }

    /// Destroys every view, rendered or recycled. Returns how many died.
    pub fn destroy_all(&mut self) -> usize {
        let mut destroyed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(mut view) = slot.view.take() {
                view.destroy();
                slot.generation = slot.generation.wrapping_add(1);
                slot.last_item = None;
                self.free.push(index as u32);
                destroyed += 1;
            }
        }
        self.rendered.clear();
        self.recycled.clear();
        destroyed
    }

    fn slot(&self, key: ViewKey) -> Option<&Slot<V>> {
        self.slots
            .get(key.index as usize)
            .filter(|slot| slot.generation == key.generation)
    }

    fn insert(&mut self, view: V) -> ViewKey {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.view = Some(view);
            return ViewKey {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            view: Some(view),
            last_item: None,
        });
        ViewKey {
            index,
            generation: 0,
        }
    }
}
