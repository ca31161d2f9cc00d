//! Arena holding every car node of a station.
//!
//! Car sequences are singly linked through `CarId` handles rather than
//! pointers. Each train starts with a sentinel node whose weight is never
//! read; the real cars follow it in train order. Because all platforms share
//! one yard, moving a run of cars between trains only rewrites `next` links.

use serde::{Deserialize, Serialize};

/// Handle to a node stored in a [`CarYard`].
///
/// A handle pairs a slot with the generation the slot had when the node was
/// allocated. Releasing the node bumps the generation, so a handle kept past
/// removal resolves to nothing even after the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarId {
    slot: usize,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Node {
    weight: u32,
    next: Option<CarId>,
    sentinel: bool,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Slot arena with a free list; released slots are reused.
#[derive(Debug, Default)]
pub struct CarYard {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
}

impl CarYard {
    /// Create an empty yard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of real (non-sentinel) cars currently allocated.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Allocate a sentinel heading a new, empty train.
    pub(crate) fn sentinel(&mut self) -> CarId {
        self.insert(Node {
            weight: 0,
            next: None,
            sentinel: true,
        })
    }

    /// Allocate an unlinked car.
    pub(crate) fn car(&mut self, weight: u32) -> CarId {
        self.live += 1;
        self.insert(Node {
            weight,
            next: None,
            sentinel: false,
        })
    }

    fn insert(&mut self, node: Node) -> CarId {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        let entry = &mut self.slots[slot];
        entry.node = Some(node);
        CarId {
            slot,
            generation: entry.generation,
        }
    }

    fn get(&self, id: CarId) -> Option<&Node> {
        self.slots
            .get(id.slot)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_ref())
    }

    fn node(&self, id: CarId) -> &Node {
        self.get(id)
            .unwrap_or_else(|| panic!("car {id:?} used after release"))
    }

    fn node_mut(&mut self, id: CarId) -> &mut Node {
        self.slots
            .get_mut(id.slot)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_mut())
            .unwrap_or_else(|| panic!("car {id:?} used after release"))
    }

    /// Whether `id` still names a node of this yard.
    pub fn contains(&self, id: CarId) -> bool {
        self.get(id).is_some()
    }

    /// Weight carried by a car, or `None` once it has been released.
    /// Sentinels report zero.
    pub fn weight(&self, id: CarId) -> Option<u32> {
        self.get(id).map(|node| node.weight)
    }

    /// Link following `id`. `None` at the end of a train and for released
    /// handles.
    pub fn next(&self, id: CarId) -> Option<CarId> {
        self.get(id).and_then(|node| node.next)
    }

    /// Weight of a node known to be linked into a train.
    pub(crate) fn weight_of(&self, id: CarId) -> u32 {
        self.node(id).weight
    }

    /// Successor of a node known to be linked into a train.
    pub(crate) fn link(&self, id: CarId) -> Option<CarId> {
        self.node(id).next
    }

    pub(crate) fn set_next(&mut self, id: CarId, next: Option<CarId>) {
        self.node_mut(id).next = next;
    }

    /// Release a single, already unlinked node.
    pub(crate) fn release(&mut self, id: CarId) {
        let Some(entry) = self
            .slots
            .get_mut(id.slot)
            .filter(|entry| entry.generation == id.generation)
        else {
            return;
        };
        if let Some(node) = entry.node.take() {
            if !node.sentinel {
                self.live -= 1;
            }
            entry.generation = entry.generation.wrapping_add(1);
            self.free.push(id.slot);
        }
    }

    /// Release `head` and everything linked after it. Returns the number of
    /// real cars released.
    pub(crate) fn release_chain(&mut self, head: CarId) -> usize {
        let before = self.live;
        let mut cursor = Some(head);
        while let Some(id) = cursor {
            cursor = self.link(id);
            self.release(id);
        }
        before - self.live
    }

    /// Iterate the real cars following a sentinel. A released sentinel
    /// yields nothing.
    pub fn cars(&self, sentinel: CarId) -> Cars<'_> {
        Cars {
            yard: self,
            cursor: self.next(sentinel),
        }
    }

    /// Node at 1-based `position` after the sentinel; position 0 is the
    /// sentinel itself.
    pub(crate) fn nth(&self, sentinel: CarId, position: usize) -> Option<CarId> {
        let mut cursor = Some(sentinel);
        for _ in 0..position {
            cursor = self.link(cursor?);
        }
        cursor
    }

    /// Last node of the chain starting at `sentinel`.
    pub(crate) fn tail(&self, sentinel: CarId) -> CarId {
        let mut last = sentinel;
        while let Some(next) = self.link(last) {
            last = next;
        }
        last
    }
}

/// Iterator over the real cars of a train.
pub struct Cars<'a> {
    yard: &'a CarYard,
    cursor: Option<CarId>,
}

impl Iterator for Cars<'_> {
    type Item = CarId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        self.cursor = self.yard.link(current);
        Some(current)
    }
}
