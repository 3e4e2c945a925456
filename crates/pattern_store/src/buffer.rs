//! Deferred deletion queue.

use std::collections::HashSet;

use pattern_component::Entity;

/// Ordered queue of entities waiting to be removed from the store.
///
/// Filling the queue never touches the buckets, so systems can mark entities
/// for removal while still walking a query result. The store drains it at a
/// point where no iteration is live (see
/// [`EntityStore::delete_buffer_purge`](crate::EntityStore::delete_buffer_purge)).
#[derive(Debug, Default)]
pub struct DeleteBuffer {
    pending: Vec<Entity>,
}

impl DeleteBuffer {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one entity. Repeats are kept until drained.
    pub fn push(&mut self, entity: Entity) {
        self.pending.push(entity);
    }

    /// Queues entities in iteration order.
    pub fn extend(&mut self, entities: impl IntoIterator<Item = Entity>) {
        self.pending.extend(entities);
    }

    /// Number of queued entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Empties the queue, returning each queued entity once in first-enqueue
    /// order.
    pub fn drain_unique(&mut self) -> Vec<Entity> {
        let mut seen = HashSet::with_capacity(self.pending.len());
        self.pending
            .drain(..)
            .filter(|entity| seen.insert(*entity))
            .collect()
    }
}
