//! Per-type instance storage.

use std::any::Any;

use pattern_component::{Composed, Entity, EntityType};

use crate::cell::EntityCell;

/// Type-erased view of a [`Bucket`], so the store can keep buckets of every
/// entity type side by side.
pub(crate) trait AnyBucket {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn len(&self) -> usize;

    /// Removes the instance behind `entity`, keeping the order of the rest.
    /// Returns `false` if it was not present.
    fn remove(&mut self, entity: Entity) -> bool;

    fn contains(&self, entity: Entity) -> bool;

    fn cell(&self, index: usize) -> Option<&EntityCell<dyn Composed>>;
}

/// The ordered live instances of one entity type.
pub(crate) struct Bucket<T: EntityType> {
    cells: Vec<EntityCell<T>>,
}

impl<T: EntityType> Bucket<T> {
    pub(crate) fn new() -> Self {
        Self { cells: Vec::new() }
    }

    pub(crate) fn push(&mut self, entity: Entity, value: T) {
        self.cells.push(EntityCell::new(entity, value));
    }

    pub(crate) fn cells(&self) -> &[EntityCell<T>] {
        &self.cells
    }

    fn position(&self, entity: Entity) -> Option<usize> {
        self.cells.iter().position(|cell| cell.entity() == entity)
    }
}

impl<T: EntityType> AnyBucket for Bucket<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn remove(&mut self, entity: Entity) -> bool {
        match self.position(entity) {
            Some(index) => {
                self.cells.remove(index);
                true
            }
            None => false,
        }
    }

    fn contains(&self, entity: Entity) -> bool {
        self.position(entity).is_some()
    }

    fn cell(&self, index: usize) -> Option<&EntityCell<dyn Composed>> {
        self.cells
            .get(index)
            .map(|cell| cell as &EntityCell<dyn Composed>)
    }
}
