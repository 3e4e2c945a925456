//! The slot a registered entity instance lives in.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;

use pattern_component::{Component, Composed, Entity, EntityType};

/// One registered entity instance together with its handle.
///
/// Queries hand out `&EntityCell`s borrowed from the store. The instance sits
/// behind a [`RefCell`] so a system can edit entities, and queue deletions,
/// while the query still holds its shared borrow of the store.
///
/// Typed queries yield `EntityCell<T>`; component queries yield
/// `EntityCell<dyn Composed>`, which adds component-level accessors.
pub struct EntityCell<T: ?Sized> {
    entity: Entity,
    value: RefCell<T>,
}

impl<T> EntityCell<T> {
    pub(crate) fn new(entity: Entity, value: T) -> Self {
        Self {
            entity,
            value: RefCell::new(value),
        }
    }
}

impl<T: ?Sized> EntityCell<T> {
    /// The handle of this instance.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Immutably borrow the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.value.borrow()
    }

    /// Mutably borrow the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.value.borrow_mut()
    }
}

impl EntityCell<dyn Composed> {
    /// Borrow one embedded component.
    ///
    /// Returns `None` if the entity does not declare `C`. To touch several
    /// components of one entity at once, take a single
    /// [`borrow_mut`](Self::borrow_mut) and use the `dyn Composed` accessors
    /// on it instead.
    pub fn component<C: Component>(&self) -> Option<Ref<'_, C>> {
        Ref::filter_map(self.value.borrow(), |entity| entity.component::<C>()).ok()
    }

    /// Mutably borrow one embedded component.
    pub fn component_mut<C: Component>(&self) -> Option<RefMut<'_, C>> {
        RefMut::filter_map(self.value.borrow_mut(), |entity| entity.component_mut::<C>()).ok()
    }

    /// Returns `true` if this instance is of entity type `T`.
    #[must_use]
    pub fn is<T: EntityType>(&self) -> bool {
        self.entity.kind().type_id() == std::any::TypeId::of::<T>()
    }

    /// Borrow the instance as its concrete type.
    pub fn downcast_ref<T: EntityType>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.value.borrow(), |entity| entity.downcast_ref::<T>()).ok()
    }

    /// Mutably borrow the instance as its concrete type.
    pub fn downcast_mut<T: EntityType>(&self) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.value.borrow_mut(), |entity| entity.downcast_mut::<T>()).ok()
    }
}

impl<T: ?Sized> fmt::Debug for EntityCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCell")
            .field("entity", &self.entity)
            .finish_non_exhaustive()
    }
}
