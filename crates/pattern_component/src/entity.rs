//! Entity types, entity handles and handle allocation.
//!
//! An entity type is a named bundle of components: a struct with one field per
//! component, whose composition is declared with [`crate::entity_type!`]. An
//! [`Entity`] is the handle the store hands out for one registered instance;
//! it is how "this particular ball" is told apart from another ball with the
//! same field values.

use std::any::{Any, TypeId};
use std::fmt;

use crate::component::{Component, ComponentMeta, ComponentTypeId};

/// Identifies a concrete entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKind {
    type_id: TypeId,
    name: &'static str,
}

impl EntityKind {
    /// The kind of entity type `T`.
    #[must_use]
    pub fn of<T: EntityType>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: T::type_name(),
        }
    }

    /// The Rust [`TypeId`] of the entity type.
    #[must_use]
    pub fn type_id(self) -> TypeId {
        self.type_id
    }

    /// The declared name of the entity type (e.g. `"Ball"`).
    #[must_use]
    pub fn name(self) -> &'static str {
        self.name
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Handle to one registered entity instance.
///
/// Handles compare by identity: every instance added to a store gets a fresh
/// id, so two instances with identical field values never share a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    id: u64,
    kind: EntityKind,
}

impl Entity {
    /// Create a handle from raw parts (mainly for testing).
    #[must_use]
    pub const fn from_raw(id: u64, kind: EntityKind) -> Self {
        Self { id, kind }
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.id
    }

    /// Returns the concrete type of the instance behind this handle.
    #[must_use]
    pub const fn kind(self) -> EntityKind {
        self.kind
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind.name, self.id)
    }
}

/// Allocates monotonically increasing entity ids.
///
/// Ids are never recycled, so a stale handle can never alias a newer instance.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates a new allocator. Ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocates a fresh handle for an instance of `kind`.
    pub fn allocate(&mut self, kind: EntityKind) -> Entity {
        let id = self.next_id;
        self.next_id += 1;
        Entity { id, kind }
    }

    /// Returns the number of handles allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Object-safe view of an entity instance.
///
/// Lets code that only knows component types (subset queries, systems
/// iterating mixed entity types) reach the component fields of any entity.
/// Implemented by [`crate::entity_type!`].
pub trait Composed: Any {
    /// The concrete type of this instance.
    fn kind(&self) -> EntityKind;

    /// The embedded component with the given id, if this entity declares it.
    fn component_any(&self, id: ComponentTypeId) -> Option<&dyn Any>;

    /// Mutable access to the embedded component with the given id.
    fn component_any_mut(&mut self, id: ComponentTypeId) -> Option<&mut dyn Any>;

    /// The instance as [`Any`], for downcasting to its entity type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable counterpart of [`Composed::as_any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Composed {
    /// Typed access to an embedded component.
    #[must_use]
    pub fn component<C: Component>(&self) -> Option<&C> {
        self.component_any(C::component_type_id())?.downcast_ref()
    }

    /// Typed mutable access to an embedded component.
    pub fn component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.component_any_mut(C::component_type_id())?.downcast_mut()
    }

    /// Returns `true` if this instance is of entity type `T`.
    #[must_use]
    pub fn is<T: EntityType>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// The instance as entity type `T`, or `None` if it is another type.
    #[must_use]
    pub fn downcast_ref<T: EntityType>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Mutable counterpart of `downcast_ref`.
    pub fn downcast_mut<T: EntityType>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

/// A concrete entity type: a named bundle of one or more component types.
pub trait EntityType: Composed + Sized {
    /// The declared name of the entity type.
    fn type_name() -> &'static str;

    /// The component types this entity is composed from, in field order.
    fn components() -> Vec<ComponentMeta>;

    /// The declared component set: [`EntityType::components`] ordered by
    /// component name and deduplicated.
    ///
    /// The order is independent of field order so that every run of the
    /// process, and every reordering of the struct fields, produces the same
    /// list. Components that share a short name but live in different
    /// modules are distinct and ordered by id.
    #[must_use]
    fn declared_components() -> Vec<ComponentMeta> {
        let mut components = Self::components();
        components.sort_by(|a, b| a.name.cmp(b.name).then(a.type_id.cmp(&b.type_id)));
        components.dedup_by_key(|meta| meta.type_id);
        components
    }
}
