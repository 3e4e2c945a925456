//! The entity store.
//!
//! [`EntityStore`] keeps one ordered bucket per concrete entity type and
//! answers two kinds of query:
//!
//! - **by type** ([`EntityStore::get_by_class`], [`EntityStore::get_by_classes`]):
//!   every live instance of the requested types, in insertion order.
//! - **by component superset** ([`EntityStore::get_with_component`]): every
//!   live instance whose declared component set contains all requested
//!   components, grouped by entity type in first-registration order.
//!
//! Queries borrow the store immutably. Entities are edited through their
//! [`EntityCell`]s and deletions can be queued with
//! [`EntityStore::delete_buffer_add`] while a query is still being walked;
//! [`EntityStore::delete_buffer_purge`] applies them later.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use pattern_component::{
    ComponentMeta, ComponentTypeId, Composed, Entity, EntityAllocator, EntityKind, EntityType,
};
use tracing::{debug, error, trace, warn};

use crate::bucket::{AnyBucket, Bucket};
use crate::buffer::DeleteBuffer;
use crate::cache::{ComponentSet, SubsetQueryCache};
use crate::cell::EntityCell;
use crate::error::{Result, StoreError};
use crate::query::ComponentQuery;

/// Everything the store knows about one registered entity type.
struct TypeEntry {
    kind: EntityKind,
    declared: Vec<ComponentMeta>,
    component_set: ComponentSet,
    bucket: Box<dyn AnyBucket>,
}

/// Type-indexed container of live entity instances.
pub struct EntityStore {
    /// Registered types in first-registration order.
    entries: Vec<TypeEntry>,
    index: HashMap<TypeId, usize>,
    allocator: EntityAllocator,
    cache: RefCell<SubsetQueryCache>,
    delete_buffer: RefCell<DeleteBuffer>,
}

impl EntityStore {
    /// Creates an empty store with no registered types.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            allocator: EntityAllocator::new(),
            cache: RefCell::new(SubsetQueryCache::new()),
            delete_buffer: RefCell::new(DeleteBuffer::new()),
        }
    }

    /// Makes `T` known to the store, returning the slot of its entry.
    ///
    /// The declared component set is computed here, once per type.
    fn register<T: EntityType>(&mut self) -> usize {
        let type_id = TypeId::of::<T>();
        if let Some(&slot) = self.index.get(&type_id) {
            return slot;
        }

        let declared = T::declared_components();
        let ids: Vec<ComponentTypeId> = declared.iter().map(|meta| meta.type_id).collect();
        let component_set = self.cache.get_mut().materialize(&ids);

        let names: Vec<&str> = declared.iter().map(|meta| meta.name).collect();
        debug!(entity_type = T::type_name(), components = ?names, "registered entity type");

        let slot = self.entries.len();
        self.entries.push(TypeEntry {
            kind: EntityKind::of::<T>(),
            declared,
            component_set,
            bucket: Box::new(Bucket::<T>::new()),
        });
        self.index.insert(type_id, slot);
        slot
    }

    fn slot(&self, kind: EntityKind) -> Result<usize> {
        self.index
            .get(&kind.type_id())
            .copied()
            .ok_or(StoreError::UnknownEntityType(kind.name()))
    }

    fn typed_bucket<T: EntityType>(&self) -> Result<&Bucket<T>> {
        let slot = self.slot(EntityKind::of::<T>())?;
        self.entries[slot]
            .bucket
            .as_any()
            .downcast_ref::<Bucket<T>>()
            .ok_or(StoreError::UnknownEntityType(T::type_name()))
    }

    // -- registration ------------------------------------------------------

    /// Adds an instance and returns its handle.
    ///
    /// Registers `T` on its first appearance. Field values are taken as
    /// given; validation belongs to the instance's constructor.
    pub fn add<T: EntityType>(&mut self, entity: T) -> Entity {
        let slot = self.register::<T>();
        let handle = self.allocator.allocate(EntityKind::of::<T>());
        let Some(bucket) = self.entries[slot]
            .bucket
            .as_any_mut()
            .downcast_mut::<Bucket<T>>()
        else {
            debug_assert!(false, "bucket for {} holds another type", T::type_name());
            error!(entity = %handle, "bucket type mismatch, instance not stored");
            return handle;
        };
        bucket.push(handle, entity);
        trace!(entity = %handle, "added entity");
        handle
    }

    /// Adds every instance in order, returning their handles.
    pub fn add_batch<T: EntityType>(&mut self, entities: impl IntoIterator<Item = T>) -> Vec<Entity> {
        entities.into_iter().map(|entity| self.add(entity)).collect()
    }

    /// Removes the instance behind `entity` from its bucket.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownEntityType`] if the entity's type was never
    /// registered, [`StoreError::EntityNotFound`] if the instance is not in
    /// its bucket.
    pub fn delete(&mut self, entity: Entity) -> Result<()> {
        let slot = self.slot(entity.kind())?;
        if self.entries[slot].bucket.remove(entity) {
            trace!(entity = %entity, "deleted entity");
            Ok(())
        } else {
            Err(StoreError::EntityNotFound(entity))
        }
    }

    /// Deletes each entity in order, stopping at the first failure.
    ///
    /// Removals made before the failure stay applied.
    ///
    /// # Errors
    ///
    /// The first error returned by [`EntityStore::delete`].
    pub fn delete_all(&mut self, entities: impl IntoIterator<Item = Entity>) -> Result<()> {
        for entity in entities {
            self.delete(entity)?;
        }
        Ok(())
    }

    /// Registers `T` using `prototype` without leaving it in the store.
    ///
    /// Afterwards `T` is a known type with an empty bucket, so by-type
    /// queries for it succeed.
    pub fn init<T: EntityType>(&mut self, prototype: T) {
        let entity = self.add(prototype);
        let slot = self.register::<T>();
        let removed = self.entries[slot].bucket.remove(entity);
        debug_assert!(removed, "prototype {entity} vanished before removal");
    }

    /// [`EntityStore::init`] for each prototype.
    pub fn init_batch<T: EntityType>(&mut self, prototypes: impl IntoIterator<Item = T>) {
        for prototype in prototypes {
            self.init(prototype);
        }
    }

    // -- queries -----------------------------------------------------------

    /// The live instances of `T`, in insertion order.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownEntityType`] if `T` was never registered, even
    /// when its bucket would be empty.
    pub fn get_by_class<T: EntityType>(&self) -> Result<std::slice::Iter<'_, EntityCell<T>>> {
        Ok(self.typed_bucket::<T>()?.cells().iter())
    }

    /// The live instances of several types, bucket after bucket in the order
    /// requested.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownEntityType`] for the first requested type that
    /// was never registered. Every type is checked before anything is
    /// yielded.
    pub fn get_by_classes(&self, kinds: &[EntityKind]) -> Result<Entities<'_>> {
        let buckets = kinds
            .iter()
            .map(|&kind| {
                let slot = self.slot(kind)?;
                Ok(&*self.entries[slot].bucket)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Entities::new(buckets))
    }

    /// Every live entity whose declared components include all of `Q`.
    ///
    /// Grouped by entity type in first-registration order, then insertion
    /// order. `()` matches every entity.
    ///
    /// ```ignore
    /// for cell in store.get_with_component::<(Motion, Visible)>() {
    ///     let mut entity = cell.borrow_mut();
    ///     // ...
    /// }
    /// ```
    pub fn get_with_component<Q: ComponentQuery>(&self) -> Entities<'_> {
        self.get_with_component_ids(&Q::component_type_ids())
    }

    /// [`EntityStore::get_with_component`] for a runtime list of component ids.
    pub fn get_with_component_ids(&self, components: &[ComponentTypeId]) -> Entities<'_> {
        let requested = self.cache.borrow_mut().materialize(components);
        let buckets = self
            .entries
            .iter()
            .filter(|entry| requested.is_subset(&entry.component_set))
            .map(|entry| &*entry.bucket)
            .collect();
        Entities::new(buckets)
    }

    /// Materializes the requested set of `Q` ahead of the first query.
    pub fn warm_up<Q: ComponentQuery>(&self) -> ComponentSet {
        self.cache.borrow_mut().materialize(&Q::component_type_ids())
    }

    // -- deferred deletion -------------------------------------------------

    /// Queues `entity` for removal at the next purge.
    ///
    /// Takes `&self`, so it can be called while iterating a query result.
    /// The entity stays in its bucket until then.
    pub fn delete_buffer_add(&self, entity: Entity) {
        self.delete_buffer.borrow_mut().push(entity);
    }

    /// Queues several entities for removal, in order.
    pub fn delete_buffer_add_all(&self, entities: impl IntoIterator<Item = Entity>) {
        self.delete_buffer.borrow_mut().extend(entities);
    }

    /// Number of queued removals, repeats included.
    #[must_use]
    pub fn delete_buffer_len(&self) -> usize {
        self.delete_buffer.borrow().len()
    }

    /// Removes every queued entity and empties the queue.
    ///
    /// An entity queued more than once is removed once. A failed removal does
    /// not stop the purge: every other queued entity is still removed and the
    /// queue ends up empty. Returns the number of entities removed.
    ///
    /// # Errors
    ///
    /// The first [`EntityStore::delete`] error, e.g. for an entity that was
    /// deleted directly after being queued.
    pub fn delete_buffer_purge(&mut self) -> Result<usize> {
        let pending = self.delete_buffer.get_mut().drain_unique();
        if pending.is_empty() {
            return Ok(0);
        }

        let mut removed = 0;
        let mut first_error = None;
        for entity in pending {
            match self.delete(entity) {
                Ok(()) => removed += 1,
                Err(err) => {
                    warn!(entity = %entity, error = %err, "queued entity could not be removed");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        debug!(removed, "purged delete buffer");

        match first_error {
            Some(err) => Err(err),
            None => Ok(removed),
        }
    }

    // -- introspection -----------------------------------------------------

    /// Returns `true` once `T` has been added or initialised.
    #[must_use]
    pub fn is_registered<T: EntityType>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<T>())
    }

    /// Returns `true` if the instance behind `entity` is live in this store.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.slot(entity.kind())
            .is_ok_and(|slot| self.entries[slot].bucket.contains(entity))
    }

    /// Total number of live entities across all types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.bucket.len()).sum()
    }

    /// Returns `true` if no entity of any type is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live instances of `T`.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownEntityType`] if `T` was never registered.
    pub fn count<T: EntityType>(&self) -> Result<usize> {
        Ok(self.typed_bucket::<T>()?.cells().len())
    }

    /// Registered entity types, in first-registration order.
    pub fn entity_kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.entries.iter().map(|entry| entry.kind)
    }

    /// The declared component set of `T` as cached at registration.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownEntityType`] if `T` was never registered.
    pub fn declared_components<T: EntityType>(&self) -> Result<&[ComponentMeta]> {
        let slot = self.slot(EntityKind::of::<T>())?;
        Ok(&self.entries[slot].declared)
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buckets: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (entry.kind.name(), entry.bucket.len()))
            .collect();
        f.debug_struct("EntityStore")
            .field("buckets", &buckets)
            .field("allocated", &self.allocator.count())
            .field("pending_deletes", &self.delete_buffer_len())
            .finish_non_exhaustive()
    }
}

/// Iterator over live entities of several buckets.
///
/// Returned by [`EntityStore::get_by_classes`] and
/// [`EntityStore::get_with_component`].
pub struct Entities<'s> {
    buckets: std::vec::IntoIter<&'s dyn AnyBucket>,
    current: Option<(&'s dyn AnyBucket, usize)>,
}

impl<'s> Entities<'s> {
    fn new(buckets: Vec<&'s dyn AnyBucket>) -> Self {
        Self {
            buckets: buckets.into_iter(),
            current: None,
        }
    }
}

impl<'s> Iterator for Entities<'s> {
    type Item = &'s EntityCell<dyn Composed>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((bucket, index)) = self.current
                && let Some(cell) = bucket.cell(index)
            {
                self.current = Some((bucket, index + 1));
                return Some(cell);
            }
            self.current = Some((self.buckets.next()?, 0));
        }
    }
}

impl fmt::Debug for Entities<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entities")
            .field("buckets_left", &self.buckets.len())
            .finish_non_exhaustive()
    }
}
