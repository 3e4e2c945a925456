//! # pattern_store
//!
//! The entity store of the pattern ECS runtime.
//!
//! This crate provides:
//!
//! - [`EntityStore`]: one ordered bucket of live instances per entity type,
//!   answering "by type" and "by component superset" queries.
//! - [`SubsetQueryCache`]: content-keyed memo of component sets, so per-tick
//!   subset queries do not rebuild sets.
//! - [`DeleteBuffer`]: ordered pending-removal queue that systems can fill
//!   while still iterating a query result.
//! - [`EntityCell`]: the slot each instance lives in; interior mutability lets
//!   systems edit entities through a shared borrow of the store.

#![warn(missing_docs)]

pub mod buffer;
pub mod cache;
pub mod cell;
pub mod error;
pub mod query;
pub mod store;

mod bucket;

pub use buffer::DeleteBuffer;
pub use cache::{ComponentSet, SubsetQueryCache};
pub use cell::EntityCell;
pub use error::{Result, StoreError};
pub use query::ComponentQuery;
pub use store::{Entities, EntityStore};

pub use pattern_component::{
    Component, ComponentMeta, ComponentTypeId, Composed, ConstructionError, Entity, EntityKind,
    EntityType, define_component, entity_type,
};
