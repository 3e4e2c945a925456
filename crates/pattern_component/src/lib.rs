//! # pattern_component
//!
//! The "C" in ECS, plus the declarations that bundle components into entity
//! types.
//!
//! This crate provides:
//!
//! - [`Component`] trait: plain data fragments identified by a path-derived
//!   [`ComponentTypeId`].
//! - [`EntityType`] / [`Composed`]: an entity type is a struct that embeds one
//!   field per component, declared explicitly with [`entity_type!`].
//! - [`Entity`]: store-assigned identity handles and their [`EntityAllocator`].
//! - [`ConstructionError`]: field-level invariant failures raised before an
//!   instance ever reaches the store.

#![warn(missing_docs)]

pub mod component;
pub mod entity;
pub mod error;
mod macros;

pub use component::{Component, ComponentMeta, ComponentTypeId};
pub use entity::{Composed, Entity, EntityAllocator, EntityKind, EntityType};
pub use error::{ConstructionError, ensure_in_domain};
