//! Core [`Component`] trait and associated metadata.
//!
//! A component is a plain data fragment: fields only, no behaviour the store
//! cares about. Components are never stored on their own; they are embedded
//! as fields of an entity type (see [`crate::entity_type!`]).
//!
//! ## Stable Type Identity
//!
//! [`ComponentTypeId`] is derived from the component's **full type path**
//! (e.g. `game::physics::Velocity`) using the FNV-1a 64-bit hash algorithm, so
//! the same component gets the same id on every run of the process, and two
//! components that share a short name in different modules stay distinct.
//! Subset queries and the query cache key on these ids rather than on anything
//! address- or run-dependent. The short [`Component::type_name`] is only used
//! for ordering and display.

use std::alloc::Layout;
use std::fmt;

/// A unique identifier for a component type, derived from its type path
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] for a string key, normally a type path.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        T::component_type_id()
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Metadata about a component type as it appears in an entity declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentMeta {
    /// The unique type identifier.
    pub type_id: ComponentTypeId,
    /// The human-readable name of the component (e.g. `"Motion"`).
    pub name: &'static str,
    /// Memory layout of one component instance.
    pub layout: Layout,
}

/// The core component trait.
///
/// # Examples
///
/// ```rust
/// use pattern_component::Component;
///
/// #[derive(Debug, Clone, Copy)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
/// }
/// ```
///
/// [`define_component!`](crate::define_component) writes this impl for you,
/// using the struct's identifier as its name.
pub trait Component: Sized + 'static {
    /// A human-readable name for this component type.
    fn type_name() -> &'static str;

    /// The fully qualified path identifying this component type.
    fn type_path() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the [`ComponentTypeId`] for this component.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_path())
    }

    /// Returns the [`ComponentMeta`] descriptor for this component type.
    fn meta() -> ComponentMeta {
        ComponentMeta {
            type_id: Self::component_type_id(),
            name: Self::type_name(),
            layout: Layout::new::<Self>(),
        }
    }
}
