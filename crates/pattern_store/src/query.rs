//! Compile-time component lists for subset queries.

use pattern_component::{Component, ComponentTypeId};

/// A tuple of component types used as the requested set of
/// [`EntityStore::get_with_component`](crate::EntityStore::get_with_component).
///
/// Implemented for `()` (matches every entity) and for tuples of up to eight
/// component types.
pub trait ComponentQuery {
    /// The requested component ids, in tuple order.
    fn component_type_ids() -> Vec<ComponentTypeId>;
}

impl ComponentQuery for () {
    fn component_type_ids() -> Vec<ComponentTypeId> {
        Vec::new()
    }
}

macro_rules! impl_component_query_tuple {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentQuery for ($($name,)+) {
            fn component_type_ids() -> Vec<ComponentTypeId> {
                vec![$($name::component_type_id()),+]
            }
        }
    };
}

impl_component_query_tuple!(A);
impl_component_query_tuple!(A, B);
impl_component_query_tuple!(A, B, C);
impl_component_query_tuple!(A, B, C, D);
impl_component_query_tuple!(A, B, C, D, E);
impl_component_query_tuple!(A, B, C, D, E, F);
impl_component_query_tuple!(A, B, C, D, E, F, G);
impl_component_query_tuple!(A, B, C, D, E, F, G, H);
