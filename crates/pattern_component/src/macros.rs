//! Declaration macros for components and entity types.

/// Implements [`Component`](crate::Component) for one or more structs, using
/// each struct's identifier as its component name.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Copy)]
/// struct Motion { speed_x: f32, speed_y: f32 }
///
/// define_component!(Motion);
/// ```
#[macro_export]
macro_rules! define_component {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl $crate::Component for $ty {
                fn type_name() -> &'static str {
                    stringify!($ty)
                }
            }
        )+
    };
}

/// Declares the component composition of an entity type.
///
/// Each `field: Component` pair names a struct field holding that component.
/// The macro implements [`EntityType`](crate::EntityType) and
/// [`Composed`](crate::Composed) for the struct; fields not listed are plain
/// entity-local data and are invisible to component queries.
///
/// # Example
/// ```ignore
/// struct Ball { motion: Motion, visible: Visible }
///
/// entity_type!(Ball { motion: Motion, visible: Visible });
/// ```
#[macro_export]
macro_rules! entity_type {
    ($ty:ident { $($field:ident : $comp:ty),* $(,)? }) => {
        impl $crate::Composed for $ty {
            fn kind(&self) -> $crate::EntityKind {
                $crate::EntityKind::of::<Self>()
            }

            #[allow(unused_variables)]
            fn component_any(
                &self,
                id: $crate::ComponentTypeId,
            ) -> ::core::option::Option<&dyn ::core::any::Any> {
                $(
                    if id == <$comp as $crate::Component>::component_type_id() {
                        return ::core::option::Option::Some(&self.$field as &dyn ::core::any::Any);
                    }
                )*
                ::core::option::Option::None
            }

            #[allow(unused_variables)]
            fn component_any_mut(
                &mut self,
                id: $crate::ComponentTypeId,
            ) -> ::core::option::Option<&mut dyn ::core::any::Any> {
                $(
                    if id == <$comp as $crate::Component>::component_type_id() {
                        return ::core::option::Option::Some(
                            &mut self.$field as &mut dyn ::core::any::Any,
                        );
                    }
                )*
                ::core::option::Option::None
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }

        impl $crate::EntityType for $ty {
            fn type_name() -> &'static str {
                stringify!($ty)
            }

            fn components() -> ::std::vec::Vec<$crate::ComponentMeta> {
                ::std::vec![$(<$comp as $crate::Component>::meta()),*]
            }
        }
    };
}
