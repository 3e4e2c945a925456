//! Store error types.

use pattern_component::Entity;

/// Errors raised by store operations.
///
/// Both variants are programming errors at the call site; the store never
/// retries or downgrades them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The entity type was never passed to `add` or `init`.
    #[error("entity type `{0}` was never registered with the store")]
    UnknownEntityType(&'static str),

    /// The instance is not in its bucket: already removed, or never added.
    #[error("entity {0} is not present in its bucket")]
    EntityNotFound(Entity),
}

/// Result alias for store operations.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
