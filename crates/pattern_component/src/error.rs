//! Construction-time validation errors.

use std::fmt::Display;

/// A component or entity failed a field-level invariant while being built.
///
/// Raised by fallible constructors before an instance ever reaches the store;
/// the store itself never re-validates field values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    /// A field restricted to an enumerated domain received another value.
    #[error("{component}.{field} = {value} is outside its allowed domain")]
    OutOfDomain {
        /// Component or entity type being built.
        component: &'static str,
        /// Offending field.
        field: &'static str,
        /// The rejected value, rendered with `Display`.
        value: String,
    },

    /// Any other violated invariant.
    #[error("invalid {component}: {reason}")]
    Invalid {
        /// Component or entity type being built.
        component: &'static str,
        /// What was wrong.
        reason: String,
    },
}

/// Checks that `value` is one of `domain`.
///
/// # Errors
///
/// Returns [`ConstructionError::OutOfDomain`] naming the offending component
/// field when `value` is not in `domain`.
pub fn ensure_in_domain<T: PartialEq + Display>(
    component: &'static str,
    field: &'static str,
    value: T,
    domain: &[T],
) -> Result<T, ConstructionError> {
    if domain.contains(&value) {
        Ok(value)
    } else {
        Err(ConstructionError::OutOfDomain {
            component,
            field,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_in_domain_passes_through() {
        assert_eq!(ensure_in_domain("Team", "team", 1, &[1, 2]), Ok(1));
    }

    #[test]
    fn test_value_outside_domain_is_rejected() {
        let err = ensure_in_domain("Team", "team", 3, &[1, 2]).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::OutOfDomain {
                component: "Team",
                field: "team",
                value: "3".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "Team.team = 3 is outside its allowed domain"
        );
    }
}
