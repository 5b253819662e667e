use std::sync::Arc;

use thiserror::Error;

use crate::{model::TypeHandle, validation::ValidationResult};

/// The generic Error type, which provides coverage for all errors this library
/// can potentially return.
///
/// Only two error classes exist, and they are deliberately kept apart from the
/// structural findings collected in a
/// [`ValidationResult`](crate::validation::ValidationResult):
///
/// - **Precondition violations** ([`Error::TypeNotFound`],
///   [`Error::TypeInsert`]): the caller handed the library a handle it does
///   not know, or tried to register a colliding type. These surface
///   immediately at the API boundary and never enter the validation cache or
///   the violation model.
/// - **Verification failures** ([`Error::ImmutabilityViolation`]): raised
///   only by the throwing `verify` entry points when a result is invalid. The
///   complete result travels inside the error so downstream consumers can
///   inspect every finding, not just the first.
///
/// # Examples
///
/// ```rust
/// use immutascope::{Error, ImmutabilityValidator, model::{TypeHandle, TypeUniverse}};
/// use std::sync::Arc;
///
/// let universe = Arc::new(TypeUniverse::new());
/// let validator = ImmutabilityValidator::new(universe);
///
/// match validator.validate(TypeHandle::new(0xFFFF)) {
///     Err(Error::TypeNotFound(handle)) => {
///         eprintln!("unknown type: {handle}");
///     }
///     other => panic!("expected a precondition error, got {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to find a type for the given handle.
    ///
    /// This is the contract-violation path: the handle was never allocated by
    /// the descriptor source (or is the reserved null handle). It is reported
    /// to the caller directly and is never recorded as a structural finding.
    #[error("Failed to find a type for handle {0}")]
    TypeNotFound(TypeHandle),

    /// Failed to register a new type because its full name is already taken.
    ///
    /// Type identity is handle-based, but full names must stay unique so that
    /// name lookup and error rendering remain unambiguous.
    #[error("A type named '{0}' is already registered")]
    TypeInsert(String),

    /// A type failed immutability verification.
    ///
    /// Raised only by the throwing `verify` entry points. Carries the frozen
    /// [`ValidationResult`] with every finding discovered during the walk.
    #[error("Immutability verification failed:\n{0}")]
    ImmutabilityViolation(Arc<ValidationResult>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_not_found_rendering() {
        let error = Error::TypeNotFound(TypeHandle::new(0x2A));
        assert_eq!(
            error.to_string(),
            "Failed to find a type for handle 0x0000002a"
        );
    }

    #[test]
    fn test_type_insert_rendering() {
        let error = Error::TypeInsert("demo.Point".to_string());
        assert!(error.to_string().contains("demo.Point"));
    }
}
