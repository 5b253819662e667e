use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    model::{DescriptorSource, TypeHandle},
    validation::{
        GraphWalker, SafeTypeRegistry, ValidationCache, ValidationResult, ValidatorOptions,
    },
    Error, Result,
};

/// The documented entry point: validates declared type graphs for transitive
/// immutability.
///
/// A validator owns its configuration, safe-type registry, and result cache;
/// all three are fixed at construction (the cache only ever accretes frozen
/// results). The validator is `Send + Sync` and a single instance is meant to
/// be shared process-wide; results are memoized per type, so repeat
/// validation is a cache lookup.
///
/// # Examples
///
/// ```rust
/// use immutascope::{ImmutabilityValidator, model::{FieldModifiers, TypeUniverse}};
/// use std::sync::Arc;
///
/// let universe = Arc::new(TypeUniverse::new());
/// let i32_ty = universe.get_by_fullname("core.I32").unwrap().handle;
///
/// let point = universe.build_type().namespace("demo").name("Point").insert()?;
/// universe.add_field(point, "x", i32_ty, FieldModifiers::FINAL)?;
/// universe.add_field(point, "y", i32_ty, FieldModifiers::empty())?;
///
/// let validator = ImmutabilityValidator::new(universe);
/// let result = validator.validate(point)?;
/// assert!(!result.is_valid());
/// assert_eq!(result.to_string(), "demo.Point.y : NonFinalField");
/// # Ok::<(), immutascope::Error>(())
/// ```
pub struct ImmutabilityValidator {
    source: Arc<dyn DescriptorSource>,
    registry: SafeTypeRegistry,
    options: ValidatorOptions,
    cache: ValidationCache,
}

impl ImmutabilityValidator {
    /// Creates a validator with the default (strict) options.
    #[must_use]
    pub fn new(source: Arc<dyn DescriptorSource>) -> Self {
        Self::with_options(source, ValidatorOptions::default())
    }

    /// Creates a validator with explicit options. The safe-type registry is
    /// built here, once: the source's builtin safe set unioned with
    /// `options.extra_safe_types`.
    #[must_use]
    pub fn with_options(source: Arc<dyn DescriptorSource>, options: ValidatorOptions) -> Self {
        let registry = SafeTypeRegistry::new(source.as_ref(), &options.extra_safe_types);
        ImmutabilityValidator {
            source,
            registry,
            options,
            cache: ValidationCache::new(),
        }
    }

    /// Validates the type graph rooted at `root` and returns the frozen
    /// result, from cache when available.
    ///
    /// Structural findings are data inside the result, never errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] if `root` (or a handle reachable from
    /// it) is unknown to the descriptor source. Precondition failures never
    /// enter the cache.
    pub fn validate(&self, root: TypeHandle) -> Result<Arc<ValidationResult>> {
        self.walker().validate_root(root)
    }

    /// Throwing variant of [`validate`](Self::validate): returns
    /// [`Error::ImmutabilityViolation`] carrying the complete result when the
    /// type graph is not immutable.
    ///
    /// # Errors
    ///
    /// [`Error::TypeNotFound`] on unknown handles,
    /// [`Error::ImmutabilityViolation`] when findings exist.
    pub fn verify(&self, root: TypeHandle) -> Result<()> {
        let result = self.validate(root)?;
        if result.is_valid() {
            Ok(())
        } else {
            Err(Error::ImmutabilityViolation(result))
        }
    }

    /// Validates several roots in parallel, preserving input order in the
    /// returned results.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::TypeNotFound`] encountered, if any root or
    /// reachable handle is unknown.
    pub fn validate_all(&self, roots: &[TypeHandle]) -> Result<Vec<Arc<ValidationResult>>> {
        roots.par_iter().map(|root| self.validate(*root)).collect()
    }

    /// Parallel throwing variant: fails on the first root whose graph is not
    /// immutable.
    ///
    /// # Errors
    ///
    /// As [`verify`](Self::verify), for any of the given roots.
    pub fn verify_all(&self, roots: &[TypeHandle]) -> Result<()> {
        roots.par_iter().try_for_each(|root| self.verify(*root))
    }

    /// The already-computed result for `root`, if one is cached.
    #[must_use]
    pub fn cached_result(&self, root: TypeHandle) -> Option<Arc<ValidationResult>> {
        self.cache.get(root)
    }

    /// The options this validator was constructed with.
    #[must_use]
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// The safe-type registry this validator consults.
    #[must_use]
    pub fn safe_types(&self) -> &SafeTypeRegistry {
        &self.registry
    }

    fn walker(&self) -> GraphWalker<'_> {
        GraphWalker::new(
            self.source.as_ref(),
            &self.registry,
            &self.options,
            &self.cache,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeUniverse;
    use crate::test::point_universe;
    use crate::validation::ViolationKind;

    #[test]
    fn test_validate_returns_findings_not_errors() {
        let (universe, point) = point_universe();
        let validator = ImmutabilityValidator::new(universe);

        let result = validator.validate(point).unwrap();
        assert!(!result.is_valid());
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].kind(), ViolationKind::NonFinalField);
    }

    #[test]
    fn test_verify_carries_complete_result() {
        let (universe, point) = point_universe();
        let validator = ImmutabilityValidator::new(universe);

        match validator.verify(point) {
            Err(Error::ImmutabilityViolation(result)) => {
                assert_eq!(result.errors().len(), 1);
                assert_eq!(result.errors()[0].field_name(), "y");
            }
            other => panic!("expected an immutability violation, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_passes_for_safe_root() {
        let universe = Arc::new(TypeUniverse::new());
        let i32_ty = universe.get_by_fullname("core.I32").unwrap().handle;
        let validator = ImmutabilityValidator::new(universe);
        assert!(validator.verify(i32_ty).is_ok());
    }

    #[test]
    fn test_unknown_handle_is_a_precondition_error() {
        let universe = Arc::new(TypeUniverse::new());
        let validator = ImmutabilityValidator::new(universe);
        assert!(matches!(
            validator.validate(TypeHandle::new(0xFFFF)),
            Err(Error::TypeNotFound(_))
        ));
        assert!(validator.cached_result(TypeHandle::new(0xFFFF)).is_none());
    }

    #[test]
    fn test_results_are_cached() {
        let (universe, point) = point_universe();
        let validator = ImmutabilityValidator::new(universe);

        assert!(validator.cached_result(point).is_none());
        let first = validator.validate(point).unwrap();
        let second = validator.validate(point).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(validator.cached_result(point).is_some());
    }

    #[test]
    fn test_validate_all_preserves_order() {
        let (universe, point) = point_universe();
        let i32_ty = universe.get_by_fullname("core.I32").unwrap().handle;
        let validator = ImmutabilityValidator::new(universe);

        let results = validator.validate_all(&[i32_ty, point]).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_valid());
        assert!(!results[1].is_valid());
    }
}
