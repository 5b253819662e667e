//! The graph-walking validation engine.
//!
//! [`GraphWalker`] performs the depth traversal of a root type's field graph:
//! it walks the inheritance chain, classifies each instance field, recurses
//! into composite field types, and accumulates findings into one
//! [`ViolationSink`]. Termination on cyclic type graphs is guaranteed by an
//! in-flight set of handles spanning the whole current validation chain:
//! direct self-references and arbitrarily long mutual cycles are both cut the
//! same way, and a type reachable over several paths is expanded only once.
//! Nested element validation shares that set, so cycles crossing collection
//! boundaries terminate too.
//!
//! The walker never aborts on a structural finding; findings are data and the
//! walk always completes, so a single pass reports everything discoverable.

use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    model::{DescriptorSource, FieldDescriptor, GenericArg, TypeDescriptor, TypeFlavor, TypeHandle},
    validation::{
        CyclePolicy, SafeTypeRegistry, ValidationCache, ValidationError, ValidationResult,
        ValidatorOptions, ViolationKind,
    },
    Error, Result,
};

use super::violation::ViolationSink;

/// One validation engine borrowing the immutable collaborators owned by the
/// facade. Stateless across calls; all per-walk state lives on the stack.
pub(crate) struct GraphWalker<'a> {
    source: &'a dyn DescriptorSource,
    registry: &'a SafeTypeRegistry,
    options: &'a ValidatorOptions,
    cache: &'a ValidationCache,
}

/// Mutable state of one validation chain.
///
/// `in_flight` holds every handle currently being (or already) expanded on
/// the chain; handles are never removed within a chain. `cut` records that
/// the walk skipped an expansion because a handle was already in-flight,
/// which makes any result computed since then dependent on the surrounding
/// chain.
struct WalkState {
    in_flight: HashSet<TypeHandle>,
    cut: bool,
}

impl WalkState {
    fn begin(root: TypeHandle) -> Self {
        WalkState {
            in_flight: HashSet::from([root]),
            cut: false,
        }
    }
}

impl<'a> GraphWalker<'a> {
    pub(crate) fn new(
        source: &'a dyn DescriptorSource,
        registry: &'a SafeTypeRegistry,
        options: &'a ValidatorOptions,
        cache: &'a ValidationCache,
    ) -> Self {
        GraphWalker {
            source,
            registry,
            options,
            cache,
        }
    }

    /// Cache-aware entry point: returns the memoized result for `root` or
    /// performs the full walk and publishes it.
    ///
    /// Errors only on unknown handles (a caller contract violation); findings
    /// never surface as errors here.
    pub(crate) fn validate_root(&self, root: TypeHandle) -> Result<Arc<ValidationResult>> {
        if let Some(cached) = self.cache.get(root) {
            return Ok(cached);
        }

        let descriptor = self
            .source
            .descriptor(root)
            .ok_or(Error::TypeNotFound(root))?;

        let result = if self.registry.is_safe(root, self.source) {
            // Safe types are not expanded at all.
            ValidationResult::valid()
        } else {
            tracing::debug!(
                target: "immutascope",
                "validating type graph rooted at {}",
                descriptor.full_name()
            );
            let mut sink = ViolationSink::new();
            let mut state = WalkState::begin(root);
            self.walk_type(descriptor, &mut state, &mut sink)?;
            // Any cut on a fresh chain points back into the root's own
            // expansion, so the root result is complete and cacheable.
            sink.freeze()
        };

        Ok(self.cache.insert_if_absent(root, Arc::new(result)))
    }

    /// Walks `ty`'s inheritance chain from the type itself up to, but
    /// excluding, the universal base, visiting the instance fields declared
    /// directly at each level. Inherited fields are therefore visited exactly
    /// once, at the level that declares them.
    fn walk_type(
        &self,
        ty: Arc<TypeDescriptor>,
        state: &mut WalkState,
        sink: &mut ViolationSink,
    ) -> Result<()> {
        let object = self.source.object_type();
        let mut current = Some(ty);

        while let Some(descriptor) = current {
            if descriptor.handle == object {
                break;
            }

            let type_name: Arc<str> = descriptor.full_name().into();
            for (_, field) in descriptor.fields.iter() {
                if field.is_static() {
                    continue;
                }
                self.check_field(&type_name, field, state, sink)?;
            }

            current = match descriptor.supertype {
                Some(parent) => Some(
                    self.source
                        .descriptor(parent)
                        .ok_or(Error::TypeNotFound(parent))?,
                ),
                None => None,
            };
        }

        Ok(())
    }

    /// Applies all checks to a single instance field. The checks are
    /// independent; none short-circuits the others.
    fn check_field(
        &self,
        type_name: &Arc<str>,
        field: &FieldDescriptor,
        state: &mut WalkState,
        sink: &mut ViolationSink,
    ) -> Result<()> {
        if !field.is_final() {
            sink.record(self.finding(type_name, field, ViolationKind::NonFinalField));
        }

        let declared = self
            .source
            .descriptor(field.declared_type)
            .ok_or(Error::TypeNotFound(field.declared_type))?;

        if declared.flavor == TypeFlavor::Collection {
            self.check_collection(type_name, field, state, sink)?;
        }

        if matches!(declared.flavor, TypeFlavor::Array { .. }) && self.options.strict_arrays {
            sink.record(self.finding(type_name, field, ViolationKind::MutableArray));
        }

        // The "actual" type: the component type for arrays, the declared type
        // itself otherwise.
        let actual = match declared.flavor {
            TypeFlavor::Array { element } => element,
            _ => field.declared_type,
        };
        let actual_descriptor = self
            .source
            .descriptor(actual)
            .ok_or(Error::TypeNotFound(actual))?;

        if actual_descriptor.flavor == TypeFlavor::Object {
            // Erasure artifact: nothing concrete to recurse into.
            sink.record(self.finding(type_name, field, ViolationKind::UndeterminedTypeFromErasure));
            return Ok(());
        }

        // Recurse into composite types not already being expanded on this
        // chain. insert() doubles as the membership test; handles stay in the
        // set for the rest of the chain, which both terminates cycles and
        // collapses repeated reachability.
        if !self.registry.is_safe(actual, self.source) {
            if state.in_flight.insert(actual) {
                self.walk_type(actual_descriptor, state, sink)?;
            } else {
                state.cut = true;
            }
        }

        Ok(())
    }

    /// Container field checks: the container type itself, then each generic
    /// element argument independently. An immutable container of mutable
    /// elements is still flagged, and every argument contributes its own
    /// finding; there is no precedence between argument kinds.
    fn check_collection(
        &self,
        type_name: &Arc<str>,
        field: &FieldDescriptor,
        state: &mut WalkState,
        sink: &mut ViolationSink,
    ) -> Result<()> {
        if !self.registry.is_safe(field.declared_type, self.source) {
            sink.record(self.finding(type_name, field, ViolationKind::MutableType));
        }

        for arg in &field.generic_args {
            match arg {
                GenericArg::Wildcard => {
                    sink.record(self.finding(
                        type_name,
                        field,
                        ViolationKind::UnresolvableGenericType,
                    ));
                }
                GenericArg::Resolved(element) => {
                    let invalid = if state.in_flight.contains(element) {
                        state.cut = true;
                        match self.options.cycle_policy {
                            CyclePolicy::AssumeSafe => false,
                            CyclePolicy::UsePartialFindings => sink.has_findings_for(*element),
                        }
                    } else {
                        !self.element_is_valid(*element, state)?
                    };
                    if invalid {
                        sink.record(self.finding(
                            type_name,
                            field,
                            ViolationKind::MutableElementInCollection,
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Cache-aware validation of a container element type.
    ///
    /// Shares the chain's in-flight set, so a cycle that crosses a collection
    /// boundary is cut the same way a plain field cycle is instead of
    /// re-entering the walk unboundedly. The element's own result is
    /// published to the cache only when its walk never hit an in-flight
    /// handle; a walk cut short depends on the surrounding chain and must not
    /// be memoized.
    fn element_is_valid(&self, element: TypeHandle, state: &mut WalkState) -> Result<bool> {
        if let Some(cached) = self.cache.get(element) {
            return Ok(cached.is_valid());
        }

        let descriptor = self
            .source
            .descriptor(element)
            .ok_or(Error::TypeNotFound(element))?;

        if self.registry.is_safe(element, self.source) {
            let _ = self
                .cache
                .insert_if_absent(element, Arc::new(ValidationResult::valid()));
            return Ok(true);
        }

        state.in_flight.insert(element);
        let outer_cut = state.cut;
        state.cut = false;

        let mut sink = ViolationSink::new();
        self.walk_type(descriptor, state, &mut sink)?;

        let subtree_cut = state.cut;
        state.cut = outer_cut || subtree_cut;

        let result = Arc::new(sink.freeze());
        let result = if subtree_cut {
            result
        } else {
            self.cache.insert_if_absent(element, result)
        };
        Ok(result.is_valid())
    }

    fn finding(
        &self,
        type_name: &Arc<str>,
        field: &FieldDescriptor,
        kind: ViolationKind,
    ) -> ValidationError {
        ValidationError::new(
            field.declaring_type,
            Arc::clone(type_name),
            Arc::clone(&field.name),
            kind,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldModifiers, TypeUniverse};

    fn walk(
        universe: &TypeUniverse,
        options: &ValidatorOptions,
        root: TypeHandle,
    ) -> Arc<ValidationResult> {
        let registry = SafeTypeRegistry::new(universe, &options.extra_safe_types);
        let cache = ValidationCache::new();
        GraphWalker::new(universe, &registry, options, &cache)
            .validate_root(root)
            .unwrap()
    }

    fn frozen_list(universe: &TypeUniverse) -> TypeHandle {
        universe
            .build_type()
            .name("FrozenList")
            .flavor(TypeFlavor::Collection)
            .interface(universe.immutable_container())
            .insert()
            .unwrap()
    }

    #[test]
    fn test_object_field_reports_erasure() {
        let universe = TypeUniverse::new();
        let holder = universe.build_type().name("Holder").insert().unwrap();
        universe
            .add_field(holder, "anything", universe.object(), FieldModifiers::FINAL)
            .unwrap();

        let result = walk(&universe, &ValidatorOptions::default(), holder);
        assert_eq!(result.errors().len(), 1);
        assert_eq!(
            result.errors()[0].kind(),
            ViolationKind::UndeterminedTypeFromErasure
        );
    }

    #[test]
    fn test_array_of_object_reports_erasure_and_array() {
        // An array whose component type is erased: both the strict-array
        // finding and the erasure finding apply to the same field.
        let universe = TypeUniverse::new();
        let object_array = universe.array_of(universe.object()).unwrap();
        let holder = universe.build_type().name("Holder").insert().unwrap();
        universe
            .add_field(holder, "values", object_array, FieldModifiers::FINAL)
            .unwrap();

        let result = walk(&universe, &ValidatorOptions::default(), holder);
        let kinds: Vec<_> = result.errors().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::MutableArray,
                ViolationKind::UndeterminedTypeFromErasure
            ]
        );
    }

    #[test]
    fn test_unknown_root_is_a_precondition_error() {
        let universe = TypeUniverse::new();
        let registry = SafeTypeRegistry::new(&universe, &[]);
        let options = ValidatorOptions::default();
        let cache = ValidationCache::new();
        let walker = GraphWalker::new(&universe, &registry, &options, &cache);

        assert!(matches!(
            walker.validate_root(TypeHandle::new(0xFFFF)),
            Err(Error::TypeNotFound(_))
        ));
        // Precondition failures never enter the cache.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cycle_policy_assume_safe() {
        let universe = TypeUniverse::new();
        let frozen_list = frozen_list(&universe);
        let chain = universe.build_type().name("Chain").insert().unwrap();
        universe
            .add_field(chain, "tag", universe.object(), FieldModifiers::empty())
            .unwrap();
        universe
            .add_generic_field(
                chain,
                "links",
                frozen_list,
                FieldModifiers::FINAL,
                vec![GenericArg::Resolved(chain)],
            )
            .unwrap();

        let result = walk(&universe, &ValidatorOptions::default(), chain);
        let kinds: Vec<_> = result.errors().iter().map(|e| e.kind()).collect();
        assert!(!kinds.contains(&ViolationKind::MutableElementInCollection));
    }

    #[test]
    fn test_cycle_policy_partial_findings() {
        let universe = TypeUniverse::new();
        let frozen_list = frozen_list(&universe);
        let chain = universe.build_type().name("Chain").insert().unwrap();
        universe
            .add_field(chain, "tag", universe.object(), FieldModifiers::empty())
            .unwrap();
        universe
            .add_generic_field(
                chain,
                "links",
                frozen_list,
                FieldModifiers::FINAL,
                vec![GenericArg::Resolved(chain)],
            )
            .unwrap();

        let options =
            ValidatorOptions::default().with_cycle_policy(CyclePolicy::UsePartialFindings);
        let result = walk(&universe, &options, chain);
        let kinds: Vec<_> = result.errors().iter().map(|e| e.kind()).collect();
        assert!(kinds.contains(&ViolationKind::MutableElementInCollection));
    }

    #[test]
    fn test_chain_dependent_element_results_stay_out_of_the_cache() {
        // A and B hold collections of each other; B also has its own
        // violation. Walking A cuts B's expansion at the cycle, so B's
        // result computed on A's chain is incomplete and must not be
        // memoized. A later standalone walk of B computes the full result.
        let universe = TypeUniverse::new();
        let frozen_list = frozen_list(&universe);
        let a = universe.build_type().name("A").insert().unwrap();
        let b = universe.build_type().name("B").insert().unwrap();
        universe
            .add_generic_field(
                a,
                "items",
                frozen_list,
                FieldModifiers::FINAL,
                vec![GenericArg::Resolved(b)],
            )
            .unwrap();
        universe
            .add_generic_field(
                b,
                "items",
                frozen_list,
                FieldModifiers::FINAL,
                vec![GenericArg::Resolved(a)],
            )
            .unwrap();
        universe
            .add_field(b, "tag", universe.object(), FieldModifiers::empty())
            .unwrap();

        let registry = SafeTypeRegistry::new(&universe, &[]);
        let options = ValidatorOptions::default();
        let cache = ValidationCache::new();
        let walker = GraphWalker::new(&universe, &registry, &options, &cache);

        let first = walker.validate_root(a).unwrap();
        assert!(!first.is_valid());
        assert!(cache.get(b).is_none());

        let standalone = walker.validate_root(b).unwrap();
        let kinds: Vec<_> = standalone.errors().iter().map(|e| e.kind()).collect();
        assert!(kinds.contains(&ViolationKind::NonFinalField));
        assert!(kinds.contains(&ViolationKind::MutableElementInCollection));
    }
}
