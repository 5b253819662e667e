use std::collections::HashSet;

use crate::model::{DescriptorSource, TypeHandle};

/// The set of types the validator treats as inherently immutable.
///
/// Built once at validator construction from the descriptor source's builtin
/// safe set unioned with any caller-supplied extensions, and immutable
/// thereafter, so queries require no locking.
///
/// Membership is tested by assignability, not just exact match: registering a
/// base type or marker interface whitelists every type assignable to it. This
/// is how the immutable-container family works: container types carrying the
/// `core.ImmutableContainer` marker are safe without individual registration.
#[derive(Debug, Clone)]
pub struct SafeTypeRegistry {
    safe: HashSet<TypeHandle>,
}

impl SafeTypeRegistry {
    /// Builds the registry for `source`, unioning its builtin safe set with
    /// `extra`. Extensions never replace the defaults.
    #[must_use]
    pub fn new(source: &dyn DescriptorSource, extra: &[TypeHandle]) -> Self {
        let mut safe: HashSet<TypeHandle> = source.builtin_safe_types().into_iter().collect();
        safe.extend(extra.iter().copied());
        SafeTypeRegistry { safe }
    }

    /// Returns true if `ty` exactly matches a registered entry, or is
    /// assignable to one through any chain of supertypes and declared
    /// interfaces. Assignability is transitive: a type implementing a
    /// sub-interface of a registered marker is safe.
    ///
    /// Unknown handles are never safe.
    #[must_use]
    pub fn is_safe(&self, ty: TypeHandle, source: &dyn DescriptorSource) -> bool {
        let mut visited = HashSet::new();
        let mut pending = vec![ty];
        while let Some(handle) = pending.pop() {
            if !visited.insert(handle) {
                continue;
            }
            if self.safe.contains(&handle) {
                return true;
            }
            let Some(descriptor) = source.descriptor(handle) else {
                continue;
            };
            pending.extend(descriptor.interfaces.iter().copied());
            if let Some(parent) = descriptor.supertype {
                pending.push(parent);
            }
        }
        false
    }

    /// Number of directly registered entries (assignable subtypes are not
    /// counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.safe.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.safe.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TypeFlavor, TypeUniverse};

    #[test]
    fn test_builtin_scalars_are_safe() {
        let universe = TypeUniverse::new();
        let registry = SafeTypeRegistry::new(&universe, &[]);

        let i32_ty = universe.get_by_fullname("core.I32").unwrap().handle;
        let string_ty = universe.get_by_fullname("core.String").unwrap().handle;
        assert!(registry.is_safe(i32_ty, &universe));
        assert!(registry.is_safe(string_ty, &universe));
    }

    #[test]
    fn test_object_and_unknown_are_not_safe() {
        let universe = TypeUniverse::new();
        let registry = SafeTypeRegistry::new(&universe, &[]);

        assert!(!registry.is_safe(universe.object(), &universe));
        assert!(!registry.is_safe(TypeHandle::new(0xFFFF), &universe));
    }

    #[test]
    fn test_marker_interface_whitelists_by_assignability() {
        let universe = TypeUniverse::new();
        let registry = SafeTypeRegistry::new(&universe, &[]);

        let frozen_list = universe
            .build_type()
            .namespace("coll")
            .name("FrozenList")
            .flavor(TypeFlavor::Collection)
            .interface(universe.immutable_container())
            .insert()
            .unwrap();
        let plain_list = universe
            .build_type()
            .namespace("coll")
            .name("PlainList")
            .flavor(TypeFlavor::Collection)
            .insert()
            .unwrap();

        assert!(registry.is_safe(frozen_list, &universe));
        assert!(!registry.is_safe(plain_list, &universe));
    }

    #[test]
    fn test_interface_assignability_is_transitive() {
        // FrozenVec declares ImmutableList, which declares the registered
        // marker; safety must follow the whole interface chain.
        let universe = TypeUniverse::new();
        let registry = SafeTypeRegistry::new(&universe, &[]);

        let immutable_list = universe
            .build_type()
            .namespace("coll")
            .name("ImmutableList")
            .flavor(TypeFlavor::Collection)
            .interface(universe.immutable_container())
            .insert()
            .unwrap();
        let frozen_vec = universe
            .build_type()
            .namespace("coll")
            .name("FrozenVec")
            .flavor(TypeFlavor::Collection)
            .interface(immutable_list)
            .insert()
            .unwrap();

        assert!(registry.is_safe(immutable_list, &universe));
        assert!(registry.is_safe(frozen_vec, &universe));
    }

    #[test]
    fn test_extra_safe_type_whitelists_subtypes() {
        let universe = TypeUniverse::new();
        let instant = universe
            .build_type()
            .namespace("time")
            .name("Instant")
            .insert()
            .unwrap();
        let zoned = universe
            .build_type()
            .namespace("time")
            .name("ZonedInstant")
            .supertype(instant)
            .insert()
            .unwrap();

        let defaults = SafeTypeRegistry::new(&universe, &[]);
        assert!(!defaults.is_safe(instant, &universe));

        // Registering the base type also covers the subtype.
        let extended = SafeTypeRegistry::new(&universe, &[instant]);
        assert!(extended.is_safe(instant, &universe));
        assert!(extended.is_safe(zoned, &universe));
        assert!(extended.len() > defaults.len());
    }
}
