//! In-memory type model backing the validator.
//!
//! This module provides [`TypeUniverse`], a thread-safe registry of
//! [`TypeDescriptor`] snapshots, and [`TypeBuilder`], the fluent construction
//! entry point. The universe is the built-in implementation of
//! [`DescriptorSource`], the single seam through which the graph walker sees
//! type metadata; the walker itself never names a concrete introspection
//! facility.
//!
//! # Registry Architecture
//!
//! - **Handle-based lookup**: primary index, a lock-free [`SkipMap`] keyed by
//!   [`TypeHandle`]
//! - **Name-based lookup**: secondary [`DashMap`] index over full names
//! - **Array interning**: one array type per element type, created on demand
//! - **Atomic handle allocation**: handles are dense, allocated from an
//!   [`AtomicU32`], and never reused
//!
//! # Well-Known Types
//!
//! Construction seeds the universe with the universal base type
//! (`core.Object`), the scalar family (`core.Bool` through `core.F64`, plus
//! `core.String`), and the `core.ImmutableContainer` marker interface.
//! Container types registered with that marker in their interface list are
//! treated as part of the host's immutable-collection family and whitelisted
//! by assignability.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::{
    model::{FieldDescriptor, FieldModifiers, GenericArg, TypeDescriptor, TypeFlavor, TypeHandle},
    Error, Result,
};

/// Names of the scalar types seeded at construction, all in the `core`
/// namespace.
const SCALAR_NAMES: &[&str] = &[
    "Bool", "Char", "I8", "U8", "I16", "U16", "I32", "U32", "I64", "U64", "F32", "F64", "String",
];

/// The injected "TypeDescriptor source" seam.
///
/// The graph walker and safe-type registry resolve all metadata through this
/// trait, so alternative backends (a different host metadata reader, a mock)
/// can be swapped in without touching the validation engine.
pub trait DescriptorSource: Send + Sync {
    /// Resolves a handle to its descriptor snapshot, or `None` for a handle
    /// this source does not know.
    fn descriptor(&self, handle: TypeHandle) -> Option<Arc<TypeDescriptor>>;

    /// The universal base type of this source's hierarchy. The inheritance
    /// walk stops below it and fields erased to it are reported, not
    /// expanded.
    fn object_type(&self) -> TypeHandle;

    /// Types this source considers inherently immutable: scalars, text, and
    /// the host's immutable-collection family. The default safe-type registry
    /// is built from this set.
    fn builtin_safe_types(&self) -> Vec<TypeHandle>;
}

/// Thread-safe registry of declared types.
///
/// All mutation is append-only: types are registered once, fields may be
/// appended to an existing type (which is what makes cyclic field graphs
/// declarable), and nothing is ever removed. Concurrent registration and
/// lookup require no external locking.
pub struct TypeUniverse {
    /// Primary storage, handle -> descriptor
    types: SkipMap<TypeHandle, Arc<TypeDescriptor>>,
    /// Secondary index, full name -> handle
    fullname_index: DashMap<String, TypeHandle>,
    /// Interned array types, element handle -> array handle
    array_index: DashMap<TypeHandle, TypeHandle>,
    /// Next handle value to allocate
    next_handle: AtomicU32,
    /// The universal base type
    object: TypeHandle,
    /// The immutable-container marker interface
    immutable_container: TypeHandle,
    /// Seeded types that are inherently immutable
    builtin_safe: Vec<TypeHandle>,
}

impl TypeUniverse {
    /// Creates a universe seeded with the well-known types.
    #[must_use]
    pub fn new() -> Self {
        let mut universe = TypeUniverse {
            types: SkipMap::new(),
            fullname_index: DashMap::new(),
            array_index: DashMap::new(),
            next_handle: AtomicU32::new(1),
            object: TypeHandle::new(0),
            immutable_container: TypeHandle::new(0),
            builtin_safe: Vec::new(),
        };

        let object = universe
            .register(TypeBuilderSpec {
                namespace: "core".into(),
                name: "Object".into(),
                flavor: TypeFlavor::Object,
                supertype: None,
                interfaces: Vec::new(),
            })
            .expect("seeding the universal base cannot collide");
        universe.object = object;

        let mut safe = Vec::new();
        for scalar in SCALAR_NAMES {
            let handle = universe
                .register(TypeBuilderSpec {
                    namespace: "core".into(),
                    name: (*scalar).into(),
                    flavor: TypeFlavor::Scalar,
                    supertype: Some(object),
                    interfaces: Vec::new(),
                })
                .expect("seeding scalars cannot collide");
            safe.push(handle);
        }

        let marker = universe
            .register(TypeBuilderSpec {
                namespace: "core".into(),
                name: "ImmutableContainer".into(),
                flavor: TypeFlavor::Collection,
                supertype: Some(object),
                interfaces: Vec::new(),
            })
            .expect("seeding the container marker cannot collide");
        safe.push(marker);

        universe.immutable_container = marker;
        universe.builtin_safe = safe;
        universe
    }

    /// Starts fluent construction of a new type.
    #[must_use]
    pub fn build_type(&self) -> TypeBuilder<'_> {
        TypeBuilder::new(self)
    }

    /// Resolves a handle to its descriptor.
    #[must_use]
    pub fn get(&self, handle: TypeHandle) -> Option<Arc<TypeDescriptor>> {
        self.types.get(&handle).map(|entry| entry.value().clone())
    }

    /// Looks a type up by its full `namespace.name`.
    #[must_use]
    pub fn get_by_fullname(&self, full_name: &str) -> Option<Arc<TypeDescriptor>> {
        let handle = *self.fullname_index.get(full_name)?;
        self.get(handle)
    }

    /// The universal base type seeded at construction.
    #[must_use]
    pub fn object(&self) -> TypeHandle {
        self.object
    }

    /// The `core.ImmutableContainer` marker interface. Container types that
    /// declare it are whitelisted by the default safe-type registry through
    /// assignability.
    #[must_use]
    pub fn immutable_container(&self) -> TypeHandle {
        self.immutable_container
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered (never the case after
    /// construction, which seeds the well-known types).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns the interned array type over `element`, creating it on first
    /// request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] if `element` is not registered.
    pub fn array_of(&self, element: TypeHandle) -> Result<TypeHandle> {
        if let Some(existing) = self.array_index.get(&element) {
            return Ok(*existing);
        }

        let element_desc = self.get(element).ok_or(Error::TypeNotFound(element))?;
        let handle = match self.register(TypeBuilderSpec {
            namespace: element_desc.namespace.to_string(),
            name: format!("{}[]", element_desc.name),
            flavor: TypeFlavor::Array { element },
            supertype: Some(self.object),
            interfaces: Vec::new(),
        }) {
            Ok(handle) => handle,
            // Another thread interned the same array type between the index
            // probe and registration; resolve to its handle.
            Err(Error::TypeInsert(full_name)) => {
                let existing = self.fullname_index.get(&full_name).map(|entry| *entry);
                existing.ok_or(Error::TypeInsert(full_name))?
            }
            Err(err) => return Err(err),
        };

        let winner = *self.array_index.entry(element).or_insert(handle);
        Ok(winner)
    }

    /// Appends a plain field to an already registered type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] if either the declaring type or the
    /// field's declared type is unknown.
    pub fn add_field(
        &self,
        declaring: TypeHandle,
        name: &str,
        declared_type: TypeHandle,
        modifiers: FieldModifiers,
    ) -> Result<()> {
        self.add_generic_field(declaring, name, declared_type, modifiers, Vec::new())
    }

    /// Appends a field with generic type arguments (a container field) to an
    /// already registered type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] if the declaring type, the field's
    /// declared type, or any resolved generic argument is unknown.
    pub fn add_generic_field(
        &self,
        declaring: TypeHandle,
        name: &str,
        declared_type: TypeHandle,
        modifiers: FieldModifiers,
        generic_args: Vec<GenericArg>,
    ) -> Result<()> {
        let descriptor = self.get(declaring).ok_or(Error::TypeNotFound(declaring))?;
        if self.get(declared_type).is_none() {
            return Err(Error::TypeNotFound(declared_type));
        }
        for arg in &generic_args {
            if let GenericArg::Resolved(handle) = arg {
                if self.get(*handle).is_none() {
                    return Err(Error::TypeNotFound(*handle));
                }
            }
        }

        descriptor.fields.push(FieldDescriptor {
            name: name.into(),
            declared_type,
            generic_args,
            modifiers,
            declaring_type: declaring,
        });
        Ok(())
    }

    /// Registers a fully specified type and allocates its handle.
    fn register(&self, spec: TypeBuilderSpec) -> Result<TypeHandle> {
        let full_name = if spec.namespace.is_empty() {
            spec.name.clone()
        } else {
            format!("{}.{}", spec.namespace, spec.name)
        };

        let handle = TypeHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));

        match self.fullname_index.entry(full_name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(Error::TypeInsert(full_name));
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(handle);
            }
        }

        self.types.insert(
            handle,
            Arc::new(TypeDescriptor {
                handle,
                namespace: spec.namespace.into(),
                name: spec.name.into(),
                flavor: spec.flavor,
                supertype: spec.supertype,
                interfaces: spec.interfaces,
                fields: Arc::new(boxcar::Vec::new()),
            }),
        );
        Ok(handle)
    }
}

impl Default for TypeUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorSource for TypeUniverse {
    fn descriptor(&self, handle: TypeHandle) -> Option<Arc<TypeDescriptor>> {
        self.get(handle)
    }

    fn object_type(&self) -> TypeHandle {
        self.object
    }

    fn builtin_safe_types(&self) -> Vec<TypeHandle> {
        self.builtin_safe.clone()
    }
}

/// Internal, fully resolved construction spec consumed by
/// [`TypeUniverse::register`].
struct TypeBuilderSpec {
    namespace: String,
    name: String,
    flavor: TypeFlavor,
    supertype: Option<TypeHandle>,
    interfaces: Vec<TypeHandle>,
}

/// Fluent builder for registering a type in a [`TypeUniverse`].
///
/// # Examples
///
/// ```rust
/// use immutascope::model::{TypeFlavor, TypeUniverse};
///
/// let universe = TypeUniverse::new();
/// let point = universe
///     .build_type()
///     .namespace("demo")
///     .name("Point")
///     .flavor(TypeFlavor::Class)
///     .insert()?;
/// assert!(universe.get(point).is_some());
/// # Ok::<(), immutascope::Error>(())
/// ```
pub struct TypeBuilder<'a> {
    universe: &'a TypeUniverse,
    namespace: String,
    name: String,
    flavor: TypeFlavor,
    supertype: Option<TypeHandle>,
    interfaces: Vec<TypeHandle>,
}

impl<'a> TypeBuilder<'a> {
    fn new(universe: &'a TypeUniverse) -> Self {
        TypeBuilder {
            universe,
            namespace: String::new(),
            name: String::new(),
            flavor: TypeFlavor::Class,
            supertype: Some(universe.object()),
            interfaces: Vec::new(),
        }
    }

    /// Sets the namespace (defaults to empty).
    #[must_use]
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    /// Sets the simple type name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Sets the structural flavor (defaults to [`TypeFlavor::Class`]).
    #[must_use]
    pub fn flavor(mut self, flavor: TypeFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Sets the direct supertype (defaults to the universal base).
    #[must_use]
    pub fn supertype(mut self, supertype: TypeHandle) -> Self {
        self.supertype = Some(supertype);
        self
    }

    /// Adds a declared interface/marker.
    #[must_use]
    pub fn interface(mut self, interface: TypeHandle) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Registers the type and returns its freshly allocated handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeInsert`] if a type with the same full name is
    /// already registered, or [`Error::TypeNotFound`] if the supertype or an
    /// interface handle is unknown.
    pub fn insert(self) -> Result<TypeHandle> {
        if let Some(supertype) = self.supertype {
            if self.universe.get(supertype).is_none() {
                return Err(Error::TypeNotFound(supertype));
            }
        }
        for interface in &self.interfaces {
            if self.universe.get(*interface).is_none() {
                return Err(Error::TypeNotFound(*interface));
            }
        }

        self.universe.register(TypeBuilderSpec {
            namespace: self.namespace,
            name: self.name,
            flavor: self.flavor,
            supertype: self.supertype,
            interfaces: self.interfaces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_seeds_well_known_types() {
        let universe = TypeUniverse::new();
        assert!(universe.get_by_fullname("core.Object").is_some());
        assert!(universe.get_by_fullname("core.I32").is_some());
        assert!(universe.get_by_fullname("core.String").is_some());
        assert!(universe
            .get_by_fullname("core.ImmutableContainer")
            .is_some());
        assert!(!universe.is_empty());

        // Scalars plus String plus the marker interface are the builtin safe
        // set; the universal base is deliberately not in it.
        let safe = universe.builtin_safe_types();
        assert_eq!(safe.len(), SCALAR_NAMES.len() + 1);
        assert!(!safe.contains(&universe.object()));
    }

    #[test]
    fn test_build_and_lookup_type() {
        let universe = TypeUniverse::new();
        let point = universe
            .build_type()
            .namespace("demo")
            .name("Point")
            .flavor(TypeFlavor::Class)
            .insert()
            .unwrap();

        let descriptor = universe.get(point).unwrap();
        assert_eq!(descriptor.full_name(), "demo.Point");
        assert_eq!(descriptor.supertype, Some(universe.object()));
        assert_eq!(
            universe.get_by_fullname("demo.Point").unwrap().handle,
            point
        );
    }

    #[test]
    fn test_duplicate_full_name_rejected() {
        let universe = TypeUniverse::new();
        universe
            .build_type()
            .namespace("demo")
            .name("Point")
            .insert()
            .unwrap();

        let duplicate = universe.build_type().namespace("demo").name("Point").insert();
        assert!(matches!(duplicate, Err(Error::TypeInsert(_))));
    }

    #[test]
    fn test_unknown_supertype_rejected() {
        let universe = TypeUniverse::new();
        let result = universe
            .build_type()
            .name("Orphan")
            .supertype(TypeHandle::new(0xDEAD))
            .insert();
        assert!(matches!(result, Err(Error::TypeNotFound(_))));
    }

    #[test]
    fn test_array_interning() {
        let universe = TypeUniverse::new();
        let i32_ty = universe.get_by_fullname("core.I32").unwrap().handle;

        let first = universe.array_of(i32_ty).unwrap();
        let second = universe.array_of(i32_ty).unwrap();
        assert_eq!(first, second);

        let descriptor = universe.get(first).unwrap();
        assert_eq!(descriptor.name.as_ref(), "I32[]");
        assert_eq!(descriptor.flavor, TypeFlavor::Array { element: i32_ty });
    }

    #[test]
    fn test_array_of_unknown_element_rejected() {
        let universe = TypeUniverse::new();
        assert!(matches!(
            universe.array_of(TypeHandle::new(0xBEEF)),
            Err(Error::TypeNotFound(_))
        ));
    }

    #[test]
    fn test_add_field_snapshots() {
        let universe = TypeUniverse::new();
        let i32_ty = universe.get_by_fullname("core.I32").unwrap().handle;
        let point = universe.build_type().namespace("demo").name("Point").insert().unwrap();

        universe
            .add_field(point, "x", i32_ty, FieldModifiers::FINAL)
            .unwrap();
        universe
            .add_field(point, "y", i32_ty, FieldModifiers::empty())
            .unwrap();

        let descriptor = universe.get(point).unwrap();
        assert_eq!(descriptor.fields.count(), 2);
        let (_, first) = descriptor.fields.iter().next().unwrap();
        assert_eq!(first.name.as_ref(), "x");
        assert!(first.is_final());
        assert_eq!(first.declaring_type, point);
    }

    #[test]
    fn test_self_referential_field_declarable() {
        // A linked-node `next` pointer: the field's type is its declaring
        // type, which only works because fields append after registration.
        let universe = TypeUniverse::new();
        let node = universe.build_type().namespace("demo").name("Node").insert().unwrap();
        universe
            .add_field(node, "next", node, FieldModifiers::FINAL)
            .unwrap();

        let descriptor = universe.get(node).unwrap();
        let (_, next) = descriptor.fields.iter().next().unwrap();
        assert_eq!(next.declared_type, node);
    }

    #[test]
    fn test_add_field_unknown_declared_type_rejected() {
        let universe = TypeUniverse::new();
        let point = universe.build_type().name("Point").insert().unwrap();
        let result = universe.add_field(
            point,
            "broken",
            TypeHandle::new(0xF00D),
            FieldModifiers::FINAL,
        );
        assert!(matches!(result, Err(Error::TypeNotFound(_))));
    }
}
