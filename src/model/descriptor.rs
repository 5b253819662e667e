use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::model::TypeHandle;

/// Structural classification of a declared type.
///
/// The walker never inspects a concrete host type system; it dispatches purely
/// on this flavor, which the descriptor source assigns when a type is
/// registered. The enumeration is closed: every reachable type is exactly one
/// of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    /// The universal base type. A field whose actual type collapses to this
    /// flavor carries no usable structure (an erasure artifact) and is
    /// reported, never expanded.
    Object,
    /// A scalar/primitive value (numerics, bool, char, text). Scalars are
    /// leaves of the field graph.
    Scalar,
    /// An array with the given element type. Arrays are mutable at the
    /// element-assignment level regardless of the element type.
    Array {
        /// The array's component type
        element: TypeHandle,
    },
    /// A collection-like container. Container fields additionally carry
    /// generic element arguments on their [`FieldDescriptor`].
    Collection,
    /// A custom composite type whose declared fields must be inspected
    /// recursively.
    Class,
}

bitflags! {
    /// Declared modifiers of a single field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldModifiers: u8 {
        /// The field belongs to the type, not to instances; static fields are
        /// skipped during validation.
        const STATIC = 0x01;
        /// The field is read-only / assign-once. Fields without this flag are
        /// reported as `NonFinalField`.
        const FINAL = 0x02;
    }
}

/// One generic type argument of a container field.
///
/// Containers either preserve a concrete element type or erase it behind a
/// wildcard bound. Wildcards cannot be recursed into and are reported as
/// `UnresolvableGenericType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericArg {
    /// The argument resolved to a concrete declared type
    Resolved(TypeHandle),
    /// The argument is wildcard-bound and cannot be resolved
    Wildcard,
}

/// A read-only snapshot of one declared field.
///
/// Field descriptors are taken once when the declaring type is registered and
/// never change afterwards.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name as declared
    pub name: Arc<str>,
    /// The field's declared type
    pub declared_type: TypeHandle,
    /// Generic type arguments, in declaration order. Empty for non-generic
    /// fields; meaningful only when the declared type is a container.
    pub generic_args: Vec<GenericArg>,
    /// Declared modifiers
    pub modifiers: FieldModifiers,
    /// The type that declares this field
    pub declaring_type: TypeHandle,
}

impl FieldDescriptor {
    /// Returns true if the field is declared static
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(FieldModifiers::STATIC)
    }

    /// Returns true if the field is declared read-only / assign-once
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.modifiers.contains(FieldModifiers::FINAL)
    }
}

/// A read-only snapshot of one declared type.
///
/// Descriptors combine identity (namespace + name + handle), classification
/// ([`TypeFlavor`]), the inheritance link, the declared interface list (used
/// for safe-type assignability), and the declared field list.
///
/// The field list is an append-only [`boxcar::Vec`], which allows fields to be
/// added after the type itself is registered, which is necessary for declaring
/// self-referential and mutually-referential field graphs, where a field's
/// type handle only exists once both types do.
pub struct TypeDescriptor {
    /// Handle identifying this type
    pub handle: TypeHandle,
    /// Namespace (can be empty)
    pub namespace: Arc<str>,
    /// Simple type name
    pub name: Arc<str>,
    /// Structural classification
    pub flavor: TypeFlavor,
    /// Direct supertype, `None` at the root of the hierarchy
    pub supertype: Option<TypeHandle>,
    /// Interfaces/markers this type declares, for assignability checks
    pub interfaces: Vec<TypeHandle>,
    /// Instance and static fields declared directly on this type
    pub fields: Arc<boxcar::Vec<FieldDescriptor>>,
}

impl TypeDescriptor {
    /// Renders the fully qualified name, `namespace.name`, or just the name
    /// when the namespace is empty.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.to_string()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("handle", &self.handle)
            .field("full_name", &self.full_name())
            .field("flavor", &self.flavor)
            .field("supertype", &self.supertype)
            .field("fields", &self.fields.count())
            .finish()
    }
}
