use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use strum::{Display, EnumIter};

use crate::model::TypeHandle;

/// Separator between a rendered error's location and its kind.
const MSG_SEPARATOR: &str = " : ";

/// Rendering of a result with no findings.
const OK: &str = "OK";

/// The closed set of structural findings the walker can emit.
///
/// Findings are data, not control flow: the walker accumulates them and keeps
/// walking, so one pass reports everything discoverable. The set is fixed and
/// exhaustively matched by consumers; it will not grow behind a non-exhaustive
/// attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ViolationKind {
    /// The field is not declared read-only / assign-once.
    NonFinalField,
    /// The field's declared container type is itself mutable, so even a
    /// final field of this type can have its internal state changed.
    MutableType,
    /// The element type stored in an otherwise immutable container is
    /// mutable, so the container contents can still be changed in place.
    MutableElementInCollection,
    /// Arrays are mutable at the element-assignment level regardless of
    /// element type. Emitted only under strict array mode.
    MutableArray,
    /// A container's generic type argument is wildcard-bound and cannot be
    /// resolved to a concrete type, so immutability cannot be established.
    UnresolvableGenericType,
    /// The field's declared type is erased to the universal base type and the
    /// actual type cannot be recovered. Ambiguity is treated conservatively
    /// as a violation.
    UndeterminedTypeFromErasure,
}

/// One structural finding: a (declaring type, field, kind) triple.
///
/// Equality, ordering and hashing consider only the triple; the rendered type
/// name is carried along for display but is a deterministic function of the
/// handle.
#[derive(Debug, Clone)]
pub struct ValidationError {
    declaring_type: TypeHandle,
    type_name: Arc<str>,
    field_name: Arc<str>,
    kind: ViolationKind,
}

impl ValidationError {
    /// Creates a finding for `field_name` of the type `declaring_type`,
    /// rendered as `type_name`.
    #[must_use]
    pub fn new(
        declaring_type: TypeHandle,
        type_name: Arc<str>,
        field_name: Arc<str>,
        kind: ViolationKind,
    ) -> Self {
        ValidationError {
            declaring_type,
            type_name,
            field_name,
            kind,
        }
    }

    /// The type that declares the offending field.
    #[must_use]
    pub fn declaring_type(&self) -> TypeHandle {
        self.declaring_type
    }

    /// Full name of the declaring type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Name of the offending field.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The violation category.
    #[must_use]
    pub fn kind(&self) -> ViolationKind {
        self.kind
    }
}

impl PartialEq for ValidationError {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type == other.declaring_type
            && self.field_name == other.field_name
            && self.kind == other.kind
    }
}

impl Eq for ValidationError {}

impl Hash for ValidationError {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.declaring_type.hash(state);
        self.field_name.hash(state);
        self.kind.hash(state);
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}{}{}",
            self.type_name, self.field_name, MSG_SEPARATOR, self.kind
        )
    }
}

/// An immutable, insertion-ordered, duplicate-free set of findings.
///
/// A result is frozen when the walk that produced it returns and never
/// changes afterwards; cached results are shared behind [`Arc`]. A type
/// reachable via many paths reports each unique (type, field, kind) triple
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// A result with no findings.
    #[must_use]
    pub fn valid() -> Self {
        ValidationResult { errors: Vec::new() }
    }

    /// Returns true if the validation passed, i.e. no findings exist.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The findings, in the order they were discovered (field-declaration
    /// order, then inheritance-ascending).
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return f.write_str(OK);
        }
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Mutable collector the walker pushes findings into.
///
/// Deduplicates on push and preserves insertion order; frozen into a
/// [`ValidationResult`] once the walk completes.
#[derive(Debug, Default)]
pub(crate) struct ViolationSink {
    errors: Vec<ValidationError>,
}

impl ViolationSink {
    pub(crate) fn new() -> Self {
        ViolationSink { errors: Vec::new() }
    }

    /// Records a finding unless the same triple was already recorded.
    pub(crate) fn record(&mut self, error: ValidationError) {
        if self.errors.contains(&error) {
            return;
        }
        tracing::error!(target: "immutascope", "Immutability violation: {error}");
        self.errors.push(error);
    }

    /// Returns true if any recorded finding is attributed to `declaring`.
    ///
    /// Consulted by the walker when the in-flight cycle policy counts partial
    /// findings of a type still being expanded.
    pub(crate) fn has_findings_for(&self, declaring: TypeHandle) -> bool {
        self.errors
            .iter()
            .any(|error| error.declaring_type() == declaring)
    }

    pub(crate) fn freeze(self) -> ValidationResult {
        ValidationResult {
            errors: self.errors,
        }
    }
}
