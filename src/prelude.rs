//! # immutascope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! and traits from the immutascope library. Import this module to get quick
//! access to everything needed for declaring a type model and validating it.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all immutascope operations
pub use crate::Error;

/// The result type used throughout immutascope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The validation facade
pub use crate::ImmutabilityValidator;

/// Construction-time configuration
pub use crate::validation::{CyclePolicy, ValidatorOptions};

// ================================================================================================
// Type Model
// ================================================================================================

/// Type identity, descriptors, and the descriptor source seam
pub use crate::model::{
    DescriptorSource, FieldDescriptor, FieldModifiers, GenericArg, TypeBuilder, TypeDescriptor,
    TypeFlavor, TypeHandle, TypeUniverse,
};

// ================================================================================================
// Violation Model
// ================================================================================================

/// Frozen validation results and their findings
pub use crate::validation::{ValidationError, ValidationResult, ViolationKind};
