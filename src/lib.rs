// Copyright 2026 the immutascope contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # immutascope
//!
//! A runtime validator that inspects a declared type's structure and decides
//! whether every value reachable through its transitive field graph is
//! provably immutable. It is meant for library and API authors who want to
//! assert, once at startup or construction time, that a message/value type
//! cannot be mutated after creation, without relying on manual code review.
//!
//! ## Features
//!
//! - **Graph-walking engine** - recursive traversal of the field graph and
//!   inheritance chain, with guaranteed termination on cyclic type graphs
//! - **Structured findings** - every violation is reported as data; one pass
//!   collects everything discoverable, deduplicated and in deterministic order
//! - **Memoized and concurrent** - each distinct type is walked at most once
//!   process-wide; the result cache is safe under concurrent callers
//! - **Extensible safe-type registry** - scalars, text, and the
//!   immutable-container family are built in; callers add their own immutable
//!   value types, whitelisted by assignability
//! - **Injected metadata** - the engine sees types only through the
//!   [`model::DescriptorSource`] seam; [`model::TypeUniverse`] is the built-in
//!   thread-safe implementation
//!
//! ## Quick Start
//!
//! ```rust
//! use immutascope::prelude::*;
//! use std::sync::Arc;
//!
//! // Declare the type model.
//! let universe = Arc::new(TypeUniverse::new());
//! let i32_ty = universe.get_by_fullname("core.I32").unwrap().handle;
//!
//! let point = universe
//!     .build_type()
//!     .namespace("demo")
//!     .name("Point")
//!     .insert()?;
//! universe.add_field(point, "x", i32_ty, FieldModifiers::FINAL)?;
//! universe.add_field(point, "y", i32_ty, FieldModifiers::empty())?;
//!
//! // Validate it.
//! let validator = ImmutabilityValidator::new(universe);
//! let result = validator.validate(point)?;
//!
//! assert!(!result.is_valid());
//! assert_eq!(result.to_string(), "demo.Point.y : NonFinalField");
//! # Ok::<(), immutascope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `immutascope` is organized into two modules:
//!
//! - [`model`] - type identity ([`model::TypeHandle`]), read-only metadata
//!   snapshots, and the [`model::TypeUniverse`] registry
//! - [`validation`] - the walking engine, the violation model, the safe-type
//!   registry, the result cache, and the [`ImmutabilityValidator`] facade
//!
//! ## Error Handling
//!
//! Structural findings are never errors: [`ImmutabilityValidator::validate`]
//! returns a [`validation::ValidationResult`] whether or not the type is
//! immutable. [`Error`] is reserved for caller contract violations (unknown
//! handles, colliding registrations) and for the throwing
//! [`ImmutabilityValidator::verify`] entry point, which carries the complete
//! result inside [`Error::ImmutabilityViolation`].
//!
//! ## Concurrency
//!
//! The validator spawns no threads and suspends on nothing; validation is a
//! synchronous, possibly-recursive pure computation over metadata. The only
//! shared mutable state is the result cache, which computes outside any lock
//! and publishes with insert-if-absent. A single validator instance can be
//! shared freely across threads, and [`ImmutabilityValidator::validate_all`]
//! fans batch validation out over a thread pool.

pub(crate) mod error;


/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use immutascope::prelude::*;
/// use std::sync::Arc;
///
/// let universe = Arc::new(TypeUniverse::new());
/// let validator = ImmutabilityValidator::new(universe);
/// ```
pub mod prelude;

/// Type model: handles, descriptors, and the injected descriptor source.
///
/// Everything the validation engine knows about a type flows through
/// [`model::DescriptorSource`]. The built-in [`model::TypeUniverse`] is a
/// thread-safe registry of descriptor snapshots that embedders populate
/// directly; alternative metadata backends implement the trait.
pub mod model;

/// The immutability validation engine.
///
/// Contains the [`validation::ImmutabilityValidator`] facade, the frozen
/// violation model ([`validation::ValidationResult`],
/// [`validation::ValidationError`], [`validation::ViolationKind`]), the
/// assignability-aware [`validation::SafeTypeRegistry`], the concurrent
/// [`validation::ValidationCache`], and construction-time configuration.
pub mod validation;

/// `immutascope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`]. Used consistently throughout the crate for all fallible
/// operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `immutascope` Error type
///
/// Covers the two caller-visible error classes: precondition violations
/// (unknown handles, colliding registrations) and verification failures
/// raised by the throwing entry points.
pub use error::Error;

/// Main entry point for validating type graphs.
///
/// See [`validation::ImmutabilityValidator`] for construction, configuration,
/// and the `validate`/`verify` entry points.
pub use validation::ImmutabilityValidator;
