//! Immutability validation engine.
//!
//! # Key Components
//!
//! - [`ImmutabilityValidator`] - The facade; owns configuration, the
//!   safe-type registry, and the result cache
//! - [`ValidationResult`] / [`ValidationError`] / [`ViolationKind`] - The
//!   frozen violation model returned to callers
//! - [`SafeTypeRegistry`] - Types accepted as inherently immutable, queried
//!   by assignability
//! - [`ValidationCache`] - Concurrent memo guaranteeing each distinct type
//!   is walked at most once per process (bounded races aside)
//! - [`ValidatorOptions`] / [`CyclePolicy`] - Construction-time configuration
//!
//! The traversal itself lives in the private `walker` module; callers only
//! ever see frozen results.

mod cache;
mod config;
mod registry;
mod violation;
mod walker;

#[allow(clippy::module_inception)]
mod validator;

pub use cache::ValidationCache;
pub use config::{CyclePolicy, ValidatorOptions};
pub use registry::SafeTypeRegistry;
pub use validator::ImmutabilityValidator;
pub use violation::{ValidationError, ValidationResult, ViolationKind};

pub(crate) use walker::GraphWalker;
