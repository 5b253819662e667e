//! Validator configuration.
//!
//! All configuration is applied at construction and immutable afterwards.
//! Two behaviors are policy choices: whether
//! array-typed fields are always flagged ([`ValidatorOptions::strict_arrays`])
//! and how a container element type that is still being expanded on the
//! current chain is judged ([`CyclePolicy`]).

use crate::model::TypeHandle;

/// How the walker judges a container element type that is in-flight on the
/// current validation chain (a cycle through the element position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Treat the in-progress type as valid for this path. A cycle re-enters a
    /// type already being expanded at an outer frame, so expanding it again
    /// adds no new findings.
    #[default]
    AssumeSafe,
    /// Count findings already recorded for the in-progress type on this chain
    /// as an invalid nested result, flagging the container element.
    UsePartialFindings,
}

/// Configuration for an [`ImmutabilityValidator`](crate::ImmutabilityValidator).
///
/// The default is the strictest configuration. [`ValidatorOptions::lenient`]
/// relaxes array handling for callers that manage arrays defensively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Flag every array-typed field as `MutableArray`. Arrays are mutable at
    /// the element-assignment level regardless of element type; disabling
    /// this trades strictness for usability.
    pub strict_arrays: bool,
    /// Additional types to treat as inherently immutable, unioned with the
    /// source's builtin safe set. Extensions never replace the defaults.
    pub extra_safe_types: Vec<TypeHandle>,
    /// Judgment for in-flight container element types.
    pub cycle_policy: CyclePolicy,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        ValidatorOptions {
            strict_arrays: true,
            extra_safe_types: Vec::new(),
            cycle_policy: CyclePolicy::AssumeSafe,
        }
    }
}

impl ValidatorOptions {
    /// Strict configuration (same as `Default`): arrays always flagged.
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Lenient configuration: array-typed fields pass, everything else as
    /// strict.
    #[must_use]
    pub fn lenient() -> Self {
        ValidatorOptions {
            strict_arrays: false,
            ..Self::default()
        }
    }

    /// Sets the strict-array toggle.
    #[must_use]
    pub fn with_strict_arrays(mut self, strict_arrays: bool) -> Self {
        self.strict_arrays = strict_arrays;
        self
    }

    /// Adds extra safe types, unioned with the builtin safe set.
    #[must_use]
    pub fn with_extra_safe_types(mut self, types: impl IntoIterator<Item = TypeHandle>) -> Self {
        self.extra_safe_types.extend(types);
        self
    }

    /// Sets the in-flight cycle policy.
    #[must_use]
    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }
}
