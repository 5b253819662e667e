use std::sync::Arc;

use dashmap::DashMap;

use crate::{model::TypeHandle, validation::ValidationResult};

/// Concurrent memo of per-type validation results.
///
/// Each distinct type is walked at most a bounded number of times: readers
/// probe first, a miss computes outside any lock, and the computed result is
/// published with insert-if-absent. Two threads racing on an uncached type
/// may both compute, but the first fully-formed result inserted wins and
/// every caller observes the same `Arc`. Entries are never partial and never
/// evicted; the type graph is assumed static for the process lifetime.
#[derive(Debug, Default)]
pub struct ValidationCache {
    results: DashMap<TypeHandle, Arc<ValidationResult>>,
}

impl ValidationCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        ValidationCache {
            results: DashMap::new(),
        }
    }

    /// Returns the cached result for `ty`, if present.
    #[must_use]
    pub fn get(&self, ty: TypeHandle) -> Option<Arc<ValidationResult>> {
        let hit = self.results.get(&ty).map(|entry| entry.value().clone());
        if hit.is_some() {
            tracing::trace!(target: "immutascope", "validation cache hit for {ty}");
        }
        hit
    }

    /// Publishes `result` for `ty` unless another thread got there first;
    /// returns whichever result is cached afterwards.
    #[must_use]
    pub fn insert_if_absent(
        &self,
        ty: TypeHandle,
        result: Arc<ValidationResult>,
    ) -> Arc<ValidationResult> {
        self.results.entry(ty).or_insert(result).value().clone()
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no results are cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
