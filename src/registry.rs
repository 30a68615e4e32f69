// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Registries of live per-resource reconciler state.
//!
//! The operator keeps one registry per resource kind, mapping
//! `namespace/name` keys to the in-memory worker managing that resource.
//! Entries are inserted and removed only from the owning domain's single
//! reconcile loop, so there is never more than one writer; the internal lock
//! exists to serialize diagnostic reads taken from other threads.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::metrics;

/// Registry of live worker instances for one resource kind.
pub struct Registry<T> {
    kind: &'static str,
    entries: RwLock<BTreeMap<String, Arc<T>>>,
}

impl<T> Registry<T> {
    /// Empty registry for the given resource kind.
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Resource kind this registry tracks.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Insert a worker under the given key, replacing any previous entry.
    ///
    /// Returns `true` when the key was not present before.
    pub fn insert(&self, key: impl Into<String>, worker: Arc<T>) -> bool {
        let mut entries = self.entries.write().expect("registry lock poisoned");
        let inserted = entries.insert(key.into(), worker).is_none();
        metrics::set_resources_active(self.kind, entries.len());
        inserted
    }

    /// Remove the worker under the given key.
    ///
    /// Returns `true` when an entry was removed.
    pub fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.write().expect("registry lock poisoned");
        let removed = entries.remove(key).is_some();
        metrics::set_resources_active(self.kind, entries.len());
        removed
    }

    /// Fetch the worker under the given key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entries
            .read()
            .expect("registry lock poisoned")
            .get(key)
            .cloned()
    }

    /// Whether a worker is registered under the given key.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .expect("registry lock poisoned")
            .contains_key(key)
    }

    /// Keys of all registered workers, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .expect("registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Number of registered workers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().expect("registry lock poisoned").len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the canonical `namespace/name` registry key.
#[must_use]
pub fn registry_key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
