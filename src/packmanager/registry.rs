//! Package manager registry.
//!
//! The registry is built once at startup, then frozen behind an `Arc` and
//! handed to the umbrella. Registration needs `&mut self`, so nothing can be
//! registered once readers exist.
//!
//! Entries are kept in key order. Every fan-out over the registry therefore
//! visits package managers in the same, deterministic order.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::packmanager::errors::PackManagerError;
use crate::packmanager::manager::{ContextKey, PackageManager};

/// Keyed collection of package managers.
#[derive(Default)]
pub struct ManagerRegistry {
    managers: BTreeMap<ContextKey, Arc<dyn PackageManager>>,
}

impl ManagerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        ManagerRegistry {
            managers: BTreeMap::new(),
        }
    }

    /// Register a package manager under `key`.
    ///
    /// Fails without touching the registry if `key` is already taken.
    pub fn register(
        &mut self,
        key: impl Into<ContextKey>,
        manager: Arc<dyn PackageManager>,
    ) -> Result<(), PackManagerError> {
        let key = key.into();
        if self.managers.contains_key(&key) {
            return Err(PackManagerError::AlreadyRegistered {
                key,
                format: manager.format().to_string(),
            });
        }

        tracing::debug!("Registered {} package manager under `{}`", manager.format(), key);
        self.managers.insert(key, manager);
        Ok(())
    }

    /// Current contents, in key order.
    pub fn snapshot(&self) -> Vec<(ContextKey, Arc<dyn PackageManager>)> {
        self.managers
            .iter()
            .map(|(key, manager)| (key.clone(), Arc::clone(manager)))
            .collect()
    }

    /// Look up a package manager by key.
    pub fn get(&self, key: &ContextKey) -> Option<Arc<dyn PackageManager>> {
        self.managers.get(key).cloned()
    }

    /// Check if a key is registered.
    pub fn contains(&self, key: &ContextKey) -> bool {
        self.managers.contains_key(key)
    }

    /// All registered keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &ContextKey> + '_ {
        self.managers.keys()
    }

    /// Get the number of registered package managers.
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

impl std::fmt::Debug for ManagerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.managers.iter().map(|(k, m)| (k.as_str(), m.format())))
            .finish()
    }
}
