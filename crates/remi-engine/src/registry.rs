//! Record of plugins that completed registration on a target

use std::collections::HashMap;
use std::sync::Arc;

use crate::builder::Registration;

/// Append-only registry of completed plugins, in completion order
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<Arc<Registration>>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed plugin.
    ///
    /// Returns `false` and leaves the registry untouched when the name is
    /// already present.
    pub fn insert(&mut self, registration: Arc<Registration>) -> bool {
        if self.by_name.contains_key(&registration.name) {
            return false;
        }
        self.by_name
            .insert(registration.name.clone(), self.entries.len());
        self.entries.push(registration);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Registration>> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Registration>> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
