//! Shared registration target
//!
//! A [`Target`] is the object plugins are registered onto. It owns the
//! registry of completed plugins and the root property bag that every
//! plugin's scoped context is copied from. Clones share the same state.

use serde_json::{Map, Value};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{Mutex, MutexGuard};

use crate::builder::Registration;
use crate::registry::Registry;

/// Root property bag
pub type Props = Map<String, Value>;

/// Root property holding one public namespace per plugin
pub const PLUGINS_KEY: &str = "plugins";

/// Cheaply clonable handle to a registration target
#[derive(Clone, Default)]
pub struct Target {
    inner: Arc<TargetInner>,
}

#[derive(Default)]
struct TargetInner {
    registry: RwLock<Registry>,
    props: RwLock<Props>,
    /// Held for the whole of one `register` call
    sequence: Mutex<()>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Object stored under `key`, replacing any non-object value
fn object_entry<'a>(map: &'a mut Props, key: &str) -> &'a mut Props {
    let slot = map
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(object) => object,
        _ => unreachable!("slot was just set to an object"),
    }
}

impl Target {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target whose root starts with the given properties
    pub fn with_props(props: Props) -> Self {
        let target = Self::new();
        *write(&target.inner.props) = props;
        target
    }

    /// Read a root property
    pub fn get(&self, key: &str) -> Option<Value> {
        read(&self.inner.props).get(key).cloned()
    }

    /// Set a root property, visible to every plugin context created afterwards
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        write(&self.inner.props).insert(key.into(), value.into())
    }

    /// Snapshot of the root properties
    pub fn props(&self) -> Props {
        read(&self.inner.props).clone()
    }

    /// Mutate the root properties under a single write lock
    pub fn update_props<R>(&self, f: impl FnOnce(&mut Props) -> R) -> R {
        f(&mut write(&self.inner.props))
    }

    /// Whether a plugin with this name completed registration
    pub fn is_registered(&self, name: &str) -> bool {
        read(&self.inner.registry).contains(name)
    }

    /// Completed registration by name
    pub fn registration(&self, name: &str) -> Option<Arc<Registration>> {
        read(&self.inner.registry).get(name).cloned()
    }

    /// Snapshot of the registry
    pub fn registry(&self) -> Registry {
        read(&self.inner.registry).clone()
    }

    /// Names of completed plugins, in completion order
    pub fn registered_names(&self) -> Vec<String> {
        read(&self.inner.registry)
            .names()
            .map(str::to_string)
            .collect()
    }

    /// Whether both handles point at the same target
    pub fn ptr_eq(&self, other: &Target) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Public namespace of a plugin, `plugins.<name>`
    pub fn plugin_namespace(&self, name: &str) -> Option<Value> {
        read(&self.inner.props)
            .get(PLUGINS_KEY)
            .and_then(|plugins| plugins.get(name))
            .cloned()
    }

    /// Mutate `plugins.<name>`, creating it as an empty object when absent
    pub fn update_plugin_namespace<R>(&self, name: &str, f: impl FnOnce(&mut Props) -> R) -> R {
        let mut props = write(&self.inner.props);
        let plugins = object_entry(&mut props, PLUGINS_KEY);
        f(object_entry(plugins, name))
    }

    pub(crate) fn record(&self, registration: Arc<Registration>) -> bool {
        write(&self.inner.registry).insert(registration)
    }

    pub(crate) async fn lock_sequence(&self) -> MutexGuard<'_, ()> {
        self.inner.sequence.lock().await
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("registered", &self.registered_names())
            .field("props", &self.props())
            .finish()
    }
}
