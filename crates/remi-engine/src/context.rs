//! Per-plugin scoped context

use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::target::{Props, Target};

/// Typed values interceptors attach to a plugin context
#[derive(Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Extensions {
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|prev| prev.downcast::<T>().ok().map(|b| *b))
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut::<T>())
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.map.len())
            .finish()
    }
}

/// Context handed to a single plugin.
///
/// Holds a copy of the target's root properties taken right before the
/// plugin runs. Writes through [`PluginContext::set`] stay local to this
/// plugin; writes through [`PluginContext::root`] are seen by every plugin
/// that runs afterwards.
#[derive(Debug)]
pub struct PluginContext {
    root: Target,
    plugin: String,
    props: Props,
    extensions: Extensions,
}

impl PluginContext {
    pub(crate) fn new(root: &Target, plugin: &str) -> Self {
        Self {
            root: root.clone(),
            plugin: plugin.to_string(),
            props: root.props(),
            extensions: Extensions::default(),
        }
    }

    /// The shared target
    pub fn root(&self) -> &Target {
        &self.root
    }

    /// Name of the plugin this context belongs to
    pub fn plugin_name(&self) -> &str {
        &self.plugin
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Set a property on this context only
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.props.insert(key.into(), value.into())
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut Props {
        &mut self.props
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Shorthand for `extensions().get::<T>()`
    pub fn extension<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    /// Shorthand for `extensions_mut().insert(value)`
    pub fn insert_extension<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.extensions.insert(value)
    }
}
