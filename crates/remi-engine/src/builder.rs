//! Registration building
//!
//! Turns raw [`PluginDescriptor`]s into canonical [`Registration`]s. Every
//! descriptor shape is resolved here, once, so nothing downstream inspects
//! descriptor shapes again.

use remi_core::{merge_options, Options};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use crate::error::{RemiError, Result};
use crate::plugin::{PluginBody, PluginDescriptor};

/// A plugin ready for ordering and execution
#[derive(Debug, Clone)]
pub struct Registration {
    /// Unique plugin name
    pub name: String,

    /// Plugin version, if declared
    pub version: Option<String>,

    /// The plugin's own options with shared options merged over them
    pub options: Options,

    /// Plugins that must complete first
    pub dependencies: BTreeSet<String>,

    /// Plugins that must wait for this one
    pub before: BTreeSet<String>,

    /// Initialization routine
    pub body: PluginBody,
}

impl Registration {
    /// Build a registration from the descriptor at `index` of a batch.
    ///
    /// Shared options win over the plugin's own options on key clashes.
    pub fn build(index: usize, descriptor: PluginDescriptor, shared: &Options) -> Result<Self> {
        let (plugin, own_options) = descriptor.into_parts();
        let plugin = plugin.ok_or_else(|| RemiError::missing_register_method(index))?;
        let attributes = plugin.attributes;

        let name = attributes
            .resolved_name()
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .ok_or_else(|| RemiError::missing_name(index))?;
        let version = attributes.resolved_version().map(str::to_string);

        Ok(Self {
            name,
            version,
            options: merge_options(&own_options, shared),
            dependencies: attributes.dependencies.into_iter().collect(),
            before: attributes.before.into_iter().collect(),
            body: plugin.body,
        })
    }
}

/// Build every descriptor of a batch.
///
/// A name submitted more than once keeps its first occurrence; later ones
/// are dropped. Core plugins are placed in front of user plugins, so a
/// core plugin also submitted by the caller runs once, as the core copy.
pub fn build_batch(descriptors: Vec<PluginDescriptor>, shared: &Options) -> Result<Vec<Registration>> {
    let mut seen = HashSet::new();
    let mut batch = Vec::with_capacity(descriptors.len());

    for (index, descriptor) in descriptors.into_iter().enumerate() {
        let registration = Registration::build(index, descriptor, shared)?;
        if !seen.insert(registration.name.clone()) {
            debug!(plugin = %registration.name, "Dropping duplicate plugin in batch");
            continue;
        }
        batch.push(registration);
    }

    Ok(batch)
}
