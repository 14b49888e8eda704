//! Plugin attribute and option types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Opaque per-plugin options. Always a JSON object.
pub type Options = Map<String, Value>;

/// Package metadata a plugin can fall back on for its name and version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl PackageInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
        }
    }
}

/// Metadata attached to a plugin body
///
/// Explicit `name`/`version` take precedence over the ones in `pkg`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginAttributes {
    /// Unique plugin name
    pub name: Option<String>,

    /// Plugin version
    pub version: Option<String>,

    /// Package metadata used when name or version is not set explicitly
    pub pkg: Option<PackageInfo>,

    /// Plugins that must complete before this one starts
    pub dependencies: Vec<String>,

    /// Plugins that must not start before this one completes
    pub before: Vec<String>,
}

impl PluginAttributes {
    /// Attributes with an explicit name and nothing else
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Attributes resolved entirely from package metadata
    pub fn from_pkg(pkg: PackageInfo) -> Self {
        Self {
            pkg: Some(pkg),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_before(mut self, name: impl Into<String>) -> Self {
        self.before.push(name.into());
        self
    }

    /// `name`, falling back to `pkg.name`
    pub fn resolved_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.pkg.as_ref().and_then(|p| p.name.as_deref()))
    }

    /// `version`, falling back to `pkg.version`
    pub fn resolved_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.pkg.as_ref().and_then(|p| p.version.as_deref()))
    }
}

/// Shallow-merge plugin options with caller-supplied shared options.
///
/// Top-level keys from `shared` overwrite the plugin's own keys.
pub fn merge_options(own: &Options, shared: &Options) -> Options {
    let mut merged = own.clone();
    for (key, value) in shared {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Convert a JSON value into an options map. `null` becomes an empty map.
pub fn options_from_value(value: Value) -> Result<Options> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Options::new()),
        other => Err(Error::invalid_config(format!(
            "plugin options must be an object, got: {}",
            other
        ))),
    }
}
