//! Error types for plugin resolution and registration

use std::time::Duration;
use thiserror::Error;

/// Result type alias using remi-engine's Error type
pub type Result<T> = std::result::Result<T, RemiError>;

/// Errors surfaced by [`crate::Remi::register`]
///
/// Everything up to and including `MainPluginHasDependencies` is raised
/// before any plugin body runs. `RegistrationFailure` and
/// `RegistrationTimeout` stop the sequence at the failing plugin.
#[derive(Error, Debug)]
pub enum RemiError {
    /// Descriptor carries neither a plugin nor a nested `register`
    #[error("Plugin missing a register method (descriptor #{index})")]
    MissingRegisterMethod { index: usize },

    /// Neither `name` nor `pkg.name` was set
    #[error("Plugin has no name (descriptor #{index}): set `name` or `pkg.name`")]
    MissingName { index: usize },

    /// Dependency found neither in the batch nor in the registry
    #[error("Plugin called {name} required by {required_by} but wasn't registered")]
    UnknownDependency { name: String, required_by: String },

    /// `before` names a plugin that is not part of the batch
    #[error("Plugin {declared_by} must run before {target}, but {target} is not part of this registration")]
    UnknownBeforeTarget { target: String, declared_by: String },

    /// Dependency cycle among the submitted plugins
    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// Configured main plugin was not submitted and is not registered
    #[error("main plugin called `{name}` is missing")]
    MainPluginMissing { name: String },

    /// Configured main plugin declares dependencies
    #[error("main plugin `{name}` cannot have dependencies (declares: {})", .dependencies.join(", "))]
    MainPluginHasDependencies {
        name: String,
        dependencies: Vec<String>,
    },

    /// A plugin body (or one of its interceptors) reported an error
    #[error("Failed to register {name}. {source}")]
    RegistrationFailure {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// A plugin did not signal completion within the deadline
    #[error("Failed to register {name}. Plugin did not complete within {}ms", .timeout.as_millis())]
    RegistrationTimeout { name: String, timeout: Duration },
}

impl RemiError {
    pub fn missing_register_method(index: usize) -> Self {
        Self::MissingRegisterMethod { index }
    }

    pub fn missing_name(index: usize) -> Self {
        Self::MissingName { index }
    }

    pub fn unknown_dependency(name: impl Into<String>, required_by: impl Into<String>) -> Self {
        Self::UnknownDependency {
            name: name.into(),
            required_by: required_by.into(),
        }
    }

    pub fn unknown_before_target(target: impl Into<String>, declared_by: impl Into<String>) -> Self {
        Self::UnknownBeforeTarget {
            target: target.into(),
            declared_by: declared_by.into(),
        }
    }

    pub fn cyclic_dependency(cycle: Vec<String>) -> Self {
        Self::CyclicDependency { cycle }
    }

    pub fn main_plugin_missing(name: impl Into<String>) -> Self {
        Self::MainPluginMissing { name: name.into() }
    }

    pub fn main_plugin_has_dependencies(name: impl Into<String>, dependencies: Vec<String>) -> Self {
        Self::MainPluginHasDependencies {
            name: name.into(),
            dependencies,
        }
    }

    pub fn registration_failure(name: impl Into<String>, source: anyhow::Error) -> Self {
        Self::RegistrationFailure {
            name: name.into(),
            source,
        }
    }

    pub fn registration_timeout(name: impl Into<String>, timeout: Duration) -> Self {
        Self::RegistrationTimeout {
            name: name.into(),
            timeout,
        }
    }

    /// True for errors raised before any plugin ran
    pub fn is_resolution_error(&self) -> bool {
        !matches!(
            self,
            Self::RegistrationFailure { .. } | Self::RegistrationTimeout { .. }
        )
    }

    /// Name of the plugin whose execution failed, for execution errors
    pub fn plugin_name(&self) -> Option<&str> {
        match self {
            Self::RegistrationFailure { name, .. } | Self::RegistrationTimeout { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// The error the plugin itself reported, for `RegistrationFailure`
    pub fn internal_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::RegistrationFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}
