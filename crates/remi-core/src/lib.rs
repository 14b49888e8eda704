//! # remi-core
//!
//! Core library for remi providing:
//! - Plugin attribute types (name, version, package metadata, ordering constraints)
//! - Plugin option maps and the shallow merge used to build them
//! - Engine configuration loading (remi.yaml) with environment overrides

pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, EngineConfigFile, DEFAULT_REGISTRATION_TIMEOUT};
pub use error::{Error, Result};
pub use types::{merge_options, options_from_value, Options, PackageInfo, PluginAttributes};
