//! Type definitions shared across remi crates

mod plugin_types;

pub use plugin_types::*;
