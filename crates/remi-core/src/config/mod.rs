//! Engine configuration

mod loader;

pub use loader::{EngineConfig, EngineConfigFile, DEFAULT_REGISTRATION_TIMEOUT};
