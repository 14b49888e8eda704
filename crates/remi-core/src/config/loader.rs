//! Configuration file loading and parsing

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Options;

/// Configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["remi.yaml", "remi.yml"];

/// Environment variable overriding the main plugin name
const ENV_MAIN: &str = "REMI_MAIN";

/// Environment variable overriding the per-plugin deadline, in milliseconds
const ENV_REGISTRATION_TIMEOUT_MS: &str = "REMI_REGISTRATION_TIMEOUT_MS";

/// Per-plugin deadline used when nothing else is configured
pub const DEFAULT_REGISTRATION_TIMEOUT: Duration = Duration::from_secs(10);

/// On-disk engine configuration (remi.yaml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfigFile {
    /// Plugin forced to run before every other plugin
    pub main: Option<String>,

    /// Per-plugin deadline in milliseconds; 0 disables the deadline
    pub registration_timeout_ms: Option<u64>,

    /// Options merged over every plugin's own options
    pub shared_options: Options,

    /// Per-extension options, keyed by extension name
    pub extensions: Options,
}

/// Loaded engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// The parsed configuration
    pub config: EngineConfigFile,

    /// Path to the configuration file, if one was read
    pub config_path: Option<Utf8PathBuf>,
}

impl EngineConfig {
    /// Load configuration from the specified path or search for it.
    ///
    /// Without an explicit path a missing file is not an error: the
    /// defaults are used instead.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let found = match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        Error::config_not_found(p.as_str())
                    } else {
                        Error::Io(e)
                    }
                })?;
                Some((p.to_owned(), content))
            }
            None => Self::find_config()?,
        };

        let Some((config_path, content)) = found else {
            debug!("No remi.yaml found, using default engine configuration");
            return Ok(Self::default());
        };

        let config = Self::parse(&content)?;
        debug!("Loaded engine configuration from {}", config_path);

        Ok(Self {
            config,
            config_path: Some(config_path),
        })
    }

    /// Parse configuration from YAML text
    pub fn parse(content: &str) -> Result<EngineConfigFile> {
        if content.trim().is_empty() {
            return Ok(EngineConfigFile::default());
        }
        let config: EngineConfigFile = serde_yaml_ng::from_str(content)?;
        if let Some(main) = &config.main {
            if main.trim().is_empty() {
                return Err(Error::invalid_config("main plugin name cannot be empty"));
            }
        }
        Ok(config)
    }

    /// Apply `REMI_MAIN` / `REMI_REGISTRATION_TIMEOUT_MS` overrides
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(main) = std::env::var(ENV_MAIN) {
            if !main.is_empty() {
                self.config.main = Some(main);
            }
        }

        if let Ok(raw) = std::env::var(ENV_REGISTRATION_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| {
                Error::invalid_config(format!(
                    "{} must be a whole number of milliseconds, got '{}'",
                    ENV_REGISTRATION_TIMEOUT_MS, raw
                ))
            })?;
            self.config.registration_timeout_ms = Some(ms);
        }

        Ok(self)
    }

    /// Configured main plugin, if any
    pub fn main(&self) -> Option<&str> {
        self.config.main.as_deref()
    }

    /// Per-plugin deadline. `Duration::ZERO` means no deadline.
    pub fn registration_timeout(&self) -> Duration {
        self.config
            .registration_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REGISTRATION_TIMEOUT)
    }

    /// Options configured for the named extension
    pub fn extension_options(&self, name: &str) -> Options {
        match self.config.extensions.get(name) {
            Some(serde_json::Value::Object(map)) => map.clone(),
            _ => Options::new(),
        }
    }

    /// Find configuration file in current directory or parent directories
    fn find_config() -> Result<Option<(Utf8PathBuf, String)>> {
        let cwd = std::env::current_dir().map_err(Error::Io)?;
        let cwd = Utf8PathBuf::try_from(cwd)
            .map_err(|_| Error::invalid_config("Current directory path is not valid UTF-8"))?;

        let mut current = cwd.as_path();

        loop {
            for name in CONFIG_FILE_NAMES {
                let path = current.join(name);
                if path.exists() {
                    let content = fs::read_to_string(&path)?;
                    return Ok(Some((path, content)));
                }
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
    }
}
