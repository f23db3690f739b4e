//! Persistence seam for the alert configuration.
//!
//! The engine never touches the filesystem itself; it talks to a
//! [`SettingsStore`]. Production wires in the TOML file store, tests use
//! the in-memory one.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::config::AlertConfig;
use crate::error::{ConfigError, Result};

/// Synchronous store for the user configuration.
pub trait SettingsStore: Send + Sync {
    /// Previously persisted configuration, if any.
    fn load(&self) -> Result<Option<AlertConfig>, ConfigError>;

    /// Persist the configuration.
    fn store(&self, config: &AlertConfig) -> Result<(), ConfigError>;
}

/// TOML file store, by default at `~/.config/matchbell/config.toml`.
pub struct TomlSettings {
    path: PathBuf,
}

impl TomlSettings {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the standard config location.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(super::data_dir()?.join("config.toml")))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SettingsStore for TomlSettings {
    fn load(&self) -> Result<Option<AlertConfig>, ConfigError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(ConfigError::LoadFailed {
                    path: self.path.clone(),
                    message: err.to_string(),
                })
            }
        };
        let config = toml::from_str(&content).map_err(|err| ConfigError::LoadFailed {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        Ok(Some(config))
    }

    fn store(&self, config: &AlertConfig) -> Result<(), ConfigError> {
        let serialized = toml::to_string_pretty(config).map_err(|err| ConfigError::SaveFailed {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        std::fs::write(&self.path, serialized).map_err(|err| ConfigError::SaveFailed {
            path: self.path.clone(),
            message: err.to_string(),
        })
    }
}

/// In-memory store for tests and embedding hosts with their own persistence.
#[derive(Default)]
pub struct MemorySettings {
    config: Mutex<Option<AlertConfig>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a configuration.
    pub fn seeded(config: AlertConfig) -> Self {
        Self {
            config: Mutex::new(Some(config)),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn load(&self) -> Result<Option<AlertConfig>, ConfigError> {
        Ok(self.config.lock().unwrap().clone())
    }

    fn store(&self, config: &AlertConfig) -> Result<(), ConfigError> {
        *self.config.lock().unwrap() = Some(config.clone());
        Ok(())
    }
}
