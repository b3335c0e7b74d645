//! Settings persistence
//!
//! A small key-value settings file under the user config directory keeps
//! the last saved board server address across runs. Callers treat store
//! failures as log-and-continue; in-memory state stays authoritative for
//! the rest of the session.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::SettingsError;

/// Key the saved server address is stored under
pub const SERVER_ADDRESS_KEY: &str = "server_address";

/// Key-value store for console settings
pub trait SettingsStore {
    /// Look up a stored value
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;

    /// Store a value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
}

/// TOML-file-backed settings store
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    /// Default settings file location under the user config directory
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("carolink")
            .join("settings.toml")
    }

    /// Store at the default location
    pub fn new() -> Self {
        Self {
            path: Self::default_path(),
        }
    }

    /// Store at a specific file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SettingsError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl Default for FileSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value.to_string());
        let content = toml::to_string_pretty(&all)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// In-memory settings store, for ephemeral runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: BTreeMap<String, String>,
}

impl MemorySettings {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry
    pub fn with(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_settings_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut store = FileSettings::at(&path);

        assert_eq!(store.get(SERVER_ADDRESS_KEY).unwrap(), None);

        store.set(SERVER_ADDRESS_KEY, "192.168.1.20:8765").unwrap();
        assert_eq!(
            store.get(SERVER_ADDRESS_KEY).unwrap(),
            Some("192.168.1.20:8765".to_string())
        );

        // A fresh handle on the same file sees the value
        let store = FileSettings::at(&path);
        assert_eq!(
            store.get(SERVER_ADDRESS_KEY).unwrap(),
            Some("192.168.1.20:8765".to_string())
        );
    }

    #[test]
    fn test_file_settings_overwrites_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSettings::at(dir.path().join("settings.toml"));

        store.set(SERVER_ADDRESS_KEY, "old:8765").unwrap();
        store.set(SERVER_ADDRESS_KEY, "new:8765").unwrap();
        assert_eq!(
            store.get(SERVER_ADDRESS_KEY).unwrap(),
            Some("new:8765".to_string())
        );
    }

    #[test]
    fn test_file_settings_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSettings::at(dir.path().join("nested").join("settings.toml"));
        store.set(SERVER_ADDRESS_KEY, "host:8765").unwrap();
        assert!(store.get(SERVER_ADDRESS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_memory_settings() {
        let mut store = MemorySettings::new();
        assert_eq!(store.get("missing").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
    }
}
