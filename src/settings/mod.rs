//! Local key-value settings.
//!
//! Holds state that belongs to this client rather than to the persistence
//! backend: the cached keybinding override table and the current-document
//! pointer. Values are plain strings; callers decide their encoding.

pub mod error;

pub use error::SettingsError;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings key holding the last selected document name.
pub const CURRENT_DOCUMENT_KEY: &str = "current_document";

/// Value stored under [`CURRENT_DOCUMENT_KEY`] when no document is selected.
pub const NO_DOCUMENT: &str = "None";

/// String key-value store for client-local state.
pub trait SettingsStore {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the value cannot be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;

    /// Delete a value, if present.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the change cannot be persisted.
    fn remove(&mut self, key: &str) -> Result<(), SettingsError>;
}

/// In-memory settings, lost on drop.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: BTreeMap<String, String>,
}

impl MemorySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by fixtures to pre-populate a key.
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Settings persisted as a flat JSON object in a single file.
///
/// The whole file is rewritten on every change.
#[derive(Debug)]
pub struct JsonFileSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileSettings {
    /// Open the settings file at `path`, starting empty if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if an existing file cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    /// Default location: `<data_local_dir>/pagewriter/settings.json`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::PathError` if the data directory is unknown.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let data_dir = dirs::data_local_dir().ok_or_else(|| {
            SettingsError::PathError("Could not determine data directory".to_string())
        })?;
        Ok(data_dir.join("pagewriter").join("settings.json"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Read the current-document pointer; the literal `"None"` and a missing key
/// both mean no document.
#[must_use]
pub fn current_document(settings: &impl SettingsStore) -> Option<String> {
    settings
        .get(CURRENT_DOCUMENT_KEY)
        .filter(|name| name != NO_DOCUMENT)
}

/// Persist the current-document pointer.
///
/// # Errors
///
/// Returns `SettingsError` if the store cannot be written.
pub fn set_current_document(
    settings: &mut impl SettingsStore,
    name: Option<&str>,
) -> Result<(), SettingsError> {
    settings.set(CURRENT_DOCUMENT_KEY, name.unwrap_or(NO_DOCUMENT))
}
