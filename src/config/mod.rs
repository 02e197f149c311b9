//! Configuration module for pagewriter
//!
//! Manages application configuration: search tuning, storage locations,
//! logging and the keybinding overrides served to new clients.
//! Configuration is stored in the user's config directory as TOML.
//!
//! ```toml
//! [settings]
//! threshold = 0.4
//! result_limit = 5
//! log_filter = "warn"
//!
//! [keybindings]
//! switch_menu = "Alt+m"
//! ```

use crate::keybinds::{Command, KeybindTable};
use crate::search::{DEFAULT_LIMIT, DEFAULT_THRESHOLD};
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "pagewriter";

/// `[settings]` table
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GeneralSettings {
    /// Fuzzy cutoff; a document name must score at or below this
    pub threshold: f64,

    /// Maximum number of picker results
    pub result_limit: usize,

    /// Database directory (defaults to the data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Export directory (defaults to the data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            result_limit: DEFAULT_LIMIT,
            database: None,
            export_dir: None,
            log_filter: "warn".to_string(),
        }
    }
}

/// `[keybindings]` table: optional chord per command
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct KeybindingsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_menu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_document_picker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marked_document_picker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_document_picker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_current_document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_selected_snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_selected_snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_selected_snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_picker: Option<String>,
}

impl KeybindingsConfig {
    const fn chord(&self, command: Command) -> Option<&String> {
        match command {
            Command::SubmitSnippet => self.submit_snippet.as_ref(),
            Command::SwitchMenu => self.switch_menu.as_ref(),
            Command::CurrentDocumentPicker => self.current_document_picker.as_ref(),
            Command::MarkedDocumentPicker => self.marked_document_picker.as_ref(),
            Command::DeleteDocumentPicker => self.delete_document_picker.as_ref(),
            Command::DeleteCurrentDocument => self.delete_current_document.as_ref(),
            Command::MoveSelectedSnippet => self.move_selected_snippet.as_ref(),
            Command::DeleteSelectedSnippet => self.delete_selected_snippet.as_ref(),
            Command::UpdateSelectedSnippet => self.update_selected_snippet.as_ref(),
            Command::ClosePicker => self.close_picker.as_ref(),
        }
    }

    /// The configured chords as an override table (possibly empty)
    #[must_use]
    pub fn to_table(&self) -> KeybindTable {
        Command::ALL
            .into_iter()
            .filter_map(|command| {
                self.chord(command)
                    .map(|chord| (command.name().to_string(), chord.clone()))
            })
            .collect()
    }
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: GeneralSettings,

    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl AppConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join(APP_DIR).join("config.toml"))
    }

    /// Load configuration from the default path, creating it if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing the defaults there if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let settings = Config::builder()
            .add_source(File::from(path.to_path_buf()).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the parent directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Database directory, defaulting to `<data_local_dir>/pagewriter/db`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no path is configured and the data directory
    /// cannot be determined.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.settings.database {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("db")),
        }
    }

    /// Export directory, defaulting to `<data_local_dir>/pagewriter/export`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no path is configured and the data directory
    /// cannot be determined.
    pub fn export_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.settings.export_dir {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("export")),
        }
    }
}

fn data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| ConfigError::Message("Could not determine data directory".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!((config.settings.threshold - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.settings.result_limit, 5);
        assert_eq!(config.settings.log_filter, "warn");
        assert!(config.keybindings.to_table().is_empty());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = AppConfig::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config, AppConfig::default());
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[settings]\nthreshold = 0.25\n\n[keybindings]\nswitch_menu = \"Alt+m\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();

        assert!((config.settings.threshold - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.settings.result_limit, 5);
        let table = config.keybindings.to_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("switch_menu"), Some("Alt+m"));
    }

    #[test]
    fn test_configured_paths_win() {
        let mut config = AppConfig::default();
        config.settings.database = Some(PathBuf::from("/tmp/pw-db"));
        config.settings.export_dir = Some(PathBuf::from("/tmp/pw-export"));

        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/pw-db"));
        assert_eq!(config.export_path().unwrap(), PathBuf::from("/tmp/pw-export"));
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = AppConfig::default();
        config.keybindings.close_picker = Some("Control+g".to_string());

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }
}
