//! Keybinding tables.
//!
//! Two layers: the user override table (persisted in the settings store as
//! JSON under [`KEYBINDS_KEY`]) and the built-in defaults, which live here and
//! never change at runtime.

use super::actions::Command;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings key holding the serialized override table.
pub const KEYBINDS_KEY: &str = "keybinds";

/// Command name to chord string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct KeybindTable {
    pub binds: BTreeMap<String, String>,
}

impl KeybindTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the chord string bound to a command name.
    #[must_use]
    pub fn get(&self, command: &str) -> Option<&str> {
        self.binds.get(command).map(String::as_str)
    }

    pub fn insert(&mut self, command: impl Into<String>, chord: impl Into<String>) {
        self.binds.insert(command.into(), chord.into());
    }

    #[must_use]
    pub fn contains(&self, command: &str) -> bool {
        self.binds.contains_key(command)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.binds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }

    /// Serialize for the settings store.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a table previously written by [`KeybindTable::to_json`].
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the JSON is not an object of strings.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl FromIterator<(String, String)> for KeybindTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            binds: iter.into_iter().collect(),
        }
    }
}

/// Built-in chord for a command name; `None` for unknown commands.
#[must_use]
pub fn default_chord(command: &str) -> Option<&'static str> {
    let chord = match Command::from_name(command)? {
        // Compose
        Command::SubmitSnippet => "Control+Enter",
        Command::SwitchMenu => "Control+t",

        // Documents
        Command::CurrentDocumentPicker => "Control+e",
        Command::MarkedDocumentPicker => "Control+m",
        Command::DeleteDocumentPicker => "Control+Shift+d",
        Command::DeleteCurrentDocument => "Control+Shift+Backspace",

        // Snippets
        Command::MoveSelectedSnippet => "Control+Shift+m",
        Command::DeleteSelectedSnippet => "Control+Delete",
        Command::UpdateSelectedSnippet => "Control+s",

        // Picker
        Command::ClosePicker => "Escape",
    };
    Some(chord)
}

/// The full default table, for listing.
#[must_use]
pub fn default_keybinds() -> KeybindTable {
    Command::ALL
        .iter()
        .filter_map(|command| {
            default_chord(command.name()).map(|chord| (command.name().to_string(), chord.to_string()))
        })
        .collect()
}
