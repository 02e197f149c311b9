//! Resolves key events against commands.
//!
//! Lookup goes through the user override table first. On a miss, the built-in
//! default is used and written into the override table (in memory and in the
//! settings store), so each command is materialized at most once per cache
//! lifetime. Unknown command names resolve to `false` with no side effect.

use super::chord::{Chord, KeyInput};
use super::config::{KEYBINDS_KEY, KeybindTable, default_chord, default_keybinds};
use crate::settings::SettingsStore;

/// Cached override table plus the resolution logic.
#[derive(Debug, Clone, Default)]
pub struct KeybindResolver {
    overrides: KeybindTable,
}

impl KeybindResolver {
    /// Resolver over an explicit override table.
    #[must_use]
    pub const fn new(overrides: KeybindTable) -> Self {
        Self { overrides }
    }

    /// Load the override table cached in the settings store.
    ///
    /// A missing key yields an empty table. A corrupt value is logged and
    /// treated as empty; it will be overwritten by the next materialization.
    #[must_use]
    pub fn from_settings(settings: &impl SettingsStore) -> Self {
        let overrides = match settings.get(KEYBINDS_KEY) {
            Some(json) => KeybindTable::from_json(&json).unwrap_or_else(|err| {
                tracing::warn!(%err, "stored keybinds are not valid, starting from defaults");
                KeybindTable::new()
            }),
            None => KeybindTable::new(),
        };
        Self { overrides }
    }

    /// Store `table` as the override layer if the settings store has none yet.
    ///
    /// Returns `true` if the table was written.
    pub fn seed_if_absent(
        &mut self,
        settings: &mut impl SettingsStore,
        table: Option<KeybindTable>,
    ) -> bool {
        if settings.get(KEYBINDS_KEY).is_some() {
            return false;
        }
        let Some(table) = table else {
            return false;
        };

        self.overrides = table;
        self.persist(settings);
        true
    }

    /// Does `event` trigger `command`?
    ///
    /// Never fails: malformed chords and unknown commands resolve to `false`.
    pub fn resolve(
        &mut self,
        settings: &mut impl SettingsStore,
        event: &KeyInput,
        command: &str,
    ) -> bool {
        if let Some(chord) = self.overrides.get(command) {
            return Chord::matches_str(chord, event);
        }

        let Some(chord) = default_chord(command) else {
            return false;
        };

        tracing::debug!(command, chord, "materializing default keybinding");
        self.overrides.insert(command, chord);
        self.persist(settings);

        Chord::matches_str(chord, event)
    }

    /// The cached override layer.
    #[must_use]
    pub const fn overrides(&self) -> &KeybindTable {
        &self.overrides
    }

    /// Defaults overlaid with overrides, for display.
    #[must_use]
    pub fn effective(&self) -> KeybindTable {
        let mut table = default_keybinds();
        for (command, chord) in &self.overrides.binds {
            table.insert(command.clone(), chord.clone());
        }
        table
    }

    fn persist(&self, settings: &mut impl SettingsStore) {
        let result = self
            .overrides
            .to_json()
            .map_err(crate::settings::SettingsError::from)
            .and_then(|json| settings.set(KEYBINDS_KEY, &json));

        if let Err(err) = result {
            tracing::warn!(%err, "failed to persist keybindings");
        }
    }
}
