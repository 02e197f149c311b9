//! Chord strings and raw key input.
//!
//! A chord is written as modifiers followed by one key, joined with `+`:
//! `"Control+Shift+d"`. Modifier names are case-sensitive (`Control`, `Shift`,
//! `Alt`, `Meta`); the key is compared case-insensitively.
//!
//! Malformed chords (empty key, unknown modifier) parse to an error, and
//! [`Chord::matches_str`] treats that error as "does not match". Resolution
//! never fails loudly on a bad user table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw key event as forwarded by the presentation layer.
///
/// Field names follow the browser `KeyboardEvent` shape so events can be
/// deserialized straight from the webview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInput {
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub shift_key: bool,
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    pub key: String,
}

impl KeyInput {
    /// Key press without modifiers
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Key press with Control held
    #[must_use]
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            ctrl_key: true,
            key: key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    #[must_use]
    pub const fn with_alt(mut self) -> Self {
        self.alt_key = true;
        self
    }

    #[must_use]
    pub const fn with_meta(mut self) -> Self {
        self.meta_key = true;
        self
    }
}

/// Reasons a chord string fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordError {
    /// The final token is empty (`""`, `"Control+"`)
    #[error("chord '{0}' has no key")]
    EmptyKey(String),

    /// A modifier token is not one of `Control`, `Shift`, `Alt`, `Meta`
    #[error("chord '{chord}' has unknown modifier '{modifier}'")]
    UnknownModifier { chord: String, modifier: String },
}

/// A parsed chord: four modifier flags and a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    pub key: String,
}

impl Chord {
    /// Parse a chord string such as `"Control+Enter"`.
    ///
    /// Tokens are split on `+` and trimmed. Modifier order does not matter.
    ///
    /// # Errors
    ///
    /// Returns `ChordError` if the key is empty or a modifier is unknown.
    pub fn parse(spec: &str) -> Result<Self, ChordError> {
        let parts: Vec<&str> = spec.split('+').map(str::trim).collect();

        // split always yields at least one token
        let key = parts.last().copied().unwrap_or_default();
        if key.is_empty() {
            return Err(ChordError::EmptyKey(spec.to_string()));
        }

        let mut chord = Self {
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
            key: key.to_string(),
        };

        for part in &parts[..parts.len() - 1] {
            match *part {
                "Control" => chord.ctrl = true,
                "Shift" => chord.shift = true,
                "Alt" => chord.alt = true,
                "Meta" => chord.meta = true,
                other => {
                    return Err(ChordError::UnknownModifier {
                        chord: spec.to_string(),
                        modifier: other.to_string(),
                    });
                }
            }
        }

        Ok(chord)
    }

    /// Exact modifier match plus case-insensitive key match.
    #[must_use]
    pub fn matches(&self, input: &KeyInput) -> bool {
        self.ctrl == input.ctrl_key
            && self.shift == input.shift_key
            && self.alt == input.alt_key
            && self.meta == input.meta_key
            && self.key.to_lowercase() == input.key.to_lowercase()
    }

    /// Parse `spec` and match it against `input`; malformed chords never match.
    #[must_use]
    pub fn matches_str(spec: &str, input: &KeyInput) -> bool {
        match Self::parse(spec) {
            Ok(chord) => chord.matches(input),
            Err(err) => {
                tracing::debug!(%err, "ignoring malformed chord");
                false
            }
        }
    }
}

impl std::fmt::Display for Chord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ctrl {
            f.write_str("Control+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        if self.meta {
            f.write_str("Meta+")?;
        }
        f.write_str(&self.key)
    }
}
