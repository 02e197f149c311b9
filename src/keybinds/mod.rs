//! Keybinding system.
//!
//! Chord strings, the built-in default table, the user override layer, and
//! the resolver that decides whether a key event triggers a command.

pub mod actions;
pub mod chord;
pub mod config;
pub mod resolver;

pub use actions::Command;
pub use chord::{Chord, ChordError, KeyInput};
pub use config::{KeybindTable, default_chord, default_keybinds};
pub use resolver::KeybindResolver;
