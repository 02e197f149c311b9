//! Pagewriter - documents of snippets with a keyboard-driven fuzzy picker
//!
//! This library provides the client-side document registry, the fuzzy
//! document picker and the keybinding resolver, plus the backends they talk
//! to: a sled database for real use and an in-memory store for tests.

use thiserror::Error;

pub mod backend;
pub mod cli;
pub mod config;
pub mod controller;
pub mod db;
pub mod keybinds;
pub mod picker;
pub mod registry;
pub mod search;
pub mod settings;
pub mod synchronizer;
pub mod ui;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum PageError {
    /// Database error
    #[error("Database error: {0}")]
    DbError(#[from] db::DbError),
    /// Backend call failed
    #[error("Backend error: {0}")]
    BackendError(#[from] backend::BackendError),
    /// Local settings could not be read or written
    #[error("Settings error: {0}")]
    SettingsError(#[from] settings::SettingsError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
