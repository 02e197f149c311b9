//! Settings store error types

use thiserror::Error;

/// Errors from reading or writing the local settings store
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read or written
    #[error("Settings I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Settings file or a stored value is not valid JSON
    #[error("Settings JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// No location for the settings file could be determined
    #[error("Could not determine settings location: {0}")]
    PathError(String),
}
