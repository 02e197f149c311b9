//! Backend error types
//!
//! Every failure a backend call can report. None of these are fatal to the
//! client: the session logs them and shows a notice.

use crate::db::{DbError, SnippetId};
use thiserror::Error;

/// Errors reported by the persistence backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Underlying storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    /// No document with this name
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// No snippet with this id
    #[error("Snippet not found: {0}")]
    SnippetNotFound(SnippetId),

    /// Snippet exists but belongs to another document
    #[error("Snippet {id} does not belong to document '{document}'")]
    SnippetNotInDocument { id: SnippetId, document: String },

    /// Submitted snippet text was empty
    #[error("Snippet is empty")]
    EmptySnippet,

    /// Export could not be written
    #[error("Export failed: {0}")]
    Export(#[from] std::io::Error),
}

/// Result type for backend calls
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_from_db_error() {
        let error: BackendError = DbError::Unavailable("down".to_string()).into();
        assert!(error.to_string().starts_with("Storage error"));
    }

    #[test]
    fn test_snippet_not_in_document_display() {
        let error = BackendError::SnippetNotInDocument {
            id: 3,
            document: "todo".to_string(),
        };
        assert_eq!(error.to_string(), "Snippet 3 does not belong to document 'todo'");
    }
}
