//! Values exchanged with the backend

use crate::db::{DocumentRecord, SnippetId};
use serde::{Deserialize, Serialize};

/// A snippet as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetEntry {
    pub id: SnippetId,
    pub text: String,
}

/// A document as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub snippets: Vec<SnippetEntry>,
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Self {
            name: record.name,
            snippets: record
                .snippets
                .into_iter()
                .map(|snippet| SnippetEntry {
                    id: snippet.id,
                    text: snippet.text,
                })
                .collect(),
        }
    }
}

/// Outcome of a `submit` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submitted {
    /// Id of the new snippet, or of the identical snippet already present
    pub id: SnippetId,
    /// Document the snippet was appended to
    pub document: String,
    /// Whether the call created the document
    pub created_document: bool,
}
