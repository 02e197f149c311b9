//! Stored record types and key encodings
//!
//! Documents are stored whole: one value per document name holding its
//! ordered snippets. Snippet ids are keyed big-endian so sled iterates them
//! in numeric order.

use super::error::DbError;
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Backend-assigned snippet identity.
pub type SnippetId = u64;

/// A snippet as persisted.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SnippetRecord {
    pub id: SnippetId,
    pub text: String,
    /// Unix timestamp (seconds) of creation
    pub created_at: i64,
}

impl SnippetRecord {
    #[must_use]
    pub fn new(id: SnippetId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// A document and its snippets, in insertion order.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DocumentRecord {
    pub name: String,
    pub snippets: Vec<SnippetRecord>,
}

impl DocumentRecord {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            snippets: Vec::new(),
        }
    }

    #[must_use]
    pub fn snippet(&self, id: SnippetId) -> Option<&SnippetRecord> {
        self.snippets.iter().find(|snippet| snippet.id == id)
    }

    pub fn snippet_mut(&mut self, id: SnippetId) -> Option<&mut SnippetRecord> {
        self.snippets.iter_mut().find(|snippet| snippet.id == id)
    }

    /// Remove a snippet, returning it if present.
    pub fn take_snippet(&mut self, id: SnippetId) -> Option<SnippetRecord> {
        let position = self.snippets.iter().position(|snippet| snippet.id == id)?;
        Some(self.snippets.remove(position))
    }

    /// Encode for storage.
    ///
    /// # Errors
    ///
    /// Returns `DbError::EncodeError` if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DbError> {
        Ok(bincode::encode_to_vec(self, bincode::config::standard())?)
    }

    /// Decode a stored value.
    ///
    /// # Errors
    ///
    /// Returns `DbError::DecodeError` if the bytes are not a `DocumentRecord`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DbError> {
        let (record, _): (Self, usize) =
            bincode::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(record)
    }
}

/// Key for the snippet owner tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnippetKey(pub SnippetId);

impl SnippetKey {
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// # Errors
    ///
    /// Returns `DbError::SerializeError` if the key is not 8 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DbError> {
        let array: [u8; 8] = bytes
            .try_into()
            .map_err(|_| DbError::SerializeError(format!("bad snippet key length {}", bytes.len())))?;
        Ok(Self(SnippetId::from_be_bytes(array)))
    }
}
