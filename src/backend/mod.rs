//! Persistence backend
//!
//! The client reaches stored documents only through the [`Backend`] trait,
//! the asynchronous call surface the session issues requests against.
//! [`Library`] implements it over any [`DocumentStorage`]: sled on disk
//! ([`crate::db::Database`]) or memory ([`MemStorage`]).

pub mod error;
pub mod export;
pub mod library;
pub mod memory;
pub mod storage;
pub mod types;

pub use error::BackendError;
pub use library::Library;
pub use memory::MemStorage;
pub use storage::DocumentStorage;
pub use types::{Document, SnippetEntry, Submitted};

use crate::db::SnippetId;
use crate::keybinds::KeybindTable;
use error::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Library backed by memory, for tests and throwaway sessions.
pub type MemoryBackend = Library<MemStorage>;

/// Library backed by the sled database.
pub type SledBackend = Library<crate::db::Database>;

/// Asynchronous call surface of the persistence backend.
///
/// Calls are issued from the single event-handling thread; futures need not
/// be `Send`.
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// User keybinding overrides shipped with the backend configuration.
    async fn load_keybindings(&self) -> Result<Option<KeybindTable>>;

    /// Every document name with its snippets, used to seed the search index.
    async fn load_snippets(&self) -> Result<BTreeMap<String, Vec<SnippetEntry>>>;

    async fn fetch_marked_document(&self) -> Result<Option<Document>>;

    async fn load_document(&self, name: &str) -> Result<Option<Document>>;

    /// Append a snippet, creating the document on first use.
    async fn submit(&self, title: &str, snippet: &str) -> Result<Submitted>;

    /// Replace a snippet's text; empty text deletes it.
    async fn update(&self, id: SnippetId, snippet: &str, document: &str) -> Result<()>;

    async fn delete_snippet(&self, id: SnippetId) -> Result<()>;

    /// Reassign a snippet to another document.
    async fn move_snippet(&self, id: SnippetId, document: &str) -> Result<()>;

    async fn mark_document(&self, name: &str) -> Result<()>;

    async fn delete_document(&self, name: &str) -> Result<()>;

    /// Write every document out and return the output path.
    async fn export_all_documents(&self) -> Result<PathBuf>;
}
