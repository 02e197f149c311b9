//! Raw storage interface.
//!
//! This trait handles where documents live (sled on disk, or memory), while
//! [`super::Library`] handles what the operations mean. Implementations use
//! `&self` throughout; the in-memory one relies on `RefCell` since the
//! application is single-threaded.

use crate::db::{DbError, DocumentRecord, SnippetId};

pub trait DocumentStorage {
    /// All documents, ordered by name.
    fn list_documents(&self) -> Result<Vec<DocumentRecord>, DbError>;

    fn get_document(&self, name: &str) -> Result<Option<DocumentRecord>, DbError>;

    /// Insert or replace a document.
    fn put_document(&self, record: &DocumentRecord) -> Result<(), DbError>;

    /// Returns whether the document existed.
    fn remove_document(&self, name: &str) -> Result<bool, DbError>;

    /// Name of the document owning a snippet.
    fn snippet_owner(&self, id: SnippetId) -> Result<Option<String>, DbError>;

    /// Record (or clear, with `None`) the owner of a snippet.
    fn set_snippet_owner(&self, id: SnippetId, owner: Option<&str>) -> Result<(), DbError>;

    /// Name of the marked document, if any.
    fn marked(&self) -> Result<Option<String>, DbError>;

    fn set_marked(&self, name: Option<&str>) -> Result<(), DbError>;

    /// A fresh snippet id, greater than every id handed out before.
    fn next_snippet_id(&self) -> Result<SnippetId, DbError>;
}
