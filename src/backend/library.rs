//! Document rules on top of raw storage.
//!
//! - `submit` with an empty title appends to the marked document; with no
//!   marked document the snippet's first line names a new document, which
//!   becomes the marked one.
//! - Submitting text already present in the target document returns the
//!   existing snippet.
//! - `update` with empty text deletes the snippet.
//! - Deleting the last snippet of a document deletes the document. Moving the
//!   last snippet away leaves the source as an empty document.
//! - Deleting a document (either way) clears the marked pointer if it pointed
//!   there.

use super::error::{BackendError, Result};
use super::export;
use super::storage::DocumentStorage;
use super::types::{Document, SnippetEntry, Submitted};
use super::Backend;
use crate::db::{DocumentRecord, SnippetId, SnippetRecord};
use crate::keybinds::KeybindTable;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct Library<S: DocumentStorage> {
    storage: S,
    export_dir: PathBuf,
    keybindings: Option<KeybindTable>,
}

impl<S: DocumentStorage> Library<S> {
    /// Library over `storage`, exporting into `export_dir`.
    pub fn new(storage: S, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            export_dir: export_dir.into(),
            keybindings: None,
        }
    }

    /// Keybinding overrides served by `load_keybindings`; empty tables count as none.
    #[must_use]
    pub fn with_keybindings(mut self, keybindings: KeybindTable) -> Self {
        self.keybindings = (!keybindings.is_empty()).then_some(keybindings);
        self
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Create an empty document if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Storage` if the storage write fails.
    pub fn create_document(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if self.storage.get_document(name)?.is_none() {
            self.storage.put_document(&DocumentRecord::new(name))?;
        }
        Ok(())
    }

    fn require_document(&self, name: &str) -> Result<DocumentRecord> {
        self.storage
            .get_document(name)?
            .ok_or_else(|| BackendError::DocumentNotFound(name.to_string()))
    }

    fn require_owner(&self, id: SnippetId) -> Result<String> {
        self.storage
            .snippet_owner(id)?
            .ok_or(BackendError::SnippetNotFound(id))
    }

    fn unmark_if(&self, name: &str) -> Result<()> {
        if self.storage.marked()?.as_deref() == Some(name) {
            self.storage.set_marked(None)?;
        }
        Ok(())
    }

    fn submit_now(&self, title: &str, snippet: &str) -> Result<Submitted> {
        if snippet.trim().is_empty() {
            return Err(BackendError::EmptySnippet);
        }

        let title = title.trim();
        let (document, mark) = if !title.is_empty() {
            (title.to_string(), false)
        } else if let Some(marked) = self.storage.marked()? {
            (marked, false)
        } else {
            (first_line(snippet).to_string(), true)
        };

        let existing = self.storage.get_document(&document)?;
        let created_document = existing.is_none();
        let mut record = existing.unwrap_or_else(|| DocumentRecord::new(document.clone()));

        let id = if let Some(duplicate) = record.snippets.iter().find(|s| s.text == snippet) {
            tracing::debug!(document, id = duplicate.id, "snippet already present");
            duplicate.id
        } else {
            let id = self.storage.next_snippet_id()?;
            record.snippets.push(SnippetRecord::new(id, snippet));
            self.storage.put_document(&record)?;
            self.storage.set_snippet_owner(id, Some(&document))?;
            id
        };

        if mark {
            self.storage.set_marked(Some(&document))?;
        }

        Ok(Submitted {
            id,
            document,
            created_document,
        })
    }

    fn update_now(&self, id: SnippetId, snippet: &str, document: &str) -> Result<()> {
        let owner = self.require_owner(id)?;
        if owner != document {
            return Err(BackendError::SnippetNotInDocument {
                id,
                document: document.to_string(),
            });
        }

        if snippet.trim().is_empty() {
            return self.delete_snippet_now(id);
        }

        let mut record = self.require_document(&owner)?;
        let entry = record
            .snippet_mut(id)
            .ok_or(BackendError::SnippetNotFound(id))?;
        entry.text = snippet.to_string();
        self.storage.put_document(&record)?;
        Ok(())
    }

    fn delete_snippet_now(&self, id: SnippetId) -> Result<()> {
        let owner = self.require_owner(id)?;
        let mut record = self.require_document(&owner)?;
        record.take_snippet(id);
        self.storage.set_snippet_owner(id, None)?;

        if record.snippets.is_empty() {
            self.storage.remove_document(&owner)?;
            self.unmark_if(&owner)?;
        } else {
            self.storage.put_document(&record)?;
        }
        Ok(())
    }

    fn move_snippet_now(&self, id: SnippetId, target: &str) -> Result<()> {
        let owner = self.require_owner(id)?;
        if owner == target {
            return Ok(());
        }

        let mut destination = self.require_document(target)?;
        let mut source = self.require_document(&owner)?;
        let snippet = source
            .take_snippet(id)
            .ok_or(BackendError::SnippetNotFound(id))?;

        destination.snippets.push(snippet);
        self.storage.put_document(&source)?;
        self.storage.put_document(&destination)?;
        self.storage.set_snippet_owner(id, Some(target))?;
        Ok(())
    }

    fn delete_document_now(&self, name: &str) -> Result<()> {
        let record = self.require_document(name)?;
        for snippet in &record.snippets {
            self.storage.set_snippet_owner(snippet.id, None)?;
        }
        self.storage.remove_document(name)?;
        self.unmark_if(name)?;
        Ok(())
    }
}

impl<S: DocumentStorage> Backend for Library<S> {
    async fn load_keybindings(&self) -> Result<Option<KeybindTable>> {
        Ok(self.keybindings.clone())
    }

    async fn load_snippets(&self) -> Result<BTreeMap<String, Vec<SnippetEntry>>> {
        Ok(self
            .storage
            .list_documents()?
            .into_iter()
            .map(|record| {
                let document = Document::from(record);
                (document.name, document.snippets)
            })
            .collect())
    }

    async fn fetch_marked_document(&self) -> Result<Option<Document>> {
        match self.storage.marked()? {
            Some(name) => Ok(self.storage.get_document(&name)?.map(Document::from)),
            None => Ok(None),
        }
    }

    async fn load_document(&self, name: &str) -> Result<Option<Document>> {
        Ok(self.storage.get_document(name)?.map(Document::from))
    }

    async fn submit(&self, title: &str, snippet: &str) -> Result<Submitted> {
        self.submit_now(title, snippet)
    }

    async fn update(&self, id: SnippetId, snippet: &str, document: &str) -> Result<()> {
        self.update_now(id, snippet, document)
    }

    async fn delete_snippet(&self, id: SnippetId) -> Result<()> {
        self.delete_snippet_now(id)
    }

    async fn move_snippet(&self, id: SnippetId, document: &str) -> Result<()> {
        self.move_snippet_now(id, document)
    }

    async fn mark_document(&self, name: &str) -> Result<()> {
        self.require_document(name)?;
        self.storage.set_marked(Some(name))?;
        Ok(())
    }

    async fn delete_document(&self, name: &str) -> Result<()> {
        self.delete_document_now(name)
    }

    async fn export_all_documents(&self) -> Result<PathBuf> {
        let documents = self.storage.list_documents()?;
        Ok(export::write_documents(&self.export_dir, &documents)?)
    }
}

/// First non-blank line, trimmed.
fn first_line(snippet: &str) -> &str {
    snippet
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
}
