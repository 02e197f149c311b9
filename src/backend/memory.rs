//! In-memory document storage.
//!
//! Used by tests and by callers that want a throwaway library. Uses `RefCell`
//! for interior mutability since the client is single-threaded.

use super::storage::DocumentStorage;
use crate::db::{DbError, DocumentRecord, SnippetId};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemStorage {
    documents: RefCell<BTreeMap<String, DocumentRecord>>,
    owners: RefCell<BTreeMap<SnippetId, String>>,
    marked: RefCell<Option<String>>,
    last_id: Cell<SnippetId>,
    simulate_write_error: Cell<bool>,
    simulate_read_error: Cell<bool>,
}

impl MemStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail with `DbError::Unavailable` until switched off.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Make every read fail with `DbError::Unavailable` until switched off.
    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.simulate_read_error.set(simulate);
    }

    fn check_readable(&self) -> Result<(), DbError> {
        if self.simulate_read_error.get() {
            return Err(DbError::Unavailable("simulated read error".to_string()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), DbError> {
        if self.simulate_write_error.get() {
            return Err(DbError::Unavailable("simulated write error".to_string()));
        }
        Ok(())
    }
}

impl DocumentStorage for MemStorage {
    fn list_documents(&self) -> Result<Vec<DocumentRecord>, DbError> {
        self.check_readable()?;
        Ok(self.documents.borrow().values().cloned().collect())
    }

    fn get_document(&self, name: &str) -> Result<Option<DocumentRecord>, DbError> {
        self.check_readable()?;
        Ok(self.documents.borrow().get(name).cloned())
    }

    fn put_document(&self, record: &DocumentRecord) -> Result<(), DbError> {
        self.check_writable()?;
        self.documents
            .borrow_mut()
            .insert(record.name.clone(), record.clone());
        Ok(())
    }

    fn remove_document(&self, name: &str) -> Result<bool, DbError> {
        self.check_writable()?;
        Ok(self.documents.borrow_mut().remove(name).is_some())
    }

    fn snippet_owner(&self, id: SnippetId) -> Result<Option<String>, DbError> {
        self.check_readable()?;
        Ok(self.owners.borrow().get(&id).cloned())
    }

    fn set_snippet_owner(&self, id: SnippetId, owner: Option<&str>) -> Result<(), DbError> {
        self.check_writable()?;
        let mut owners = self.owners.borrow_mut();
        match owner {
            Some(name) => {
                owners.insert(id, name.to_string());
            }
            None => {
                owners.remove(&id);
            }
        }
        Ok(())
    }

    fn marked(&self) -> Result<Option<String>, DbError> {
        self.check_readable()?;
        Ok(self.marked.borrow().clone())
    }

    fn set_marked(&self, name: Option<&str>) -> Result<(), DbError> {
        self.check_writable()?;
        *self.marked.borrow_mut() = name.map(ToString::to_string);
        Ok(())
    }

    fn next_snippet_id(&self) -> Result<SnippetId, DbError> {
        self.check_writable()?;
        let id = self.last_id.get() + 1;
        self.last_id.set(id);
        Ok(id)
    }
}
