//! Database wrapper module for pagewriter
//!
//! Stores documents and their snippets using sled as the embedded database
//! backend.
//!
//! Uses multiple sled trees:
//! - `documents`: document name -> encoded `DocumentRecord`
//! - `owners`: snippet id -> owning document name (reverse index)
//! - `meta`: single-value entries such as the marked document

use crate::backend::DocumentStorage;
use sled::{Db, Tree};
use std::path::Path;

pub mod error;
pub mod types;

pub use error::DbError;
pub use types::{DocumentRecord, SnippetId, SnippetKey, SnippetRecord};

const MARKED_KEY: &[u8] = b"marked";

/// Database wrapper that encapsulates all storage operations
pub struct Database {
    db: Db,
    documents: Tree,
    owners: Tree,
    meta: Tree,
}

impl Database {
    /// Opens or creates a database at the specified path
    ///
    /// # Examples
    /// ```no_run
    /// use pagewriter::db::Database;
    /// let db = Database::open("my_db").unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be opened or if the internal trees cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let db = sled::open(path)?;
        let documents = db.open_tree("documents")?;
        let owners = db.open_tree("owners")?;
        let meta = db.open_tree("meta")?;
        Ok(Self {
            db,
            documents,
            owners,
            meta,
        })
    }

    /// Number of stored documents
    #[must_use]
    pub fn count(&self) -> usize {
        self.documents.len()
    }

    /// Flush all pending writes to disk
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the flush operation fails.
    pub fn flush(&self) -> Result<(), DbError> {
        self.db.flush()?;
        Ok(())
    }

    /// Remove every document, owner entry and meta value
    ///
    /// # Errors
    ///
    /// Returns `DbError` if any tree cannot be cleared.
    pub fn clear(&self) -> Result<(), DbError> {
        self.documents.clear()?;
        self.owners.clear()?;
        self.meta.clear()?;
        Ok(())
    }
}

impl DocumentStorage for Database {
    fn list_documents(&self) -> Result<Vec<DocumentRecord>, DbError> {
        // sled iterates keys in byte order, which is name order for UTF-8
        let mut records = Vec::new();
        for result in &self.documents {
            let (_, value) = result?;
            records.push(DocumentRecord::from_bytes(&value)?);
        }
        Ok(records)
    }

    fn get_document(&self, name: &str) -> Result<Option<DocumentRecord>, DbError> {
        match self.documents.get(name.as_bytes())? {
            Some(value) => Ok(Some(DocumentRecord::from_bytes(&value)?)),
            None => Ok(None),
        }
    }

    fn put_document(&self, record: &DocumentRecord) -> Result<(), DbError> {
        self.documents
            .insert(record.name.as_bytes(), record.to_bytes()?)?;
        Ok(())
    }

    fn remove_document(&self, name: &str) -> Result<bool, DbError> {
        Ok(self.documents.remove(name.as_bytes())?.is_some())
    }

    fn snippet_owner(&self, id: SnippetId) -> Result<Option<String>, DbError> {
        match self.owners.get(SnippetKey(id).to_bytes())? {
            Some(value) => String::from_utf8(value.to_vec())
                .map(Some)
                .map_err(|e| DbError::SerializeError(format!("owner of snippet {id}: {e}"))),
            None => Ok(None),
        }
    }

    fn set_snippet_owner(&self, id: SnippetId, owner: Option<&str>) -> Result<(), DbError> {
        let key = SnippetKey(id).to_bytes();
        match owner {
            Some(name) => {
                self.owners.insert(key, name.as_bytes())?;
            }
            None => {
                self.owners.remove(key)?;
            }
        }
        Ok(())
    }

    fn marked(&self) -> Result<Option<String>, DbError> {
        match self.meta.get(MARKED_KEY)? {
            Some(value) => String::from_utf8(value.to_vec())
                .map(Some)
                .map_err(|e| DbError::SerializeError(format!("marked document: {e}"))),
            None => Ok(None),
        }
    }

    fn set_marked(&self, name: Option<&str>) -> Result<(), DbError> {
        match name {
            Some(name) => {
                self.meta.insert(MARKED_KEY, name.as_bytes())?;
            }
            None => {
                self.meta.remove(MARKED_KEY)?;
            }
        }
        Ok(())
    }

    fn next_snippet_id(&self) -> Result<SnippetId, DbError> {
        // generate_id starts at 0; ids start at 1
        Ok(self.db.generate_id()? + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("db")).unwrap();
        (dir, db)
    }

    #[test]
    fn test_put_and_get_document() {
        let (_dir, db) = open_temp();
        let mut record = DocumentRecord::new("todo");
        record.snippets.push(SnippetRecord::new(1, "buy milk"));

        db.put_document(&record).unwrap();
        assert_eq!(db.get_document("todo").unwrap(), Some(record));
        assert_eq!(db.get_document("Todo").unwrap(), None);
        assert_eq!(db.count(), 1);
    }

    #[test]
    fn test_list_documents_sorted_by_name() {
        let (_dir, db) = open_temp();
        db.put_document(&DocumentRecord::new("zeta")).unwrap();
        db.put_document(&DocumentRecord::new("alpha")).unwrap();

        let names: Vec<String> = db
            .list_documents()
            .unwrap()
            .into_iter()
            .map(|record| record.name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_remove_document() {
        let (_dir, db) = open_temp();
        db.put_document(&DocumentRecord::new("todo")).unwrap();

        assert!(db.remove_document("todo").unwrap());
        assert!(!db.remove_document("todo").unwrap());
    }

    #[test]
    fn test_owner_index() {
        let (_dir, db) = open_temp();
        db.set_snippet_owner(7, Some("todo")).unwrap();
        assert_eq!(db.snippet_owner(7).unwrap(), Some("todo".to_string()));

        db.set_snippet_owner(7, None).unwrap();
        assert_eq!(db.snippet_owner(7).unwrap(), None);
    }

    #[test]
    fn test_marked_pointer() {
        let (_dir, db) = open_temp();
        assert_eq!(db.marked().unwrap(), None);

        db.set_marked(Some("ideas")).unwrap();
        assert_eq!(db.marked().unwrap(), Some("ideas".to_string()));

        db.set_marked(None).unwrap();
        assert_eq!(db.marked().unwrap(), None);
    }

    #[test]
    fn test_snippet_ids_increase() {
        let (_dir, db) = open_temp();
        let first = db.next_snippet_id().unwrap();
        let second = db.next_snippet_id().unwrap();
        assert!(first >= 1);
        assert!(second > first);
    }

    #[test]
    fn test_clear() {
        let (_dir, db) = open_temp();
        db.put_document(&DocumentRecord::new("todo")).unwrap();
        db.set_marked(Some("todo")).unwrap();

        db.clear().unwrap();
        assert_eq!(db.count(), 0);
        assert_eq!(db.marked().unwrap(), None);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db");
        {
            let db = Database::open(&path).unwrap();
            db.put_document(&DocumentRecord::new("todo")).unwrap();
            db.flush().unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert!(db.get_document("todo").unwrap().is_some());
    }
}
