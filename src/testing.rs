//! Testing utilities for pagewriter
//!
//! Fixtures for unit tests: an in-memory backend, a sled backend in a
//! temporary directory, and synchronizer/controller constructors wired to a
//! `RecordingPresenter`.
//!
//! Only available when compiled with `cfg(test)`.

use crate::backend::{Library, MemStorage, MemoryBackend, SledBackend};
use crate::controller::Controller;
use crate::db::Database;
use crate::settings::MemorySettings;
use crate::synchronizer::ViewSynchronizer;
use crate::ui::RecordingPresenter;
use std::path::Path;
use tempfile::TempDir;

pub type TestSync = ViewSynchronizer<MemoryBackend, MemorySettings, RecordingPresenter>;

pub type TestController = Controller<MemoryBackend, MemorySettings, RecordingPresenter>;

/// Empty in-memory backend; exports land in the system temp directory.
#[must_use]
pub fn memory_backend() -> MemoryBackend {
    Library::new(MemStorage::new(), std::env::temp_dir().join("pagewriter-test-export"))
}

/// Synchronizer over `backend` and `settings` with a recording presenter.
#[must_use]
pub fn sync_with(backend: MemoryBackend, settings: MemorySettings) -> TestSync {
    ViewSynchronizer::new(backend, settings, RecordingPresenter::new())
}

/// A sled-backed library in a temporary directory that is removed on drop.
pub struct TestDb {
    dir: TempDir,
    backend: SledBackend,
}

impl TestDb {
    /// Open a fresh database under a new temporary directory.
    ///
    /// # Panics
    /// Panics if the directory or database cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = Database::open(dir.path().join("db")).expect("Failed to open test database");
        let backend = Library::new(db, dir.path().join("export"));
        Self { dir, backend }
    }

    #[must_use]
    pub const fn backend(&self) -> &SledBackend {
        &self.backend
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;

    #[tokio::test]
    async fn test_db_basic() {
        let test_db = TestDb::new();
        assert!(test_db.path().join("db").exists());
        assert!(test_db.backend().load_snippets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_db_with_data() {
        let test_db = TestDb::new();
        test_db.backend().submit("todo", "buy milk").await.unwrap();

        assert_eq!(test_db.backend().storage().count(), 1);
    }

    #[test]
    fn test_db_cleanup() {
        let path = {
            let test_db = TestDb::new();
            test_db.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_sync_with_starts_empty() {
        let sync = sync_with(memory_backend(), MemorySettings::new());
        assert!(sync.presenter().renders.is_empty());
        assert!(sync.backend().load_snippets().await.unwrap().is_empty());
    }
}
