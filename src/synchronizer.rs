//! View synchronizer
//!
//! Drives every backend round-trip and keeps the registry session, the
//! persisted current-document pointer and the presenter in step.
//!
//! # Ordering
//!
//! Optimistic mutations (`update_snippet`, `delete_snippet`, and the mark,
//! delete and move picker actions) change the session and render before the
//! backend call is awaited. When the call fails the user is notified and the
//! local change stays; the pending ledger records the divergence.
//!
//! ```text
//! mutate session ─▶ ledger.begin ─▶ render ─▶ await backend
//!                                                  │
//!                           ledger.settle ◀────────┘
//!                           notify on Err, render
//! ```
//!
//! `create_snippet` is the exception: it waits for the backend id and then
//! reloads the affected document.

use crate::backend::{Backend, BackendError, Document};
use crate::db::SnippetId;
use crate::keybinds::KeybindResolver;
use crate::keybinds::config::KEYBINDS_KEY;
use crate::picker::{PickerAction, PickerCommit};
use crate::registry::{PendingKey, RegistrySession, Snippet, Ticket};
use crate::search::{DEFAULT_LIMIT, DEFAULT_THRESHOLD};
use crate::settings::{self, SettingsStore};
use crate::ui::{Notice, PlainRenderer, Presenter, SnippetRenderer};
use std::path::PathBuf;

pub struct ViewSynchronizer<B, S, P> {
    backend: B,
    settings: S,
    presenter: P,
    renderer: Box<dyn SnippetRenderer>,
    threshold: f64,
    result_limit: usize,
}

impl<B, S, P> ViewSynchronizer<B, S, P>
where
    B: Backend,
    S: SettingsStore,
    P: Presenter,
{
    pub fn new(backend: B, settings: S, presenter: P) -> Self {
        Self {
            backend,
            settings,
            presenter,
            renderer: Box::new(PlainRenderer),
            threshold: DEFAULT_THRESHOLD,
            result_limit: DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn SnippetRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Fuzzy cutoff and picker result cap for sessions entered from now on.
    #[must_use]
    pub fn with_search(mut self, threshold: f64, result_limit: usize) -> Self {
        self.threshold = threshold;
        self.result_limit = result_limit;
        self
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub const fn settings(&self) -> &S {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Build a session for a visit to the document view.
    ///
    /// Seeds the keybinding overrides from the backend if none are cached,
    /// loads the marked document label, indexes every document name and
    /// reopens the persisted current document. Backend failures are reported
    /// and leave the affected part empty.
    pub async fn enter(&mut self) -> RegistrySession {
        tracing::info!("entering document view");
        let mut session = RegistrySession::new(self.threshold, self.result_limit);

        if self.settings.get(KEYBINDS_KEY).is_none() {
            match self.backend.load_keybindings().await {
                Ok(table) => {
                    let mut resolver = KeybindResolver::from_settings(&self.settings);
                    if resolver.seed_if_absent(&mut self.settings, table) {
                        tracing::debug!("seeded keybindings from backend");
                    }
                }
                Err(err) => self.report("Failed to load keybindings", &err),
            }
        }

        self.load_marked_document(&mut session).await;

        match self.backend.load_snippets().await {
            Ok(corpus) => session.set_known_documents(corpus.into_keys()),
            Err(err) => self.report("Failed to load documents", &err),
        }

        if let Some(name) = settings::current_document(&self.settings) {
            self.reload_document(&mut session, &name).await;
        }

        self.render(&session);
        session
    }

    /// Fetch the marked document and refresh the session's marked label.
    ///
    /// Returns the document with its snippets, or `None` when nothing is
    /// marked or the backend call failed (the failure is reported and the
    /// label is left as it was). Does not render.
    pub async fn load_marked_document(&mut self, session: &mut RegistrySession) -> Option<Document> {
        match self.backend.fetch_marked_document().await {
            Ok(marked) => {
                session.set_marked_document(marked.as_ref().map(|doc| doc.name.clone()));
                marked
            }
            Err(err) => {
                self.report("Failed to load marked document", &err);
                None
            }
        }
    }

    /// End a visit. The session is dropped; persisted pointers stay.
    pub fn leave(&mut self, session: RegistrySession) {
        if !session.pending().is_empty() {
            tracing::warn!(
                pending = ?session.pending().snapshot(),
                "leaving with unacknowledged mutations"
            );
        }
        tracing::info!("leaving document view");
    }

    /// Hand the current session state to the presenter.
    pub fn render(&mut self, session: &RegistrySession) {
        self.presenter.render(&session.view());
    }

    pub fn notify(&mut self, notice: Notice) {
        self.presenter.notify(notice);
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Make `name` the current document and load it.
    pub async fn open_document(&mut self, session: &mut RegistrySession, name: &str) {
        self.persist_current(Some(name));
        self.reload_document(session, name).await;
        self.render(session);
    }

    /// Replace the session's snippets with the backend's copy of `name`.
    ///
    /// A document the backend no longer has is forgotten and the current
    /// pointer is reset.
    async fn reload_document(&mut self, session: &mut RegistrySession, name: &str) {
        match self.backend.load_document(name).await {
            Ok(Some(document)) => self.install(session, document),
            Ok(None) => {
                tracing::info!(document = name, "current document no longer exists");
                self.drop_document(session, name);
                session.clear_document();
                self.persist_current(None);
            }
            Err(err) => {
                self.report(&format!("Failed to load '{name}'"), &err);
                session.clear_document();
            }
        }
    }

    fn install(&self, session: &mut RegistrySession, document: Document) {
        let renderer = self.renderer.as_ref();
        let snippets = document
            .snippets
            .into_iter()
            .map(|entry| Snippet::from_entry(entry, renderer))
            .collect();
        session.replace_document(document.name, snippets);
    }

    /// Forget `name` locally; persists the reset if it was current.
    fn drop_document(&mut self, session: &mut RegistrySession, name: &str) {
        let reset = session.forget_document(name);
        if reset.current {
            self.persist_current(None);
        }
        if reset.marked {
            tracing::debug!(document = name, "marked pointer reset");
        }
    }

    /// Delete the current document without opening the picker.
    pub async fn delete_current_document(&mut self, session: &mut RegistrySession) {
        let Some(name) = session.current_document().map(str::to_string) else {
            self.notify(Notice::info("No document is open"));
            return;
        };
        self.delete_document(session, name).await;
    }

    async fn delete_document(&mut self, session: &mut RegistrySession, name: String) {
        self.drop_document(session, &name);
        let key = PendingKey::Document(name.clone());
        let ticket = session.pending_mut().begin(key.clone());
        self.render(session);

        let result = self.backend.delete_document(&name).await;
        self.settle(session, &key, ticket, result, &format!("Failed to delete '{name}'"));
    }

    /// Write every document to the export directory.
    pub async fn export(&mut self) -> Option<PathBuf> {
        match self.backend.export_all_documents().await {
            Ok(path) => {
                self.notify(Notice::info(format!("Exported to {}", path.display())));
                Some(path)
            }
            Err(err) => {
                self.report("Export failed", &err);
                None
            }
        }
    }

    // ========================================================================
    // Snippets
    // ========================================================================

    /// Submit a snippet and reload the document it landed in.
    ///
    /// Returns the backend-assigned id, or `None` if the submit failed.
    pub async fn create_snippet(
        &mut self,
        session: &mut RegistrySession,
        title: &str,
        text: &str,
    ) -> Option<SnippetId> {
        let submitted = match self.backend.submit(title, text).await {
            Ok(submitted) => submitted,
            Err(err) => {
                self.report("Failed to submit snippet", &err);
                return None;
            }
        };

        tracing::debug!(id = submitted.id, document = %submitted.document, "snippet submitted");
        session.add_known_document(submitted.document.clone());
        if title.trim().is_empty() {
            // untitled submits go to the marked document, marking it if needed
            session.set_marked_document(Some(submitted.document.clone()));
        }

        self.open_document(session, &submitted.document).await;
        Some(submitted.id)
    }

    /// Replace a snippet's text locally, then tell the backend.
    ///
    /// Empty text deletes the snippet, as the backend does.
    pub async fn update_snippet(&mut self, session: &mut RegistrySession, id: SnippetId, text: &str) {
        let Some(document) = session.current_document().map(str::to_string) else {
            self.notify(Notice::info("No document is open"));
            return;
        };
        if text.trim().is_empty() {
            self.delete_snippet(session, id).await;
            return;
        }

        let Some(snippet) = session.snippet_mut(id) else {
            self.notify(Notice::error(format!("Snippet {id} is not in '{document}'")));
            return;
        };
        snippet.set_text(text, self.renderer.as_ref());

        let key = PendingKey::Snippet(id);
        let ticket = session.pending_mut().begin(key.clone());
        self.render(session);

        let result = self.backend.update(id, text, &document).await;
        self.settle(session, &key, ticket, result, "Failed to save snippet");
    }

    /// Remove a snippet locally, then tell the backend.
    ///
    /// If that empties the open document, the backend drops the document too,
    /// so the session forgets it once the delete is acknowledged.
    pub async fn delete_snippet(&mut self, session: &mut RegistrySession, id: SnippetId) {
        let Some(document) = session.current_document().map(str::to_string) else {
            self.notify(Notice::info("No document is open"));
            return;
        };
        if session.remove_snippet(id).is_none() {
            self.notify(Notice::error(format!("Snippet {id} is not in '{document}'")));
            return;
        }

        let key = PendingKey::Snippet(id);
        let ticket = session.pending_mut().begin(key.clone());
        self.render(session);

        let result = self.backend.delete_snippet(id).await;
        let deleted = result.is_ok();
        self.settle(session, &key, ticket, result, "Failed to delete snippet");

        if deleted && session.current_document() == Some(document.as_str()) && session.snippets().is_empty() {
            self.drop_document(session, &document);
            self.render(session);
        }
    }

    // ========================================================================
    // Picker
    // ========================================================================

    /// Commit the open picker and apply its action.
    ///
    /// Returns `false` if no picker was open.
    pub async fn commit_picker(&mut self, session: &mut RegistrySession) -> bool {
        let Some(commit) = session.picker_mut().commit() else {
            return false;
        };

        match commit {
            PickerCommit::Apply(action) => self.apply_picker(session, action).await,
            PickerCommit::NoMatch { query, .. } => {
                self.notify(Notice::info(format!("No document matches '{query}'")));
                self.render(session);
            }
        }
        true
    }

    /// Close the picker without applying anything.
    pub fn cancel_picker(&mut self, session: &mut RegistrySession) {
        if session.picker_mut().cancel().is_some() {
            self.render(session);
        }
    }

    /// Perform a committed picker action.
    pub async fn apply_picker(&mut self, session: &mut RegistrySession, action: PickerAction) {
        tracing::info!(?action, "applying picker action");
        match action {
            PickerAction::MarkDocument(name) => {
                session.set_marked_document(Some(name.clone()));
                let key = PendingKey::Document(name.clone());
                let ticket = session.pending_mut().begin(key.clone());
                self.render(session);

                let result = self.backend.mark_document(&name).await;
                self.settle(session, &key, ticket, result, &format!("Failed to mark '{name}'"));
            }
            PickerAction::SetCurrentDocument(name) => {
                self.open_document(session, &name).await;
            }
            PickerAction::DeleteDocument(name) => {
                self.delete_document(session, name).await;
            }
            PickerAction::MoveSnippet { id, document } => {
                // the target snippet always lives in the open document
                if session.current_document() == Some(document.as_str()) {
                    self.notify(Notice::info(format!("Snippet is already in '{document}'")));
                    self.render(session);
                    return;
                }
                session.remove_snippet(id);
                let key = PendingKey::Snippet(id);
                let ticket = session.pending_mut().begin(key.clone());
                self.render(session);

                let result = self.backend.move_snippet(id, &document).await;
                self.settle(
                    session,
                    &key,
                    ticket,
                    result,
                    &format!("Failed to move snippet to '{document}'"),
                );
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn settle(
        &mut self,
        session: &mut RegistrySession,
        key: &PendingKey,
        ticket: Ticket,
        result: Result<(), BackendError>,
        context: &str,
    ) {
        match result {
            Ok(()) => {
                session.pending_mut().settle(key, ticket, Ok(()));
            }
            Err(err) => {
                session.pending_mut().settle(key, ticket, Err(err.to_string()));
                self.report(context, &err);
                self.render(session);
            }
        }
    }

    fn report(&mut self, context: &str, err: &BackendError) {
        tracing::warn!(%err, "{context}");
        self.notify(Notice::error(format!("{context}: {err}")));
    }

    fn persist_current(&mut self, name: Option<&str>) {
        if let Err(err) = settings::set_current_document(&mut self.settings, name) {
            tracing::warn!(%err, "failed to persist current document");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybinds::KeybindTable;
    use crate::picker::PickerMode;
    use crate::registry::PendingState;
    use crate::settings::{CURRENT_DOCUMENT_KEY, MemorySettings};
    use crate::testing::{TestSync, memory_backend, sync_with};

    #[tokio::test]
    async fn test_enter_on_first_run() {
        let mut sync = sync_with(memory_backend(), MemorySettings::new());
        let session = sync.enter().await;

        assert_eq!(session.current_document(), None);
        assert_eq!(session.marked_document(), None);
        assert!(session.known_documents().is_empty());
        assert_eq!(sync.presenter().renders.len(), 1);
    }

    #[tokio::test]
    async fn test_enter_restores_current_and_marked() {
        let backend = memory_backend();
        backend.submit("todo", "buy milk").await.unwrap();
        backend.submit("ideas", "a boat").await.unwrap();
        backend.mark_document("ideas").await.unwrap();
        let settings = MemorySettings::new().with(CURRENT_DOCUMENT_KEY, "todo");

        let mut sync = sync_with(backend, settings);
        let session = sync.enter().await;

        assert_eq!(session.current_document(), Some("todo"));
        assert_eq!(session.marked_document(), Some("ideas"));
        assert_eq!(session.snippets()[0].raw_text, "buy milk");
        assert!(session.index().contains("ideas"));
    }

    #[tokio::test]
    async fn test_enter_resets_missing_current_document() {
        let settings = MemorySettings::new().with(CURRENT_DOCUMENT_KEY, "gone");
        let mut sync = sync_with(memory_backend(), settings);
        let session = sync.enter().await;

        assert_eq!(session.current_document(), None);
        assert_eq!(sync.settings().get(CURRENT_DOCUMENT_KEY).as_deref(), Some("None"));
    }

    #[tokio::test]
    async fn test_enter_seeds_keybindings_once() {
        let mut table = KeybindTable::new();
        table.insert("switch_menu", "Alt+m");
        let backend = memory_backend().with_keybindings(table);

        let mut sync = sync_with(backend, MemorySettings::new());
        sync.enter().await;
        let seeded = sync.settings().get(KEYBINDS_KEY).unwrap();
        assert_eq!(seeded, r#"{"switch_menu":"Alt+m"}"#);

        sync.settings_mut().set(KEYBINDS_KEY, "{}").unwrap();
        sync.enter().await;
        assert_eq!(sync.settings().get(KEYBINDS_KEY).as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_create_snippet_reloads_document() {
        let mut sync: TestSync = sync_with(memory_backend(), MemorySettings::new());
        let mut session = sync.enter().await;

        let id = sync.create_snippet(&mut session, "todo", "buy milk").await.unwrap();

        assert_eq!(session.current_document(), Some("todo"));
        assert_eq!(session.snippet(id).map(|s| s.raw_text.as_str()), Some("buy milk"));
        assert!(session.index().contains("todo"));
        assert_eq!(sync.settings().get(CURRENT_DOCUMENT_KEY).as_deref(), Some("todo"));
    }

    #[tokio::test]
    async fn test_untitled_submit_marks_document() {
        let mut sync = sync_with(memory_backend(), MemorySettings::new());
        let mut session = sync.enter().await;

        sync.create_snippet(&mut session, "", "Groceries\nmilk").await.unwrap();
        assert_eq!(session.marked_document(), Some("Groceries"));
    }

    #[tokio::test]
    async fn test_create_snippet_failure_notifies() {
        let backend = memory_backend();
        backend.storage().set_simulate_write_error(true);
        let mut sync = sync_with(backend, MemorySettings::new());
        let mut session = sync.enter().await;

        assert!(sync.create_snippet(&mut session, "todo", "x").await.is_none());
        assert_eq!(sync.presenter().errors().len(), 1);
        assert_eq!(session.current_document(), None);
    }

    #[tokio::test]
    async fn test_update_is_rendered_before_backend_settles() {
        let mut sync = sync_with(memory_backend(), MemorySettings::new());
        let mut session = sync.enter().await;
        let id = sync.create_snippet(&mut session, "todo", "a").await.unwrap();
        sync.presenter_mut().clear();

        sync.update_snippet(&mut session, id, "b").await;

        let first = &sync.presenter().renders[0];
        assert_eq!(first.snippets[0].raw_text, "b");
        assert_eq!(
            first.pending.get(&PendingKey::Snippet(id)),
            Some(&PendingState::InFlight)
        );
        assert!(session.pending().is_empty());

        let stored = sync.backend().load_document("todo").await.unwrap().unwrap();
        assert_eq!(stored.snippets[0].text, "b");
    }

    #[tokio::test]
    async fn test_update_failure_keeps_local_text() {
        let mut sync = sync_with(memory_backend(), MemorySettings::new());
        let mut session = sync.enter().await;
        let id = sync.create_snippet(&mut session, "todo", "a").await.unwrap();

        sync.backend().storage().set_simulate_write_error(true);
        sync.update_snippet(&mut session, id, "b").await;

        assert_eq!(session.snippet(id).map(|s| s.raw_text.as_str()), Some("b"));
        assert!(matches!(
            session.pending().state(&PendingKey::Snippet(id)),
            Some(PendingState::Failed(_))
        ));
        assert_eq!(sync.presenter().errors().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_last_snippet_forgets_document() {
        let mut sync = sync_with(memory_backend(), MemorySettings::new());
        let mut session = sync.enter().await;
        let id = sync.create_snippet(&mut session, "todo", "a").await.unwrap();

        sync.delete_snippet(&mut session, id).await;

        assert_eq!(session.current_document(), None);
        assert!(!session.index().contains("todo"));
        assert_eq!(sync.settings().get(CURRENT_DOCUMENT_KEY).as_deref(), Some("None"));
    }

    #[tokio::test]
    async fn test_commit_with_no_match_notifies() {
        let mut sync = sync_with(memory_backend(), MemorySettings::new());
        let mut session = sync.enter().await;
        session.open_picker(PickerMode::MarkDocument, None).unwrap();
        session.picker_input("nothing");

        assert!(sync.commit_picker(&mut session).await);
        assert!(!session.picker().is_open());
        assert_eq!(session.marked_document(), None);
        assert!(matches!(sync.presenter().notices.last(), Some(Notice::Info(_))));

        assert!(!sync.commit_picker(&mut session).await);
    }

    #[tokio::test]
    async fn test_move_into_open_document_keeps_snippet() {
        let backend = memory_backend();
        let a = backend.submit("todo", "a").await.unwrap().id;
        backend.submit("todo", "b").await.unwrap();
        let settings = MemorySettings::new().with(CURRENT_DOCUMENT_KEY, "todo");
        let mut sync = sync_with(backend, settings);
        let mut session = sync.enter().await;

        session.select(a);
        session.open_picker(PickerMode::MoveSnippet, Some(a)).unwrap();
        session.picker_input("todo");
        assert!(sync.commit_picker(&mut session).await);

        let local: Vec<&str> = session.snippets().iter().map(|s| s.raw_text.as_str()).collect();
        assert_eq!(local, vec!["a", "b"]);
        assert!(session.pending().is_empty());
        assert!(sync.presenter().errors().is_empty());

        let stored = sync.backend().load_document("todo").await.unwrap().unwrap();
        assert_eq!(stored.snippets.len(), 2);
    }

    #[tokio::test]
    async fn test_load_marked_document() {
        let backend = memory_backend();
        backend.submit("ideas", "a boat").await.unwrap();
        backend.mark_document("ideas").await.unwrap();
        let mut sync = sync_with(backend, MemorySettings::new());
        let mut session = sync.enter().await;
        session.set_marked_document(None);

        let marked = sync.load_marked_document(&mut session).await.unwrap();

        assert_eq!(marked.name, "ideas");
        assert_eq!(marked.snippets[0].text, "a boat");
        assert_eq!(session.marked_document(), Some("ideas"));
    }

    #[tokio::test]
    async fn test_load_marked_document_when_unmarked() {
        let backend = memory_backend();
        backend.submit("todo", "a").await.unwrap();
        let mut sync = sync_with(backend, MemorySettings::new());
        let mut session = sync.enter().await;
        session.set_marked_document(Some("stale".to_string()));

        assert!(sync.load_marked_document(&mut session).await.is_none());
        assert_eq!(session.marked_document(), None);
        assert!(sync.presenter().errors().is_empty());
    }

    #[tokio::test]
    async fn test_load_marked_document_failure_notifies() {
        let backend = memory_backend();
        backend.submit("ideas", "a boat").await.unwrap();
        backend.mark_document("ideas").await.unwrap();
        let mut sync = sync_with(backend, MemorySettings::new());
        let mut session = sync.enter().await;

        sync.backend().storage().set_simulate_read_error(true);
        assert!(sync.load_marked_document(&mut session).await.is_none());

        assert_eq!(session.marked_document(), Some("ideas"));
        assert_eq!(sync.presenter().errors().len(), 1);
        assert!(sync.presenter().errors()[0].starts_with("Failed to load marked document"));
    }

    #[tokio::test]
    async fn test_mark_document_via_picker() {
        let backend = memory_backend();
        backend.submit("todo", "a").await.unwrap();
        let mut sync = sync_with(backend, MemorySettings::new());
        let mut session = sync.enter().await;

        sync.apply_picker(&mut session, PickerAction::MarkDocument("todo".into())).await;

        assert_eq!(session.marked_document(), Some("todo"));
        let marked = sync.backend().fetch_marked_document().await.unwrap();
        assert_eq!(marked.map(|doc| doc.name).as_deref(), Some("todo"));
    }

    #[tokio::test]
    async fn test_delete_current_document() {
        let backend = memory_backend();
        backend.submit("todo", "a").await.unwrap();
        backend.mark_document("todo").await.unwrap();
        let settings = MemorySettings::new().with(CURRENT_DOCUMENT_KEY, "todo");
        let mut sync = sync_with(backend, settings);
        let mut session = sync.enter().await;

        sync.delete_current_document(&mut session).await;

        assert_eq!(session.current_document(), None);
        assert_eq!(session.marked_document(), None);
        assert!(session.snippets().is_empty());
        assert!(!session.index().contains("todo"));
        assert!(sync.backend().load_document("todo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_export() {
        let dir = tempfile::TempDir::new().unwrap();
        let backend = crate::backend::Library::new(crate::backend::MemStorage::new(), dir.path());
        backend.submit("todo", "a").await.unwrap();
        let mut sync = sync_with(backend, MemorySettings::new());

        assert_eq!(sync.export().await.as_deref(), Some(dir.path()));
        assert!(dir.path().join("todo.md").exists());
    }
}
