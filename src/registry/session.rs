//! Registry session
//!
//! The client-side cache between the backend and the presentation layer.
//! One `RegistrySession` exists per visit to the document view. The
//! synchronizer's `enter` builds it and `leave` consumes it; in between the
//! controller lends it by `&mut` to every operation. It also owns the one
//! command picker, so at most one picker state is ever live.
//!
//! # Invariants
//!
//! - Loading a document replaces the held snippets; nothing is merged.
//! - Snippet ids in the held set are unique.
//! - The search index holds exactly the known document names after every
//!   mutation that changes them (full rebuild, no incremental removal).
//! - When a document is forgotten, a current or marked pointer naming it is
//!   reset to `None`; if it was the open document its snippets are dropped.
//! - The selection always names a held snippet or is `None`.

use super::models::{RegistryView, Snippet};
use super::pending::{PendingKey, PendingLedger};
use crate::db::SnippetId;
use crate::picker::{CommandPicker, PickerError, PickerMode};
use crate::search::{DEFAULT_LIMIT, DEFAULT_THRESHOLD, SearchHit, SearchIndex};
use std::collections::BTreeSet;

/// Pointers reset by [`RegistrySession::forget_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerReset {
    pub current: bool,
    pub marked: bool,
}

#[derive(Debug)]
pub struct RegistrySession {
    current_document: Option<String>,
    marked_document: Option<String>,
    snippets: Vec<Snippet>,
    selected: Option<SnippetId>,
    known_documents: BTreeSet<String>,
    index: SearchIndex,
    picker: CommandPicker,
    pending: PendingLedger,
}

impl RegistrySession {
    /// Empty session whose index uses `threshold` and whose picker shows at
    /// most `limit` results.
    #[must_use]
    pub fn new(threshold: f64, limit: usize) -> Self {
        Self {
            current_document: None,
            marked_document: None,
            snippets: Vec::new(),
            selected: None,
            known_documents: BTreeSet::new(),
            index: SearchIndex::new(threshold),
            picker: CommandPicker::new(limit),
            pending: PendingLedger::new(),
        }
    }

    // ========================================================================
    // Pointers
    // ========================================================================

    #[must_use]
    pub fn current_document(&self) -> Option<&str> {
        self.current_document.as_deref()
    }

    #[must_use]
    pub fn marked_document(&self) -> Option<&str> {
        self.marked_document.as_deref()
    }

    pub fn set_marked_document(&mut self, name: Option<String>) {
        self.marked_document = name;
    }

    /// Open `name` with `snippets`, replacing whatever was held.
    pub fn replace_document(&mut self, name: impl Into<String>, snippets: Vec<Snippet>) {
        let name = name.into();
        self.known_documents.insert(name.clone());
        if !self.index.contains(&name) {
            self.rebuild_index();
        }

        let mut seen = BTreeSet::new();
        self.snippets = snippets
            .into_iter()
            .filter(|snippet| {
                let fresh = seen.insert(snippet.id);
                if !fresh {
                    tracing::warn!(document = %name, id = snippet.id, "dropping duplicate snippet id");
                }
                fresh
            })
            .collect();
        self.current_document = Some(name);
        self.retain_selection();
    }

    /// Close the open document and drop its snippets.
    pub fn clear_document(&mut self) {
        self.current_document = None;
        self.snippets.clear();
        self.selected = None;
    }

    // ========================================================================
    // Snippets
    // ========================================================================

    #[must_use]
    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    #[must_use]
    pub fn snippet(&self, id: SnippetId) -> Option<&Snippet> {
        self.snippets.iter().find(|snippet| snippet.id == id)
    }

    pub fn snippet_mut(&mut self, id: SnippetId) -> Option<&mut Snippet> {
        self.snippets.iter_mut().find(|snippet| snippet.id == id)
    }

    /// Remove a held snippet, clearing the selection if it pointed there.
    pub fn remove_snippet(&mut self, id: SnippetId) -> Option<Snippet> {
        let position = self.snippets.iter().position(|snippet| snippet.id == id)?;
        let removed = self.snippets.remove(position);
        self.retain_selection();
        Some(removed)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    #[must_use]
    pub const fn selected(&self) -> Option<SnippetId> {
        self.selected
    }

    #[must_use]
    pub fn selected_snippet(&self) -> Option<&Snippet> {
        self.selected.and_then(|id| self.snippet(id))
    }

    /// Select a held snippet. Returns `false` (selection unchanged) if `id`
    /// is not held.
    pub fn select(&mut self, id: SnippetId) -> bool {
        if self.snippet(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Move the selection down, starting at the first snippet.
    pub fn select_next(&mut self) -> Option<SnippetId> {
        let next = match self.selected_position() {
            Some(position) => (position + 1).min(self.snippets.len().saturating_sub(1)),
            None => 0,
        };
        self.selected = self.snippets.get(next).map(|snippet| snippet.id);
        self.selected
    }

    /// Move the selection up, starting at the last snippet.
    pub fn select_previous(&mut self) -> Option<SnippetId> {
        let previous = match self.selected_position() {
            Some(position) => position.saturating_sub(1),
            None => self.snippets.len().saturating_sub(1),
        };
        self.selected = self.snippets.get(previous).map(|snippet| snippet.id);
        self.selected
    }

    fn selected_position(&self) -> Option<usize> {
        let id = self.selected?;
        self.snippets.iter().position(|snippet| snippet.id == id)
    }

    fn retain_selection(&mut self) {
        if self.selected.is_some() && self.selected_position().is_none() {
            self.selected = None;
        }
    }

    // ========================================================================
    // Known documents and search
    // ========================================================================

    /// Replace the known document names and rebuild the index.
    pub fn set_known_documents<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_documents = names.into_iter().map(Into::into).collect();
        self.rebuild_index();
    }

    /// Record a document created during this session.
    pub fn add_known_document(&mut self, name: impl Into<String>) {
        if self.known_documents.insert(name.into()) {
            self.rebuild_index();
        }
    }

    /// Drop a deleted document: unindex it and reset pointers naming it.
    pub fn forget_document(&mut self, name: &str) -> PointerReset {
        self.known_documents.remove(name);
        self.rebuild_index();
        self.pending.forget(&PendingKey::Document(name.to_string()));

        let mut reset = PointerReset::default();
        if self.current_document.as_deref() == Some(name) {
            for snippet in &self.snippets {
                self.pending.forget(&PendingKey::Snippet(snippet.id));
            }
            self.clear_document();
            reset.current = true;
        }
        if self.marked_document.as_deref() == Some(name) {
            self.marked_document = None;
            reset.marked = true;
        }
        reset
    }

    #[must_use]
    pub fn known_documents(&self) -> &BTreeSet<String> {
        &self.known_documents
    }

    #[must_use]
    pub const fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub fn search(&mut self, query: &str, limit: usize) -> Vec<SearchHit> {
        self.index.search(query, limit)
    }

    fn rebuild_index(&mut self) {
        self.index.rebuild(self.known_documents.iter().cloned());
    }

    // ========================================================================
    // Picker
    // ========================================================================

    #[must_use]
    pub const fn picker(&self) -> &CommandPicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut CommandPicker {
        &mut self.picker
    }

    /// Open the picker over this session's index.
    ///
    /// # Errors
    ///
    /// Returns `PickerError::MissingTarget` if `MoveSnippet` is opened
    /// without a target snippet.
    pub fn open_picker(&mut self, mode: PickerMode, target: Option<SnippetId>) -> Result<(), PickerError> {
        if let Some(replaced) = self.picker.open(mode, target)? {
            tracing::debug!(replaced = %replaced.mode, "picker replaced");
        }
        Ok(())
    }

    /// Feed the picker's query field.
    pub fn picker_input(&mut self, text: &str) {
        self.picker.input(text, &mut self.index);
    }

    // ========================================================================
    // Pending mutations and view
    // ========================================================================

    #[must_use]
    pub const fn pending(&self) -> &PendingLedger {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut PendingLedger {
        &mut self.pending
    }

    /// Snapshot for rendering, including the picker if one is open.
    #[must_use]
    pub fn view(&self) -> RegistryView {
        RegistryView {
            current_document: self.current_document.clone(),
            marked_document: self.marked_document.clone(),
            snippets: self.snippets.clone(),
            selected: self.selected,
            picker: self.picker.state().cloned(),
            pending: self.pending.snapshot(),
        }
    }
}

impl Default for RegistrySession {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_LIMIT)
    }
}
