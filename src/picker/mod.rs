//! Command picker
//!
//! A modal fuzzy-search surface that chooses the target document for one of
//! four actions. It lives inside the registry session and is pure:
//! committing resolves to a [`PickerAction`] and the synchronizer performs it.
//!
//! ```text
//!            open(mode, target)
//!   Closed ──────────────────────▶ Open(mode, target)
//!     ▲                               │  input(text) → re-rank, stay open
//!     │      cancel()                 │
//!     ├───────────────────────────────┤
//!     │      commit()                 │
//!     └───────────────────────────────┘
//!            top hit → Apply(action)
//!            no hits → NoMatch
//! ```
//!
//! Opening while already open replaces the live state; pickers never stack.

use crate::db::SnippetId;
use crate::search::{DEFAULT_LIMIT, SearchHit, SearchIndex};
use thiserror::Error;

/// What a committed picker does with its top hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickerMode {
    /// Make the hit the backend's marked document
    MarkDocument,
    /// Open the hit in the browse view
    SetCurrentDocument,
    /// Delete the hit
    DeleteDocument,
    /// Move the target snippet into the hit
    MoveSnippet,
}

impl PickerMode {
    /// Prompt shown above the query field.
    #[must_use]
    pub const fn prompt(&self) -> &'static str {
        match self {
            Self::MarkDocument => "Mark document:",
            Self::SetCurrentDocument => "Open document:",
            Self::DeleteDocument => "Delete document:",
            Self::MoveSnippet => "Move snippet to:",
        }
    }

    /// Name accepted on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MarkDocument => "mark",
            Self::SetCurrentDocument => "open",
            Self::DeleteDocument => "delete",
            Self::MoveSnippet => "move",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::MarkDocument,
            Self::SetCurrentDocument,
            Self::DeleteDocument,
            Self::MoveSnippet,
        ]
        .into_iter()
        .find(|mode| mode.name() == name)
    }
}

impl std::fmt::Display for PickerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickerError {
    /// `MoveSnippet` was opened without a snippet to move
    #[error("no snippet selected to move")]
    MissingTarget,
}

/// Live picker state; exists only while the picker is open.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerState {
    pub mode: PickerMode,
    pub target_snippet_id: Option<SnippetId>,
    pub query: String,
    pub ranked_results: Vec<SearchHit>,
}

impl PickerState {
    #[must_use]
    pub fn top_result(&self) -> Option<&SearchHit> {
        self.ranked_results.first()
    }
}

/// Effect chosen by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction {
    MarkDocument(String),
    SetCurrentDocument(String),
    DeleteDocument(String),
    MoveSnippet { id: SnippetId, document: String },
}

impl PickerAction {
    /// Document the action targets.
    #[must_use]
    pub fn document(&self) -> &str {
        match self {
            Self::MarkDocument(name)
            | Self::SetCurrentDocument(name)
            | Self::DeleteDocument(name)
            | Self::MoveSnippet { document: name, .. } => name,
        }
    }
}

/// Result of committing an open picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerCommit {
    Apply(PickerAction),
    /// No ranked results; nothing to apply
    NoMatch { mode: PickerMode, query: String },
}

/// The picker state machine.
#[derive(Debug)]
pub struct CommandPicker {
    state: Option<PickerState>,
    limit: usize,
}

impl Default for CommandPicker {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl CommandPicker {
    /// Closed picker returning at most `limit` results per query.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self { state: None, limit }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.state.is_some()
    }

    #[must_use]
    pub const fn state(&self) -> Option<&PickerState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn mode(&self) -> Option<PickerMode> {
        self.state.as_ref().map(|state| state.mode)
    }

    /// Open in `mode`, replacing any live state.
    ///
    /// Returns the replaced state, if there was one.
    ///
    /// # Errors
    ///
    /// Returns `PickerError::MissingTarget` if `mode` is `MoveSnippet` and
    /// `target` is `None`. The picker is left unchanged.
    pub fn open(
        &mut self,
        mode: PickerMode,
        target: Option<SnippetId>,
    ) -> Result<Option<PickerState>, PickerError> {
        if mode == PickerMode::MoveSnippet && target.is_none() {
            return Err(PickerError::MissingTarget);
        }

        let target_snippet_id = if mode == PickerMode::MoveSnippet {
            target
        } else {
            None
        };

        tracing::debug!(%mode, ?target_snippet_id, "picker opened");
        Ok(self.state.replace(PickerState {
            mode,
            target_snippet_id,
            query: String::new(),
            ranked_results: Vec::new(),
        }))
    }

    /// Take the full query text and re-rank immediately.
    ///
    /// Ignored while closed.
    pub fn input(&mut self, text: &str, index: &mut SearchIndex) {
        let limit = self.limit;
        if let Some(state) = self.state.as_mut() {
            state.query = text.to_string();
            state.ranked_results = index.search(text, limit);
        }
    }

    /// Close and resolve the top-ranked result into an action.
    ///
    /// Returns `None` if the picker was not open.
    pub fn commit(&mut self) -> Option<PickerCommit> {
        let state = self.state.take()?;

        let Some(hit) = state.top_result() else {
            tracing::debug!(mode = %state.mode, query = %state.query, "picker committed with no match");
            return Some(PickerCommit::NoMatch {
                mode: state.mode,
                query: state.query,
            });
        };

        let document = hit.name.clone();
        let action = match (state.mode, state.target_snippet_id) {
            (PickerMode::MarkDocument, _) => PickerAction::MarkDocument(document),
            (PickerMode::SetCurrentDocument, _) => PickerAction::SetCurrentDocument(document),
            (PickerMode::DeleteDocument, _) => PickerAction::DeleteDocument(document),
            (PickerMode::MoveSnippet, Some(id)) => PickerAction::MoveSnippet { id, document },
            // open() refuses MoveSnippet without a target
            (PickerMode::MoveSnippet, None) => {
                return Some(PickerCommit::NoMatch {
                    mode: state.mode,
                    query: state.query,
                });
            }
        };

        tracing::debug!(?action, "picker committed");
        Some(PickerCommit::Apply(action))
    }

    /// Close without applying anything.
    pub fn cancel(&mut self) -> Option<PickerState> {
        let state = self.state.take();
        if let Some(state) = &state {
            tracing::debug!(mode = %state.mode, "picker cancelled");
        }
        state
    }
}
