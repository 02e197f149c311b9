//! Registry data carried to the presentation layer.

use super::pending::{PendingKey, PendingState};
use crate::backend::SnippetEntry;
use crate::db::SnippetId;
use crate::picker::PickerState;
use crate::ui::SnippetRenderer;
use std::collections::BTreeMap;

/// A snippet of the open document as the client holds it.
///
/// `raw_text` is authoritative; `rendered_view` is derived from it and only
/// ever regenerated, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub id: SnippetId,
    pub raw_text: String,
    pub rendered_view: String,
}

impl Snippet {
    #[must_use]
    pub fn new(id: SnippetId, raw_text: impl Into<String>, renderer: &dyn SnippetRenderer) -> Self {
        let raw_text = raw_text.into();
        let rendered_view = renderer.render(&raw_text);
        Self {
            id,
            raw_text,
            rendered_view,
        }
    }

    #[must_use]
    pub fn from_entry(entry: SnippetEntry, renderer: &dyn SnippetRenderer) -> Self {
        Self::new(entry.id, entry.text, renderer)
    }

    /// Replace the raw text and re-derive the rendered view.
    pub fn set_text(&mut self, raw_text: impl Into<String>, renderer: &dyn SnippetRenderer) {
        self.raw_text = raw_text.into();
        self.rendered_view = renderer.render(&self.raw_text);
    }
}

/// Snapshot of everything a presenter draws.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryView {
    /// Open document; `None` suppresses the snippet region
    pub current_document: Option<String>,
    /// Marked document label; `None` suppresses the label
    pub marked_document: Option<String>,
    pub snippets: Vec<Snippet>,
    pub selected: Option<SnippetId>,
    /// Live picker, if one is open
    pub picker: Option<PickerState>,
    /// Mutations whose backend acknowledgment is outstanding or failed
    pub pending: BTreeMap<PendingKey, PendingState>,
}

impl RegistryView {
    /// The selected snippet, if it is still in the view.
    #[must_use]
    pub fn selected_snippet(&self) -> Option<&Snippet> {
        let id = self.selected?;
        self.snippets.iter().find(|snippet| snippet.id == id)
    }
}
