//! Command names that keybindings resolve to.

use crate::picker::PickerMode;

/// Commands that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Submit the compose draft - Control+Enter
    SubmitSnippet,
    /// Toggle between the compose and browse views - Control+t
    SwitchMenu,

    /// Pick the document shown in the browse view - Control+e
    CurrentDocumentPicker,
    /// Pick the marked document - Control+m
    MarkedDocumentPicker,
    /// Pick a document to delete - Control+Shift+d
    DeleteDocumentPicker,
    /// Delete the document shown in the browse view - Control+Shift+Backspace
    DeleteCurrentDocument,

    /// Move the selected snippet to another document - Control+Shift+m
    MoveSelectedSnippet,
    /// Delete the selected snippet - Control+Delete
    DeleteSelectedSnippet,
    /// Save the edit buffer into the selected snippet - Control+s
    UpdateSelectedSnippet,

    /// Close the picker without applying anything - Escape
    ClosePicker,
}

impl Command {
    /// Every command, in the order the controller checks them.
    pub const ALL: [Self; 10] = [
        Self::SubmitSnippet,
        Self::SwitchMenu,
        Self::CurrentDocumentPicker,
        Self::MarkedDocumentPicker,
        Self::DeleteDocumentPicker,
        Self::DeleteCurrentDocument,
        Self::MoveSelectedSnippet,
        Self::DeleteSelectedSnippet,
        Self::UpdateSelectedSnippet,
        Self::ClosePicker,
    ];

    /// The name used in the keybinding tables.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SubmitSnippet => "submit_snippet",
            Self::SwitchMenu => "switch_menu",
            Self::CurrentDocumentPicker => "current_document_picker",
            Self::MarkedDocumentPicker => "marked_document_picker",
            Self::DeleteDocumentPicker => "delete_document_picker",
            Self::DeleteCurrentDocument => "delete_current_document",
            Self::MoveSelectedSnippet => "move_selected_snippet",
            Self::DeleteSelectedSnippet => "delete_selected_snippet",
            Self::UpdateSelectedSnippet => "update_selected_snippet",
            Self::ClosePicker => "close_picker",
        }
    }

    /// Look up a command by its table name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name)
    }

    /// The picker mode this command opens, if any.
    #[must_use]
    pub const fn picker_mode(&self) -> Option<PickerMode> {
        match self {
            Self::CurrentDocumentPicker => Some(PickerMode::SetCurrentDocument),
            Self::MarkedDocumentPicker => Some(PickerMode::MarkDocument),
            Self::DeleteDocumentPicker => Some(PickerMode::DeleteDocument),
            Self::MoveSelectedSnippet => Some(PickerMode::MoveSnippet),
            _ => None,
        }
    }

    /// The command that opens a picker in `mode`.
    #[must_use]
    pub const fn opening(mode: PickerMode) -> Self {
        match mode {
            PickerMode::SetCurrentDocument => Self::CurrentDocumentPicker,
            PickerMode::MarkDocument => Self::MarkedDocumentPicker,
            PickerMode::DeleteDocument => Self::DeleteDocumentPicker,
            PickerMode::MoveSnippet => Self::MoveSelectedSnippet,
        }
    }

    /// Returns whether this command needs a selected snippet to do anything.
    #[must_use]
    pub const fn requires_selection(&self) -> bool {
        matches!(
            self,
            Self::MoveSelectedSnippet | Self::DeleteSelectedSnippet | Self::UpdateSelectedSnippet
        )
    }

    /// Returns a human-readable description of the command.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::SubmitSnippet => "Submit snippet",
            Self::SwitchMenu => "Switch between compose and browse",
            Self::CurrentDocumentPicker => "Open a document",
            Self::MarkedDocumentPicker => "Mark a document",
            Self::DeleteDocumentPicker => "Delete a document",
            Self::DeleteCurrentDocument => "Delete the open document",
            Self::MoveSelectedSnippet => "Move selected snippet",
            Self::DeleteSelectedSnippet => "Delete selected snippet",
            Self::UpdateSelectedSnippet => "Save selected snippet",
            Self::ClosePicker => "Close picker",
        }
    }
}
