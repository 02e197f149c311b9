//! Input routing
//!
//! The controller is the entry point for user input. Key events are resolved
//! against the keybinding table and dispatched to the picker or the
//! synchronizer; text typed into the picker's query field arrives through
//! [`Controller::handle_query_input`].
//!
//! # Key handling
//!
//! ```text
//! key event
//!   ├─ picker open?
//!   │    ├─ opening command or close_picker → cancel
//!   │    └─ plain Enter                     → commit
//!   └─ first command (fixed order) whose chord matches → run it
//! ```

use crate::backend::Backend;
use crate::db::SnippetId;
use crate::keybinds::{Command, KeyInput, KeybindResolver};
use crate::picker::{PickerError, PickerMode};
use crate::registry::RegistrySession;
use crate::settings::SettingsStore;
use crate::synchronizer::ViewSynchronizer;
use crate::ui::{Notice, Presenter};

/// Commands tried against a key event, in order. `close_picker` only
/// applies while the picker is open.
const DISPATCH_ORDER: [Command; 9] = [
    Command::SubmitSnippet,
    Command::SwitchMenu,
    Command::CurrentDocumentPicker,
    Command::MarkedDocumentPicker,
    Command::DeleteDocumentPicker,
    Command::DeleteCurrentDocument,
    Command::MoveSelectedSnippet,
    Command::DeleteSelectedSnippet,
    Command::UpdateSelectedSnippet,
];

/// Which page is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Compose,
    Browse,
}

impl View {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Compose => Self::Browse,
            Self::Browse => Self::Compose,
        }
    }
}

/// What a key event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled(Command),
    /// Enter committed the open picker
    PickerCommitted(PickerMode),
    Navigate(View),
    Ignored,
}

/// The compose form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub snippet: String,
}

impl Draft {
    pub fn clear(&mut self) {
        self.title.clear();
        self.snippet.clear();
    }
}

pub struct Controller<B, S, P> {
    sync: ViewSynchronizer<B, S, P>,
    session: RegistrySession,
    resolver: KeybindResolver,
    view: View,
    draft: Draft,
    edit_buffer: Option<String>,
}

impl<B, S, P> Controller<B, S, P>
where
    B: Backend,
    S: SettingsStore,
    P: Presenter,
{
    /// Enter the document view and start routing input.
    pub async fn start(mut sync: ViewSynchronizer<B, S, P>) -> Self {
        let session = sync.enter().await;
        let resolver = KeybindResolver::from_settings(sync.settings());
        Self {
            sync,
            session,
            resolver,
            view: View::default(),
            draft: Draft::default(),
            edit_buffer: None,
        }
    }

    /// Leave the document view, returning the synchronizer.
    pub fn finish(mut self) -> ViewSynchronizer<B, S, P> {
        self.sync.leave(self.session);
        self.sync
    }

    pub const fn session(&self) -> &RegistrySession {
        &self.session
    }

    pub const fn synchronizer(&self) -> &ViewSynchronizer<B, S, P> {
        &self.sync
    }

    pub fn synchronizer_mut(&mut self) -> &mut ViewSynchronizer<B, S, P> {
        &mut self.sync
    }

    pub const fn resolver(&self) -> &KeybindResolver {
        &self.resolver
    }

    pub const fn view(&self) -> View {
        self.view
    }

    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn set_draft(&mut self, title: impl Into<String>, snippet: impl Into<String>) {
        self.draft.title = title.into();
        self.draft.snippet = snippet.into();
    }

    pub fn edit_buffer(&self) -> Option<&str> {
        self.edit_buffer.as_deref()
    }

    pub fn set_edit_buffer(&mut self, text: impl Into<String>) {
        self.edit_buffer = Some(text.into());
    }

    /// Load the selected snippet's text into the edit buffer.
    pub fn begin_edit(&mut self) -> bool {
        self.edit_buffer = self
            .session
            .selected_snippet()
            .map(|snippet| snippet.raw_text.clone());
        self.edit_buffer.is_some()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select a snippet of the open document. Returns `false` if it is not
    /// held.
    pub fn select(&mut self, id: SnippetId) -> bool {
        let selected = self.session.select(id);
        if selected {
            self.edit_buffer = None;
            self.sync.render(&self.session);
        }
        selected
    }

    pub fn select_next(&mut self) {
        self.session.select_next();
        self.edit_buffer = None;
        self.sync.render(&self.session);
    }

    pub fn select_previous(&mut self) {
        self.session.select_previous();
        self.edit_buffer = None;
        self.sync.render(&self.session);
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Route a key event.
    pub async fn handle_key(&mut self, event: &KeyInput) -> KeyOutcome {
        if let Some(mode) = self.session.picker().mode() {
            if let Some(command) = self.picker_close_command(mode, event) {
                self.sync.cancel_picker(&mut self.session);
                return KeyOutcome::Handled(command);
            }
            if is_plain_enter(event) {
                self.sync.commit_picker(&mut self.session).await;
                return KeyOutcome::PickerCommitted(mode);
            }
        }

        for command in DISPATCH_ORDER {
            if self.resolver.resolve(self.sync.settings_mut(), event, command.name()) {
                return self.run_command(command).await;
            }
        }
        KeyOutcome::Ignored
    }

    /// Feed the picker query field; re-ranks and renders on every call.
    pub fn handle_query_input(&mut self, text: &str) {
        if !self.session.picker().is_open() {
            return;
        }
        self.session.picker_input(text);
        self.sync.render(&self.session);
    }

    /// Open a known document in the browse view. Returns `false` if the
    /// name is not a known document.
    pub async fn open_document(&mut self, name: &str) -> bool {
        if !self.session.known_documents().contains(name) {
            return false;
        }
        self.sync.open_document(&mut self.session, name).await;
        true
    }

    /// Commit the open picker as if Enter was pressed.
    pub async fn commit_picker(&mut self) -> bool {
        self.sync.commit_picker(&mut self.session).await
    }

    /// Run a command directly, bypassing key resolution.
    pub async fn run_command(&mut self, command: Command) -> KeyOutcome {
        tracing::debug!(command = command.name(), "running command");

        if let Some(mode) = command.picker_mode() {
            self.open_picker(mode);
            return KeyOutcome::Handled(command);
        }

        match command {
            Command::SubmitSnippet => self.submit_draft().await,
            Command::SwitchMenu => {
                self.view = self.view.toggled();
                return KeyOutcome::Navigate(self.view);
            }
            Command::DeleteCurrentDocument => {
                self.sync.delete_current_document(&mut self.session).await;
            }
            Command::DeleteSelectedSnippet => {
                let Some(id) = self.session.selected() else {
                    self.sync.notify(Notice::info("No snippet selected"));
                    return KeyOutcome::Handled(command);
                };
                self.sync.delete_snippet(&mut self.session, id).await;
                self.edit_buffer = None;
            }
            Command::UpdateSelectedSnippet => {
                let Some(id) = self.session.selected() else {
                    self.sync.notify(Notice::info("No snippet selected"));
                    return KeyOutcome::Handled(command);
                };
                let Some(text) = self.edit_buffer.take() else {
                    self.sync.notify(Notice::info("Nothing to save"));
                    return KeyOutcome::Handled(command);
                };
                self.sync.update_snippet(&mut self.session, id, &text).await;
            }
            Command::ClosePicker => self.sync.cancel_picker(&mut self.session),
            Command::CurrentDocumentPicker
            | Command::MarkedDocumentPicker
            | Command::DeleteDocumentPicker
            | Command::MoveSelectedSnippet => {}
        }
        KeyOutcome::Handled(command)
    }

    fn open_picker(&mut self, mode: PickerMode) {
        let target = self.session.selected();
        match self.session.open_picker(mode, target) {
            Ok(()) => self.sync.render(&self.session),
            Err(PickerError::MissingTarget) => {
                self.sync.notify(Notice::info("Select a snippet to move first"));
            }
        }
    }

    async fn submit_draft(&mut self) {
        if self.draft.snippet.trim().is_empty() {
            self.sync.notify(Notice::info("Nothing to submit"));
            return;
        }

        let created = self
            .sync
            .create_snippet(&mut self.session, &self.draft.title, &self.draft.snippet)
            .await;
        if created.is_some() {
            self.draft.clear();
        }
    }

    /// The command that cancels an open picker in `mode`, if `event` is one.
    fn picker_close_command(&mut self, mode: PickerMode, event: &KeyInput) -> Option<Command> {
        [Command::opening(mode), Command::ClosePicker]
            .into_iter()
            .find(|command| self.resolver.resolve(self.sync.settings_mut(), event, command.name()))
    }
}

fn is_plain_enter(event: &KeyInput) -> bool {
    event.key.eq_ignore_ascii_case("enter")
        && !(event.ctrl_key || event.shift_key || event.alt_key || event.meta_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybinds::config::KEYBINDS_KEY;
    use crate::settings::{CURRENT_DOCUMENT_KEY, MemorySettings};
    use crate::testing::{TestController, memory_backend, sync_with};

    async fn controller_with(docs: &[(&str, &str)], current: Option<&str>) -> TestController {
        let backend = memory_backend();
        for (title, text) in docs {
            backend.submit(title, text).await.unwrap();
        }
        let mut settings = MemorySettings::new();
        if let Some(current) = current {
            settings = settings.with(CURRENT_DOCUMENT_KEY, current);
        }
        Controller::start(sync_with(backend, settings)).await
    }

    #[tokio::test]
    async fn test_switch_menu_toggles_view() {
        let mut controller = controller_with(&[], None).await;
        assert_eq!(controller.view(), View::Compose);

        let outcome = controller.handle_key(&KeyInput::ctrl("t")).await;
        assert_eq!(outcome, KeyOutcome::Navigate(View::Browse));

        let outcome = controller.handle_key(&KeyInput::ctrl("T")).await;
        assert_eq!(outcome, KeyOutcome::Navigate(View::Compose));
    }

    #[tokio::test]
    async fn test_unbound_key_is_ignored() {
        let mut controller = controller_with(&[], None).await;
        let outcome = controller.handle_key(&KeyInput::key("x")).await;
        assert_eq!(outcome, KeyOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_submit_clears_draft() {
        let mut controller = controller_with(&[], None).await;
        controller.set_draft("todo", "buy milk");

        let outcome = controller.handle_key(&KeyInput::ctrl("Enter")).await;

        assert_eq!(outcome, KeyOutcome::Handled(Command::SubmitSnippet));
        assert_eq!(controller.draft(), &Draft::default());
        assert_eq!(controller.session().current_document(), Some("todo"));
    }

    #[tokio::test]
    async fn test_empty_draft_is_not_submitted() {
        let mut controller = controller_with(&[], None).await;
        controller.set_draft("todo", "  ");

        controller.handle_key(&KeyInput::ctrl("Enter")).await;

        assert_eq!(controller.session().current_document(), None);
        assert!(controller.synchronizer().presenter().errors().is_empty());
        assert_eq!(controller.draft().title, "todo");
    }

    #[tokio::test]
    async fn test_picker_open_query_commit() {
        let mut controller = controller_with(&[("todo", "a"), ("ideas", "b")], None).await;

        let outcome = controller.handle_key(&KeyInput::ctrl("e")).await;
        assert_eq!(outcome, KeyOutcome::Handled(Command::CurrentDocumentPicker));
        assert!(controller.session().picker().is_open());

        controller.handle_query_input("idea");
        let outcome = controller.handle_key(&KeyInput::key("Enter")).await;

        assert_eq!(outcome, KeyOutcome::PickerCommitted(PickerMode::SetCurrentDocument));
        assert!(!controller.session().picker().is_open());
        assert_eq!(controller.session().current_document(), Some("ideas"));
    }

    #[tokio::test]
    async fn test_opening_chord_toggles_picker_closed() {
        let mut controller = controller_with(&[("todo", "a")], None).await;
        controller.handle_key(&KeyInput::ctrl("m")).await;
        controller.handle_query_input("todo");

        let outcome = controller.handle_key(&KeyInput::ctrl("m")).await;

        assert_eq!(outcome, KeyOutcome::Handled(Command::MarkedDocumentPicker));
        assert!(!controller.session().picker().is_open());
        assert_eq!(controller.session().marked_document(), None);
    }

    #[tokio::test]
    async fn test_escape_cancels_picker() {
        let mut controller = controller_with(&[("todo", "a")], None).await;
        controller.handle_key(&KeyInput::ctrl("d").with_shift()).await;
        assert!(controller.session().picker().is_open());

        let outcome = controller.handle_key(&KeyInput::key("Escape")).await;
        assert_eq!(outcome, KeyOutcome::Handled(Command::ClosePicker));
        assert!(!controller.session().picker().is_open());
    }

    #[tokio::test]
    async fn test_other_picker_replaces_open_one() {
        let mut controller = controller_with(&[("todo", "a")], None).await;
        controller.handle_key(&KeyInput::ctrl("m")).await;
        controller.handle_key(&KeyInput::ctrl("e")).await;

        assert_eq!(
            controller.session().picker().mode(),
            Some(PickerMode::SetCurrentDocument)
        );
    }

    #[tokio::test]
    async fn test_move_requires_selection() {
        let mut controller = controller_with(&[("todo", "a")], Some("todo")).await;

        controller.handle_key(&KeyInput::ctrl("m").with_shift()).await;
        assert!(!controller.session().picker().is_open());

        let id = controller.session().snippets()[0].id;
        assert!(controller.select(id));
        controller.handle_key(&KeyInput::ctrl("m").with_shift()).await;
        let state = controller.session().picker().state().unwrap();
        assert_eq!(state.mode, PickerMode::MoveSnippet);
        assert_eq!(state.target_snippet_id, Some(id));
    }

    #[tokio::test]
    async fn test_update_selected_snippet_uses_edit_buffer() {
        let mut controller = controller_with(&[("todo", "a")], Some("todo")).await;
        controller.select_next();
        assert!(controller.begin_edit());
        assert_eq!(controller.edit_buffer(), Some("a"));

        controller.set_edit_buffer("a, edited");
        controller.handle_key(&KeyInput::ctrl("s")).await;

        assert_eq!(controller.session().snippets()[0].raw_text, "a, edited");
        assert_eq!(controller.edit_buffer(), None);
    }

    #[tokio::test]
    async fn test_delete_selected_snippet() {
        let mut controller = controller_with(&[("todo", "a"), ("todo", "b")], Some("todo")).await;
        controller.select_previous();

        let outcome = controller.handle_key(&KeyInput::ctrl("Delete")).await;

        assert_eq!(outcome, KeyOutcome::Handled(Command::DeleteSelectedSnippet));
        let texts: Vec<&str> = controller
            .session()
            .snippets()
            .iter()
            .map(|s| s.raw_text.as_str())
            .collect();
        assert_eq!(texts, vec!["a"]);
        assert_eq!(controller.session().selected(), None);
    }

    #[tokio::test]
    async fn test_user_override_replaces_default() {
        let backend = memory_backend();
        let settings = MemorySettings::new().with(KEYBINDS_KEY, r#"{"switch_menu":"Alt+m"}"#);
        let mut controller = Controller::start(sync_with(backend, settings)).await;

        assert_eq!(controller.handle_key(&KeyInput::ctrl("t")).await, KeyOutcome::Ignored);
        let outcome = controller.handle_key(&KeyInput::key("m").with_alt()).await;
        assert_eq!(outcome, KeyOutcome::Navigate(View::Browse));
    }

    #[tokio::test]
    async fn test_open_document_requires_known_name() {
        let mut controller = controller_with(&[("todo", "a")], None).await;

        assert!(!controller.open_document("nope").await);
        assert!(controller.open_document("todo").await);
        assert_eq!(controller.session().current_document(), Some("todo"));
    }

    #[tokio::test]
    async fn test_finish_returns_synchronizer() {
        let controller = controller_with(&[], None).await;
        let sync = controller.finish();
        assert_eq!(sync.presenter().renders.len(), 1);
    }
}
