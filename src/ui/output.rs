//! Terminal presenter
//!
//! A command-line invocation draws once, at the end, so renders are buffered
//! and only the latest one is printed by [`TerminalPresenter::flush`].
//! Notices are printed as they arrive (errors to stderr); quiet mode drops
//! informational ones.

use super::traits::{Notice, Presenter};
use crate::registry::{PendingState, RegistryView};
use colored::Colorize;

#[derive(Debug, Default)]
pub struct TerminalPresenter {
    latest: Option<RegistryView>,
    quiet: bool,
}

impl TerminalPresenter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: None,
            quiet: false,
        }
    }

    /// Suppress informational notices
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    #[must_use]
    pub const fn latest(&self) -> Option<&RegistryView> {
        self.latest.as_ref()
    }

    /// Print the latest view and forget it.
    pub fn flush(&mut self) {
        if let Some(view) = self.latest.take() {
            print!("{}", format_view(&view));
        }
    }
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, view: &RegistryView) {
        self.latest = Some(view.clone());
    }

    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::Info(_) if self.quiet => {}
            Notice::Info(message) => println!("{} {}", "✓".green(), message),
            Notice::Error(message) => eprintln!("{} {}", "❌".red(), message),
        }
    }
}

/// Plain-text layout of a view: marked label, document heading, snippets.
#[must_use]
pub fn format_view(view: &RegistryView) -> String {
    let mut out = String::new();

    if let Some(marked) = &view.marked_document {
        out.push_str(&format!("{} {}\n", "marked:".dimmed(), marked.yellow()));
    }

    let Some(current) = &view.current_document else {
        out.push_str(&format!("{}\n", "No document open".dimmed()));
        return out;
    };

    out.push_str(&format!("{}\n", current.bold().cyan()));
    if view.snippets.is_empty() {
        out.push_str(&format!("  {}\n", "(empty)".dimmed()));
    }

    for snippet in &view.snippets {
        let marker = if view.selected == Some(snippet.id) { ">" } else { " " };
        let pending = match view.pending.get(&crate::registry::PendingKey::Snippet(snippet.id)) {
            Some(PendingState::InFlight) => format!(" {}", "…".yellow()),
            Some(PendingState::Failed(_)) => format!(" {}", "!".red()),
            None => String::new(),
        };
        let id = format!("[{}]", snippet.id);
        let mut lines = snippet.rendered_view.lines();
        let first = lines.next().unwrap_or_default();
        out.push_str(&format!("{marker} {} {first}{pending}\n", id.dimmed()));
        let indent = " ".repeat(id.len() + 3);
        for line in lines {
            out.push_str(&format!("{indent}{line}\n"));
        }
    }

    out
}
