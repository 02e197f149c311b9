//! Recording presenter for tests

use super::traits::{Notice, Presenter};
use crate::registry::RegistryView;

/// Presenter that keeps every render and notice it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    pub renders: Vec<RegistryView>,
    pub notices: Vec<Notice>,
}

impl RecordingPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent render, if any
    #[must_use]
    pub fn last_view(&self) -> Option<&RegistryView> {
        self.renders.last()
    }

    /// Messages of error notices, oldest first
    #[must_use]
    pub fn errors(&self) -> Vec<&str> {
        self.notices
            .iter()
            .filter(|notice| notice.is_error())
            .map(Notice::message)
            .collect()
    }

    pub fn clear(&mut self) {
        self.renders.clear();
        self.notices.clear();
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, view: &RegistryView) {
        self.renders.push(view.clone());
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_renders_and_notices() {
        let mut presenter = RecordingPresenter::new();
        presenter.render(&RegistryView::default());
        presenter.notify(Notice::info("saved"));
        presenter.notify(Notice::error("offline"));

        assert_eq!(presenter.renders.len(), 1);
        assert_eq!(presenter.errors(), vec!["offline"]);

        presenter.clear();
        assert!(presenter.last_view().is_none());
        assert!(presenter.notices.is_empty());
    }
}
