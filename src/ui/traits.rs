//! Seams between the registry and whatever draws it.

use crate::registry::RegistryView;

/// Severity of a transient message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Info(message) | Self::Error(message) => message,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Receives registry snapshots and user-facing notices.
///
/// Every synchronous registry mutation is followed by a `render` carrying the
/// full state, so implementations never need to diff.
pub trait Presenter {
    fn render(&mut self, view: &RegistryView);

    fn notify(&mut self, notice: Notice);
}

/// Turns raw snippet text into its display form.
pub trait SnippetRenderer {
    fn render(&self, raw: &str) -> String;
}

/// Identity renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainRenderer;

impl SnippetRenderer for PlainRenderer {
    fn render(&self, raw: &str) -> String {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_renderer_is_identity() {
        assert_eq!(PlainRenderer.render("# heading\n*text*"), "# heading\n*text*");
    }

    #[test]
    fn test_notice_accessors() {
        let notice = Notice::error("backend offline");
        assert!(notice.is_error());
        assert_eq!(notice.to_string(), "backend offline");
        assert!(!Notice::info("ok").is_error());
    }
}
