//! Presentation seam
//!
//! The registry never draws anything itself. After each change it hands a
//! [`RegistryView`](crate::registry::RegistryView) snapshot to a
//! [`Presenter`], and failures travel the same way as [`Notice`]s.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  ViewSynchronizer            │
//! └──────────────┬───────────────┘
//!                │ render / notify
//!                ▼
//! ┌──────────────────────────────┐
//! │  Presenter                   │
//! │  - TerminalPresenter (CLI)   │
//! │  - RecordingPresenter (test) │
//! └──────────────────────────────┘
//! ```

mod traits;

pub mod mock;
pub mod output;

pub use mock::RecordingPresenter;
pub use output::TerminalPresenter;
pub use traits::{Notice, PlainRenderer, Presenter, SnippetRenderer};
