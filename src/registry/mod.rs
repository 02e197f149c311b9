//! Document/snippet registry
//!
//! In-memory cache of the open document and its pointers, plus the search
//! index, the command picker and the ledger of optimistic mutations.

pub mod models;
pub mod pending;
pub mod session;

pub use models::{RegistryView, Snippet};
pub use pending::{PendingKey, PendingLedger, PendingState, Ticket};
pub use session::{PointerReset, RegistrySession};
