//! Pending-mutation ledger
//!
//! Local state is changed before the backend acknowledges a mutation. The
//! ledger records, per entity, that such a change is outstanding (`InFlight`)
//! or was rejected (`Failed`). Each `begin` hands out a ticket; only the most
//! recent ticket for an entity may settle it, so a late acknowledgment of an
//! older request is ignored.
//!
//! ```text
//! begin(k) ──▶ InFlight(t2)
//!                 │ settle(k, t1, ..) → ignored (stale)
//!                 ├ settle(k, t2, Ok)  → entry removed
//!                 └ settle(k, t2, Err) → Failed(reason)
//! ```

use crate::db::SnippetId;
use std::collections::BTreeMap;

/// The entity a mutation touches.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PendingKey {
    Snippet(SnippetId),
    Document(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingState {
    InFlight,
    Failed(String),
}

/// Monotonic request ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct PendingLedger {
    next: u64,
    entries: BTreeMap<PendingKey, (Ticket, PendingState)>,
}

impl PendingLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` in flight and return the ticket that may settle it.
    pub fn begin(&mut self, key: PendingKey) -> Ticket {
        self.next += 1;
        let ticket = Ticket(self.next);
        self.entries.insert(key, (ticket, PendingState::InFlight));
        ticket
    }

    /// Settle a request. Returns `false` when `ticket` is no longer the latest
    /// for `key` and nothing changed.
    pub fn settle(&mut self, key: &PendingKey, ticket: Ticket, outcome: Result<(), String>) -> bool {
        match self.entries.get(key) {
            Some((latest, _)) if *latest == ticket => {}
            _ => {
                tracing::debug!(?key, ?ticket, "ignoring stale acknowledgment");
                return false;
            }
        }

        match outcome {
            Ok(()) => {
                self.entries.remove(key);
            }
            Err(reason) => {
                tracing::warn!(?key, %reason, "local state diverges from backend");
                self.entries.insert(key.clone(), (ticket, PendingState::Failed(reason)));
            }
        }
        true
    }

    #[must_use]
    pub fn state(&self, key: &PendingKey) -> Option<&PendingState> {
        self.entries.get(key).map(|(_, state)| state)
    }

    /// Drop the marker for an entity that no longer exists locally.
    pub fn forget(&mut self, key: &PendingKey) {
        self.entries.remove(key);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<PendingKey, PendingState> {
        self.entries
            .iter()
            .map(|(key, (_, state))| (key.clone(), state.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_clears_marker() {
        let mut ledger = PendingLedger::new();
        let key = PendingKey::Snippet(1);
        let ticket = ledger.begin(key.clone());

        assert_eq!(ledger.state(&key), Some(&PendingState::InFlight));
        assert!(ledger.settle(&key, ticket, Ok(())));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_failure_keeps_marker() {
        let mut ledger = PendingLedger::new();
        let key = PendingKey::Document("todo".into());
        let ticket = ledger.begin(key.clone());

        ledger.settle(&key, ticket, Err("offline".into()));
        assert_eq!(ledger.state(&key), Some(&PendingState::Failed("offline".into())));
    }

    #[test]
    fn test_stale_ticket_ignored() {
        let mut ledger = PendingLedger::new();
        let key = PendingKey::Snippet(7);
        let first = ledger.begin(key.clone());
        let second = ledger.begin(key.clone());

        assert!(!ledger.settle(&key, first, Err("late failure".into())));
        assert_eq!(ledger.state(&key), Some(&PendingState::InFlight));

        assert!(ledger.settle(&key, second, Ok(())));
        assert!(ledger.state(&key).is_none());
    }

    #[test]
    fn test_tickets_are_monotonic() {
        let mut ledger = PendingLedger::new();
        let a = ledger.begin(PendingKey::Snippet(1));
        let b = ledger.begin(PendingKey::Snippet(2));
        assert!(b > a);
    }
}
