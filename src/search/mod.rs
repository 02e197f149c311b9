//! Fuzzy document search
//!
//! Maintains the index the command picker queries while the user types.

pub mod index;

pub use index::{DEFAULT_LIMIT, DEFAULT_THRESHOLD, SearchHit, SearchIndex};
