//! Conversation history.

pub mod store;

pub use store::{ArchiveOutcome, HistoryStore};
