//! Chat engine: canned-response matching, sessions, and persistent history.
//!
//! The [`ChatController`] drives a single conversation. It asks a
//! [`Responder`] for replies and mirrors every change of the active
//! session into the [`HistoryStore`], which writes through to a
//! [`KeyValueStore`] via the fail-soft [`PersistentState`] adapter.

pub mod controller;
pub mod core;
pub mod history;
pub mod matcher;
pub mod storage;

pub use controller::{ChatBackends, ChatController, DisplayMode, FeedbackDraft, SUGGESTED_QUESTIONS};
pub use self::core::{
    ChatConfig, ChatError, ChatResult, Message, Rating, Sender, Session, SessionId, Theme,
};
pub use history::{ArchiveOutcome, HistoryStore};
pub use matcher::{Matcher, QaPair, Responder};
pub use storage::{InMemoryKvStore, KeyValueStore, PersistentState, SqliteKvStore};
