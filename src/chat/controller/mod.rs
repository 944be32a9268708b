//! Conversation state machine.

pub mod core;

pub use self::core::{ChatBackends, ChatController, DisplayMode, FeedbackDraft, SUGGESTED_QUESTIONS};
