//! Chat message model.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format used for the per-message time label (e.g. `09:41 AM`).
pub const TIME_LABEL_FORMAT: &str = "%I:%M %p";

/// Author of a chat message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Sender {
    /// Text typed (or picked) by the user.
    #[serde(rename = "user")]
    User,
    /// Canned reply from the bot.
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

impl Sender {
    /// Stable string form for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "ai",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single message in a session. Never mutated after creation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message.
    pub sender: Sender,
    /// Message body.
    pub text: String,
    /// Local wall-clock label of when the message was created.
    #[serde(rename = "time")]
    pub timestamp: String,
}

impl Message {
    /// Build a user message stamped with the current local time.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::at(Sender::User, text, Local::now())
    }

    /// Build an assistant message stamped with the current local time.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::at(Sender::Assistant, text, Local::now())
    }

    /// Build a message with an explicit creation time.
    #[must_use]
    pub fn at(sender: Sender, text: impl Into<String>, now: DateTime<Local>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: time_label(now),
        }
    }
}

/// Render the time label shown next to a message.
#[must_use]
pub fn time_label(now: DateTime<Local>) -> String {
    now.format(TIME_LABEL_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sender_wire_names() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Sender::Assistant).unwrap(), "\"ai\"");
        let parsed: Sender = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(parsed, Sender::Assistant);
    }

    #[test]
    fn test_time_label_format() {
        let when = Local.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap();
        let message = Message::at(Sender::User, "hello", when);
        assert_eq!(message.timestamp, "02:05 PM");
        assert_eq!(message.sender, Sender::User);
    }

    #[test]
    fn test_message_uses_time_field_on_the_wire() {
        let when = Local.with_ymd_and_hms(2026, 10, 19, 9, 41, 0).unwrap();
        let message = Message::at(Sender::Assistant, "hi", when);
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["sender"], "ai");
        assert_eq!(value["time"], "09:41 AM");
        assert!(value.get("timestamp").is_none());
    }
}
