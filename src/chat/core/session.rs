//! Session state: one conversation and its feedback.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::chat::core::errors::{ChatError, ChatResult};
use crate::chat::core::ids::SessionId;
use crate::chat::core::message::Message;

/// Format used for the session date label (e.g. `Mon Oct 19 2026`).
pub const DATE_LABEL_FORMAT: &str = "%a %b %d %Y";

/// Label shown instead of the date for sessions created today.
pub const TODAY_LABEL: &str = "Today";

/// Star rating given to a conversation, `0..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Build a validated rating.
    ///
    /// # Errors
    /// Returns `ChatError::InvalidRating` if `value` is above [`Rating::MAX`].
    pub fn new(value: u8) -> ChatResult<Self> {
        if value > Self::MAX {
            return Err(ChatError::InvalidRating(value));
        }
        Ok(Self(value))
    }

    /// Raw star count.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = u8::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One conversation: ordered messages plus the feedback committed for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Stable identifier, shared by every archived snapshot of this session.
    pub id: SessionId,
    /// Creation day label.
    pub date: String,
    /// Messages in insertion order.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Committed rating; stored as `""` when unset.
    #[serde(default, with = "optional_rating")]
    pub rating: Option<Rating>,
    /// Committed free-text feedback.
    #[serde(default)]
    pub feedback: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Start an empty session with a fresh id, dated today.
    #[must_use]
    pub fn new() -> Self {
        Self::started_at(Local::now())
    }

    /// Start an empty session dated from `now`.
    #[must_use]
    pub fn started_at(now: DateTime<Local>) -> Self {
        Self {
            id: SessionId::new(),
            date: date_label(now),
            messages: Vec::new(),
            rating: None,
            feedback: String::new(),
        }
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Re-date the session to the day of `now`.
    ///
    /// Called on every archive, so a conversation that runs past midnight is
    /// listed under the day it was last saved.
    pub fn stamp_date(&mut self, now: DateTime<Local>) {
        self.date = date_label(now);
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the session has no messages yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Date to show in the history list: `Today` or the stored label.
    #[must_use]
    pub fn display_date(&self, today: &str) -> &str {
        if self.date == today {
            TODAY_LABEL
        } else {
            &self.date
        }
    }
}

/// Render the date label of a session.
#[must_use]
pub fn date_label(now: DateTime<Local>) -> String {
    now.format(DATE_LABEL_FORMAT).to_string()
}

/// Serde adapter for `rating: number | ""`.
mod optional_rating {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Rating;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Number(u8),
        Text(String),
    }

    pub fn serialize<S>(rating: &Option<Rating>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match rating {
            Some(rating) => rating.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Rating>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Stored>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Stored::Number(value)) => Rating::new(value)
                .map(Some)
                .map_err(serde::de::Error::custom),
            Some(Stored::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(Stored::Text(text)) => {
                let value: u8 = text.trim().parse().map_err(serde::de::Error::custom)?;
                Rating::new(value).map(Some).map_err(serde::de::Error::custom)
            }
        }
    }
}
