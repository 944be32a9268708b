//! Conversation controller: the state machine behind the chat view.

use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chat::core::config::{ChatConfig, StorageBackend};
use crate::chat::core::errors::ChatResult;
use crate::chat::core::ids::SessionId;
use crate::chat::core::message::Message;
use crate::chat::core::session::{Rating, Session};
use crate::chat::history::store::{ArchiveOutcome, HistoryStore};
use crate::chat::matcher::dataset::load_dataset;
use crate::chat::matcher::responder::{Matcher, Responder};
use crate::chat::storage::kv_store::{InMemoryKvStore, KeyValueStore, SqliteKvStore};
use crate::chat::storage::persistent::PersistentState;

/// Prompts offered on the welcome screen.
pub const SUGGESTED_QUESTIONS: [&str; 5] = [
    "Hi, how are you?",
    "What is the virtual DOM?",
    "Can you explain RESTful APIs?",
    "What is a Promise in JavaScript?",
    "How do you handle errors in async/await?",
];

/// What the view should currently show.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// No messages yet; suggestions are shown.
    #[default]
    Welcome,
    /// A conversation is in progress.
    Active,
    /// Read-only list of archived sessions; input is hidden.
    History,
}

/// Rating and comment being edited before they are saved.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct FeedbackDraft {
    /// Pending star rating.
    pub rating: Option<Rating>,
    /// Pending comment.
    pub comment: String,
}

impl FeedbackDraft {
    fn clear(&mut self) {
        self.rating = None;
        self.comment.clear();
    }
}

/// Backend dependencies for the controller.
pub struct ChatBackends {
    /// Key-value store holding the history.
    pub store: Arc<dyn KeyValueStore>,
    /// Reply generator.
    pub responder: Arc<dyn Responder>,
}

impl ChatBackends {
    /// Build backends from config.
    ///
    /// If the `SQLite` file cannot be opened the history lives in memory for
    /// this run and a warning is logged.
    ///
    /// # Errors
    /// Returns an error if the dataset cannot be loaded.
    pub async fn from_config(config: &ChatConfig) -> ChatResult<Self> {
        let store: Arc<dyn KeyValueStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(InMemoryKvStore::from_config(&config.storage)),
            StorageBackend::Sqlite => match SqliteKvStore::new(&config.storage).await {
                Ok(store) => {
                    info!(path = %config.storage.sqlite_path.display(), "Opened SQLite store");
                    Arc::new(store)
                }
                Err(err) => {
                    warn!(
                        path = %config.storage.sqlite_path.display(),
                        error = %err,
                        "SQLite store unavailable, history will not survive a restart"
                    );
                    Arc::new(InMemoryKvStore::from_config(&config.storage))
                }
            },
        };

        let pairs = load_dataset(config.matcher.dataset_path.as_deref())?;
        let matcher = Matcher::with_fallback(pairs, config.matcher.fallback_response.clone());
        info!(triggers = matcher.len(), "Matcher ready");
        let responder = Arc::new(matcher);

        Ok(Self { store, responder })
    }
}

/// Owns the active session and the history mirror.
pub struct ChatController {
    responder: Arc<dyn Responder>,
    history: HistoryStore,
    fallback: String,
    suggestions: Vec<String>,
    session: Session,
    draft: FeedbackDraft,
    mode: DisplayMode,
}

impl ChatController {
    /// Create a controller and load the history once.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub async fn new(config: &ChatConfig, backends: ChatBackends) -> ChatResult<Self> {
        config.validate()?;
        let persistence = PersistentState::new(backends.store);
        let history = HistoryStore::load(persistence, config.storage.history_key.clone()).await;

        Ok(Self {
            responder: backends.responder,
            history,
            fallback: config.matcher.fallback_response.clone(),
            suggestions: SUGGESTED_QUESTIONS.iter().map(|q| (*q).to_string()).collect(),
            session: Session::new(),
            draft: FeedbackDraft::default(),
            mode: DisplayMode::Welcome,
        })
    }

    /// Create a controller with backends built from config.
    ///
    /// # Errors
    /// Returns an error if the configuration or dataset is invalid.
    pub async fn from_config(config: &ChatConfig) -> ChatResult<Self> {
        let backends = ChatBackends::from_config(config).await?;
        Self::new(config, backends).await
    }

    /// The active session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Messages of the active session.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.session.messages
    }

    /// Current display mode.
    #[must_use]
    pub const fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Suggested prompts for the welcome screen.
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Pending feedback.
    #[must_use]
    pub const fn draft(&self) -> &FeedbackDraft {
        &self.draft
    }

    /// Archived sessions.
    #[must_use]
    pub const fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Archived sessions matching `rating` (all when `None`).
    #[must_use]
    pub fn filter_history(&self, rating: Option<Rating>) -> Vec<&Session> {
        self.history.filter_by_rating(rating)
    }

    /// Send user text and append the bot's reply.
    ///
    /// Blank input is ignored and returns `None`. Otherwise the user message
    /// is appended first, then the reply, and the session is re-archived after
    /// each append.
    pub async fn send_message(&mut self, input: &str) -> Option<Message> {
        if input.trim().is_empty() {
            debug!("Ignoring blank input");
            return None;
        }

        self.mode = DisplayMode::Active;
        self.append(Message::user(input)).await;

        let reply = self.responder.respond(input).await;
        let reply = if reply.trim().is_empty() {
            self.fallback.clone()
        } else {
            reply
        };

        let message = Message::assistant(reply);
        self.append(message.clone()).await;
        debug!(session_id = %self.session.id, messages = self.session.len(), "Reply appended");
        Some(message)
    }

    /// Send the suggested prompt at `index`.
    ///
    /// Suggestions are only offered on the welcome screen; outside it, and
    /// for unknown indices, this does nothing.
    pub async fn select_suggestion(&mut self, index: usize) -> Option<Message> {
        if self.mode != DisplayMode::Welcome {
            debug!(mode = ?self.mode, "Ignoring suggestion outside the welcome screen");
            return None;
        }
        let question = self.suggestions.get(index)?.clone();
        self.send_message(&question).await
    }

    /// Archive the current session and start an empty one.
    pub async fn start_new_chat(&mut self) {
        self.archive_current().await;
        self.reset_session();
        self.mode = DisplayMode::Welcome;
        info!(session_id = %self.session.id, "Started new chat");
    }

    /// Archive the current session and switch to the history list.
    pub async fn view_history(&mut self) {
        self.archive_current().await;
        self.mode = DisplayMode::History;
        debug!(sessions = self.history.len(), "Viewing history");
    }

    /// Set or clear the pending rating.
    pub fn set_rating(&mut self, rating: Option<Rating>) {
        self.draft.rating = rating;
    }

    /// Replace the pending comment.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.draft.comment = comment.into();
    }

    /// Commit the pending feedback to the session and archive it.
    ///
    /// Returns `false` without doing anything when the session has no messages.
    pub async fn save_feedback(&mut self) -> bool {
        if self.session.is_empty() {
            return false;
        }

        self.session.rating = self.draft.rating;
        self.session.feedback = std::mem::take(&mut self.draft.comment);
        self.draft.clear();
        self.archive().await;
        info!(
            session_id = %self.session.id,
            rating = ?self.session.rating.map(Rating::value),
            "Saved feedback"
        );
        true
    }

    /// Delete an archived session. Returns whether it existed.
    ///
    /// Deleting the active session also drops it from the controller, so it
    /// is not archived again; the mode moves from `Active` to `Welcome`.
    pub async fn remove_from_history(&mut self, id: SessionId) -> bool {
        let removed = self.history.remove(id).await;
        if id == self.session.id {
            self.reset_session();
            if self.mode == DisplayMode::Active {
                self.mode = DisplayMode::Welcome;
            }
            info!(session_id = %self.session.id, "Active session deleted, started new chat");
        }
        removed
    }

    fn reset_session(&mut self) {
        self.session = Session::new();
        self.draft.clear();
    }

    async fn append(&mut self, message: Message) {
        debug!(session_id = %self.session.id, sender = %message.sender, "Appending message");
        self.session.push(message);
        self.archive().await;
    }

    async fn archive_current(&mut self) -> Option<ArchiveOutcome> {
        if self.session.is_empty() {
            return None;
        }
        Some(self.archive().await)
    }

    /// Snapshot the session into the history, dated with the archive day.
    async fn archive(&mut self) -> ArchiveOutcome {
        self.session.stamp_date(Local::now());
        self.history.archive(&self.session).await
    }
}
