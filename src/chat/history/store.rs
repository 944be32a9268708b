//! Archived sessions, mirrored in memory and written through on every change.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::chat::core::ids::SessionId;
use crate::chat::core::session::{Rating, Session};
use crate::chat::storage::persistent::PersistentState;

/// What an archive call did to the history.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArchiveOutcome {
    /// The session was not archived before and was appended.
    Inserted,
    /// An earlier snapshot of the session was replaced in place.
    Updated,
}

/// Ordered collection of archived sessions keyed by [`SessionId`].
pub struct HistoryStore {
    persistence: PersistentState,
    key: String,
    sessions: Vec<Session>,
}

impl HistoryStore {
    /// Read the history stored under `key` once.
    ///
    /// Records are decoded one by one; a record that does not decode is
    /// skipped and dropped on the next write. Anything other than an array
    /// counts as empty.
    pub async fn load(persistence: PersistentState, key: impl Into<String>) -> Self {
        let key = key.into();
        let records: Vec<Value> = persistence.load(&key, Vec::new()).await;
        let total = records.len();

        let sessions: Vec<Session> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(session) => Some(session),
                Err(err) => {
                    warn!(key = %key, index, error = %err, "Skipping undecodable history record");
                    None
                }
            })
            .collect();

        info!(
            key = %key,
            sessions = sessions.len(),
            skipped = total - sessions.len(),
            "Loaded conversation history"
        );
        Self {
            persistence,
            key,
            sessions,
        }
    }

    /// All archived sessions in archive order.
    #[must_use]
    pub fn all(&self) -> &[Session] {
        &self.sessions
    }

    /// Sessions whose rating equals `rating`; all sessions when `rating` is `None`.
    ///
    /// Unrated sessions never match a numeric filter, including `0`.
    #[must_use]
    pub fn filter_by_rating(&self, rating: Option<Rating>) -> Vec<&Session> {
        match rating {
            None => self.sessions.iter().collect(),
            Some(wanted) => self
                .sessions
                .iter()
                .filter(|session| session.rating == Some(wanted))
                .collect(),
        }
    }

    /// Look up an archived session.
    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|session| session.id == id)
    }

    /// Number of archived sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether nothing is archived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Store a snapshot of `session`, replacing any earlier snapshot with the same id.
    pub async fn archive(&mut self, session: &Session) -> ArchiveOutcome {
        let outcome = match self.sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => {
                existing.clone_from(session);
                ArchiveOutcome::Updated
            }
            None => {
                self.sessions.push(session.clone());
                ArchiveOutcome::Inserted
            }
        };

        debug!(
            session_id = %session.id,
            messages = session.len(),
            ?outcome,
            "Archived session"
        );
        self.persist().await;
        outcome
    }

    /// Delete an archived session. Returns whether it existed.
    pub async fn remove(&mut self, id: SessionId) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|session| session.id != id);
        let removed = self.sessions.len() != before;

        if removed {
            info!(session_id = %id, "Removed session from history");
            self.persist().await;
        }
        removed
    }

    async fn persist(&self) {
        self.persistence.save(&self.key, &self.sessions).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::chat::core::message::Message;
    use crate::chat::storage::kv_store::{InMemoryKvStore, KeyValueStore};

    const KEY: &str = "previousChats";

    fn session_with(rating: Option<u8>) -> Session {
        let mut session = Session::new();
        session.push(Message::user("hello"));
        session.rating = rating.map(|r| Rating::new(r).unwrap());
        session
    }

    async fn empty_history() -> (Arc<InMemoryKvStore>, HistoryStore) {
        let store = Arc::new(InMemoryKvStore::default());
        let history = HistoryStore::load(PersistentState::new(store.clone()), KEY).await;
        (store, history)
    }

    #[tokio::test]
    async fn test_filter_by_rating_keeps_order() {
        let (_, mut history) = empty_history().await;
        let sessions = [
            session_with(Some(5)),
            session_with(Some(3)),
            session_with(Some(5)),
            session_with(None),
        ];
        for session in &sessions {
            history.archive(session).await;
        }

        let five = history.filter_by_rating(Some(Rating::new(5).unwrap()));
        assert_eq!(five.len(), 2);
        assert_eq!(five[0].id, sessions[0].id);
        assert_eq!(five[1].id, sessions[2].id);

        let all = history.filter_by_rating(None);
        let ids: Vec<SessionId> = all.iter().map(|s| s.id).collect();
        let expected: Vec<SessionId> = sessions.iter().map(|s| s.id).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_zero_filter_excludes_unrated() {
        let (_, mut history) = empty_history().await;
        history.archive(&session_with(None)).await;
        history.archive(&session_with(Some(0))).await;

        let zero = history.filter_by_rating(Some(Rating::new(0).unwrap()));
        assert_eq!(zero.len(), 1);
        assert_eq!(zero[0].rating, Some(Rating::new(0).unwrap()));
    }

    #[tokio::test]
    async fn test_archive_upserts_by_id() {
        let (_, mut history) = empty_history().await;
        let mut session = session_with(None);

        assert_eq!(history.archive(&session).await, ArchiveOutcome::Inserted);
        session.push(Message::assistant("hi"));
        assert_eq!(history.archive(&session).await, ArchiveOutcome::Updated);

        assert_eq!(history.len(), 1);
        assert_eq!(history.get(session.id).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_archive_writes_through_and_reloads() {
        let (store, mut history) = empty_history().await;
        let first = session_with(Some(4));
        let second = session_with(None);
        history.archive(&first).await;
        history.archive(&second).await;

        let reloaded = HistoryStore::load(PersistentState::new(store), KEY).await;
        assert_eq!(reloaded.all(), history.all());
    }

    #[tokio::test]
    async fn test_corrupt_history_loads_empty() {
        let store = Arc::new(InMemoryKvStore::default());
        store.set(KEY, "[{\"broken\":true}]".to_string()).await.unwrap();

        let history = HistoryStore::load(PersistentState::new(store), KEY).await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_bad_record_does_not_discard_the_rest() {
        let store = Arc::new(InMemoryKvStore::default());
        let raw = r#"[
            {"id":1729300000000,"date":"Sat Oct 19 2024","messages":[],"rating":4,"feedback":""},
            {"id":"not an id","date":7},
            {"id":1729300005000,"date":"Sat Oct 19 2024","messages":[],"rating":"","feedback":""}
        ]"#;
        store.set(KEY, raw.to_string()).await.unwrap();

        let history = HistoryStore::load(PersistentState::new(store), KEY).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history.all()[0].id, SessionId::Legacy(1_729_300_000_000));
        assert_eq!(history.all()[1].id, SessionId::Legacy(1_729_300_005_000));
    }

    #[tokio::test]
    async fn test_stored_layout_is_kept_when_archiving_on_top() {
        let store = Arc::new(InMemoryKvStore::default());
        let raw = r#"[
            {"id":1729300000000,"date":"Sat Oct 19 2024",
             "messages":[{"sender":"user","text":"Hi, how are you?","time":"09:41 AM"},
                         {"sender":"ai","text":"Fine","time":"09:41 AM"}],
             "rating":5,"feedback":"nice"},
            {"id":1729300005000,"date":"Sat Oct 19 2024","messages":[],"rating":"","feedback":""}
        ]"#;
        store.set(KEY, raw.to_string()).await.unwrap();

        let mut history = HistoryStore::load(PersistentState::new(store.clone()), KEY).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history.all()[0].rating, Some(Rating::new(5).unwrap()));
        assert_eq!(history.all()[0].len(), 2);
        assert_eq!(history.all()[1].rating, None);

        assert_eq!(
            history.archive(&session_with(Some(3))).await,
            ArchiveOutcome::Inserted
        );

        let stored: Value = serde_json::from_str(&store.get(KEY).await.unwrap().unwrap()).unwrap();
        let records = stored.as_array().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["id"], 1_729_300_000_000_u64);
        assert_eq!(records[0]["rating"], 5);
        assert_eq!(records[1]["rating"], "");
        assert!(records[2]["id"].is_string());
    }

    #[tokio::test]
    async fn test_remove_session() {
        let (store, mut history) = empty_history().await;
        let session = session_with(Some(2));
        history.archive(&session).await;

        assert!(history.remove(session.id).await);
        assert!(!history.remove(session.id).await);
        assert!(history.is_empty());

        let reloaded = HistoryStore::load(PersistentState::new(store), KEY).await;
        assert!(reloaded.is_empty());
    }
}
