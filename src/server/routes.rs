//! HTTP route handlers for the chat API.

use std::fmt;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::chat::controller::{ChatController, DisplayMode, FeedbackDraft};
use crate::chat::core::ids::SessionId;
use crate::chat::core::message::Message;
use crate::chat::core::session::{Rating, Session, date_label};
use crate::chat::core::theme::Theme;

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", get(chat_view))
        .route("/api/chat/messages", post(send_message))
        .route("/api/chat/suggestions/{index}", post(select_suggestion))
        .route("/api/chat/new", post(start_new_chat))
        .route("/api/chat/history", post(view_history))
        .route(
            "/api/chat/feedback",
            post(save_feedback).put(update_feedback),
        )
        .route("/api/history", get(list_history))
        .route("/api/history/{id}", delete(remove_history))
        .route("/api/theme", get(current_theme))
        .route("/api/theme/toggle", post(toggle_theme))
        .with_state(state)
}

fn bad_request(err: impl fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "bot-ai",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Everything the chat view needs to render itself.
#[derive(Debug, Serialize)]
pub struct ChatView {
    /// Which screen to show.
    pub mode: DisplayMode,
    /// Active session id.
    pub session_id: SessionId,
    /// Active session date label.
    pub date: String,
    /// Active session messages.
    pub messages: Vec<Message>,
    /// Suggested prompts for the welcome screen.
    pub suggestions: Vec<String>,
    /// Pending feedback.
    pub draft: FeedbackDraft,
    /// Presentation theme.
    pub theme: Theme,
}

impl ChatView {
    fn capture(chat: &ChatController, theme: Theme) -> Self {
        let session = chat.session();
        Self {
            mode: chat.mode(),
            session_id: session.id,
            date: session.date.clone(),
            messages: session.messages.clone(),
            suggestions: chat.suggestions().to_vec(),
            draft: chat.draft().clone(),
            theme,
        }
    }
}

async fn chat_view(State(state): State<Arc<AppState>>) -> Json<ChatView> {
    let theme = *state.theme.read().await;
    let chat = state.chat.lock().await;
    Json(ChatView::capture(&chat, theme))
}

/// Text submitted by the user.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    /// Raw input; blank input is ignored.
    pub text: String,
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendRequest>,
) -> Json<ChatView> {
    let theme = *state.theme.read().await;
    let mut chat = state.chat.lock().await;
    chat.send_message(&request.text).await;
    Json(ChatView::capture(&chat, theme))
}

async fn select_suggestion(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Json<ChatView> {
    let theme = *state.theme.read().await;
    let mut chat = state.chat.lock().await;
    chat.select_suggestion(index).await;
    Json(ChatView::capture(&chat, theme))
}

async fn start_new_chat(State(state): State<Arc<AppState>>) -> Json<ChatView> {
    let theme = *state.theme.read().await;
    let mut chat = state.chat.lock().await;
    chat.start_new_chat().await;
    Json(ChatView::capture(&chat, theme))
}

async fn view_history(State(state): State<Arc<AppState>>) -> Json<ChatView> {
    let theme = *state.theme.read().await;
    let mut chat = state.chat.lock().await;
    chat.view_history().await;
    Json(ChatView::capture(&chat, theme))
}

/// Edits to the pending feedback. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackUpdate {
    /// Star count; `0` clears the rating.
    #[serde(default)]
    pub rating: Option<u8>,
    /// Replacement comment.
    #[serde(default)]
    pub comment: Option<String>,
}

async fn update_feedback(
    State(state): State<Arc<AppState>>,
    Json(update): Json<FeedbackUpdate>,
) -> Result<Json<ChatView>, (StatusCode, String)> {
    let rating = match update.rating {
        None => None,
        Some(0) => Some(None),
        Some(value) => Some(Some(Rating::new(value).map_err(bad_request)?)),
    };

    let theme = *state.theme.read().await;
    let mut chat = state.chat.lock().await;
    if let Some(rating) = rating {
        chat.set_rating(rating);
    }
    if let Some(comment) = update.comment {
        chat.set_comment(comment);
    }
    Ok(Json(ChatView::capture(&chat, theme)))
}

/// Result of committing the pending feedback.
#[derive(Debug, Serialize)]
pub struct FeedbackSaved {
    /// `false` when the session had no messages.
    pub saved: bool,
    /// View after the save.
    pub chat: ChatView,
}

async fn save_feedback(State(state): State<Arc<AppState>>) -> Json<FeedbackSaved> {
    let theme = *state.theme.read().await;
    let mut chat = state.chat.lock().await;
    let saved = chat.save_feedback().await;
    Json(FeedbackSaved {
        saved,
        chat: ChatView::capture(&chat, theme),
    })
}

/// History filter. An empty or missing rating lists everything.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Star count to match exactly.
    pub rating: Option<String>,
}

/// One archived session as shown in the history list.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    /// Session id.
    pub id: SessionId,
    /// `Today` or the stored date label.
    pub date: String,
    /// Archived messages.
    pub messages: Vec<Message>,
    /// Committed rating, if any.
    pub rating: Option<u8>,
    /// Committed comment.
    pub feedback: String,
}

impl HistoryEntry {
    fn from_session(session: &Session, today: &str) -> Self {
        Self {
            id: session.id,
            date: session.display_date(today).to_string(),
            messages: session.messages.clone(),
            rating: session.rating.map(Rating::value),
            feedback: session.feedback.clone(),
        }
    }
}

fn parse_rating_filter(raw: Option<&str>) -> Result<Option<Rating>, (StatusCode, String)> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let value: u8 = raw
        .parse()
        .map_err(|_| bad_request(format!("rating must be a number, got {raw:?}")))?;
    Rating::new(value).map(Some).map_err(bad_request)
}

async fn list_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntry>>, (StatusCode, String)> {
    let rating = parse_rating_filter(query.rating.as_deref())?;
    let today = date_label(chrono::Local::now());

    let chat = state.chat.lock().await;
    let entries = chat
        .filter_history(rating)
        .into_iter()
        .map(|session| HistoryEntry::from_session(session, &today))
        .collect();
    Ok(Json(entries))
}

/// Result of a history deletion.
#[derive(Debug, Serialize)]
pub struct Removed {
    /// Whether the session existed.
    pub removed: bool,
}

async fn remove_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Removed>, (StatusCode, String)> {
    let id: SessionId = id
        .parse()
        .map_err(|err| bad_request(format!("invalid session id {id:?}: {err}")))?;

    let mut chat = state.chat.lock().await;
    let removed = chat.remove_from_history(id).await;
    Ok(Json(Removed { removed }))
}

/// Current theme.
#[derive(Debug, Serialize)]
pub struct ThemeView {
    /// Active theme.
    pub theme: Theme,
}

async fn current_theme(State(state): State<Arc<AppState>>) -> Json<ThemeView> {
    let theme = *state.theme.read().await;
    Json(ThemeView { theme })
}

async fn toggle_theme(State(state): State<Arc<AppState>>) -> Json<ThemeView> {
    let mut theme = state.theme.write().await;
    *theme = theme.toggled();
    tracing::debug!(theme = %*theme, "Theme toggled");
    Json(ThemeView { theme: *theme })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::chat::controller::ChatBackends;
    use crate::chat::core::config::ChatConfig;
    use crate::chat::matcher::dataset::embedded_dataset;
    use crate::chat::matcher::responder::Matcher;
    use crate::chat::storage::kv_store::InMemoryKvStore;

    async fn router() -> Router {
        let backends = ChatBackends {
            store: Arc::new(InMemoryKvStore::default()),
            responder: Arc::new(Matcher::new(embedded_dataset().unwrap())),
        };
        let controller = ChatController::new(&ChatConfig::default(), backends)
            .await
            .unwrap();
        create_router(AppState::new(controller, Theme::Light))
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = router().await;
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_initial_view() {
        let app = router().await;
        let (status, body) = call(&app, Method::GET, "/api/chat", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "welcome");
        assert_eq!(body["theme"], "light");
        assert_eq!(body["messages"].as_array().unwrap().len(), 0);
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_send_message() {
        let app = router().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/chat/messages",
            Some(serde_json::json!({ "text": "What is a Promise in JavaScript?" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "active");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["sender"], "user");
        assert_eq!(messages[1]["sender"], "ai");
        assert!(
            messages[1]["text"]
                .as_str()
                .unwrap()
                .starts_with("A Promise in JavaScript")
        );
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        let app = router().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/chat/messages",
            Some(serde_json::json!({ "text": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "welcome");
        assert_eq!(body["messages"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_select_suggestion() {
        let app = router().await;
        let (_, body) = call(&app, Method::POST, "/api/chat/suggestions/2", None).await;
        assert_eq!(body["messages"][0]["text"], "Can you explain RESTful APIs?");

        let (status, _) = call(&app, Method::POST, "/api/chat/suggestions/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_feedback_and_history_filter() {
        let app = router().await;
        call(
            &app,
            Method::POST,
            "/api/chat/messages",
            Some(serde_json::json!({ "text": "Hi, how are you?" })),
        )
        .await;

        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/chat/feedback",
            Some(serde_json::json!({ "rating": 4, "comment": "friendly" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["draft"]["rating"], 4);

        let (_, body) = call(&app, Method::POST, "/api/chat/feedback", None).await;
        assert_eq!(body["saved"], true);
        assert_eq!(body["chat"]["draft"]["comment"], "");

        call(&app, Method::POST, "/api/chat/new", None).await;
        call(
            &app,
            Method::POST,
            "/api/chat/messages",
            Some(serde_json::json!({ "text": "What is CORS?" })),
        )
        .await;
        let (_, body) = call(&app, Method::POST, "/api/chat/history", None).await;
        assert_eq!(body["mode"], "history");

        let (_, all) = call(&app, Method::GET, "/api/history?rating=", None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, rated) = call(&app, Method::GET, "/api/history?rating=4", None).await;
        let rated = rated.as_array().unwrap();
        assert_eq!(rated.len(), 1);
        assert_eq!(rated[0]["feedback"], "friendly");
        assert_eq!(rated[0]["date"], "Today");

        let (_, none) = call(&app, Method::GET, "/api/history?rating=1", None).await;
        assert!(none.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_ratings_are_rejected() {
        let app = router().await;
        let (status, _) = call(&app, Method::GET, "/api/history?rating=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, Method::GET, "/api/history?rating=9", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            Method::PUT,
            "/api/chat/feedback",
            Some(serde_json::json!({ "rating": 6 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_remove_history() {
        let app = router().await;
        let (_, view) = call(
            &app,
            Method::POST,
            "/api/chat/messages",
            Some(serde_json::json!({ "text": "What is a closure?" })),
        )
        .await;
        let id = view["session_id"].as_str().unwrap().to_string();

        let (status, _) = call(&app, Method::DELETE, "/api/history/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&app, Method::DELETE, &format!("/api/history/{id}"), None).await;
        assert_eq!(body["removed"], true);

        let (_, all) = call(&app, Method::GET, "/api/history", None).await;
        assert!(all.as_array().unwrap().is_empty());

        let (_, view) = call(&app, Method::POST, "/api/chat/new", None).await;
        assert_ne!(view["session_id"], id.as_str());
        let (_, all) = call(&app, Method::GET, "/api/history", None).await;
        assert!(all.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_theme() {
        let app = router().await;
        let (_, body) = call(&app, Method::POST, "/api/theme/toggle", None).await;
        assert_eq!(body["theme"], "dark");

        let (_, body) = call(&app, Method::GET, "/api/theme", None).await;
        assert_eq!(body["theme"], "dark");

        let (_, body) = call(&app, Method::GET, "/api/chat", None).await;
        assert_eq!(body["theme"], "dark");
    }
}
