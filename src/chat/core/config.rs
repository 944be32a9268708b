//! Configuration for the chat core and its server.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::chat::core::errors::{ChatError, ChatResult};
use crate::chat::core::theme::Theme;

/// Reply used when no trigger phrase matches.
pub const DEFAULT_FALLBACK_RESPONSE: &str = "Sorry, Did not understand your query!";

/// Default port for the HTTP view boundary.
pub const DEFAULT_PORT: u16 = 3000;

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Durable storage settings.
    pub storage: StorageConfig,
    /// Canned-response matcher settings.
    pub matcher: MatcherConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Presentation settings handed to the view layer.
    pub presentation: PresentationConfig,
}

impl ChatConfig {
    /// Build the default configuration with overrides from the process environment.
    ///
    /// # Errors
    /// Returns an error if an override cannot be parsed.
    pub fn from_env() -> ChatResult<Self> {
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `BOT_AI_*` overrides read through `lookup`.
    ///
    /// # Errors
    /// Returns an error if an override cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ChatResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("BOT_AI_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ChatError::InvalidConfig(format!("BOT_AI_PORT: {port}")))?;
        }

        if let Some(backend) = lookup("BOT_AI_STORAGE") {
            self.storage.backend = match backend.trim().to_ascii_lowercase().as_str() {
                "sqlite" => StorageBackend::Sqlite,
                "memory" => StorageBackend::Memory,
                other => {
                    return Err(ChatError::InvalidConfig(format!(
                        "BOT_AI_STORAGE must be sqlite or memory, got {other}"
                    )));
                }
            };
        }

        if let Some(path) = lookup("BOT_AI_DB") {
            self.storage.sqlite_path = PathBuf::from(path);
        }

        if let Some(key) = lookup("BOT_AI_HISTORY_KEY") {
            self.storage.history_key = key;
        }

        if let Some(path) = lookup("BOT_AI_DATASET") {
            self.matcher.dataset_path = Some(PathBuf::from(path));
        }

        if let Some(theme) = lookup("BOT_AI_THEME") {
            self.presentation.theme = theme
                .parse()
                .map_err(|other| ChatError::InvalidConfig(format!("BOT_AI_THEME: {other}")))?;
        }

        Ok(())
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ChatResult<()> {
        if !is_sql_identifier(&self.storage.table) {
            return Err(ChatError::InvalidConfig(format!(
                "storage.table must be a plain identifier, got {:?}",
                self.storage.table
            )));
        }

        if self.storage.history_key.trim().is_empty() {
            return Err(ChatError::InvalidConfig(
                "storage.history_key must not be empty".to_string(),
            ));
        }

        if self.storage.max_value_bytes == 0 {
            return Err(ChatError::InvalidConfig(
                "storage.max_value_bytes must be > 0".to_string(),
            ));
        }

        if self.matcher.fallback_response.trim().is_empty() {
            return Err(ChatError::InvalidConfig(
                "matcher.fallback_response must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Which key-value backend holds the history.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// File-backed `SQLite` table.
    #[default]
    Sqlite,
    /// Process memory only; lost on restart.
    Memory,
}

/// Storage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Selected backend.
    pub backend: StorageBackend,
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
    /// Key-value table name.
    pub table: String,
    /// Key under which the history collection is stored.
    pub history_key: String,
    /// Largest encoded value accepted for a single key.
    pub max_value_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            sqlite_path: PathBuf::from("bot_ai.sqlite"),
            table: "kv_store".to_string(),
            history_key: "previousChats".to_string(),
            max_value_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Matcher configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Optional JSON dataset replacing the embedded sample data.
    pub dataset_path: Option<PathBuf>,
    /// Reply used when nothing matches.
    pub fallback_response: String,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            fallback_response: DEFAULT_FALLBACK_RESPONSE.to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Presentation settings passed down to the view layer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Theme at startup.
    pub theme: Theme,
}

fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
